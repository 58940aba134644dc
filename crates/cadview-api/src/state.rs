//! Application state.

use std::sync::Arc;

use cadview_forge::{ForgeClient, ForgeResult};

use crate::config::ApiConfig;

/// Shared application state.
///
/// The Forge client owns the token cache, so every handler sees the same
/// token through this one handle.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub forge: Arc<ForgeClient>,
}

impl AppState {
    pub fn new(config: ApiConfig, forge: ForgeClient) -> Self {
        Self {
            config,
            forge: Arc::new(forge),
        }
    }

    /// Create application state, reading Forge settings from the environment.
    pub fn from_env(config: ApiConfig) -> ForgeResult<Self> {
        let forge = ForgeClient::from_env()?;
        Ok(Self::new(config, forge))
    }
}
