use std::sync::Arc;

use service::DirectoryService;

#[derive(Clone, Debug, Default)]
pub struct AuthSettings {
    pub allow_empty_token: bool,
}

impl From<&configs::AuthConfig> for AuthSettings {
    fn from(cfg: &configs::AuthConfig) -> Self {
        Self { allow_empty_token: cfg.allow_empty_token }
    }
}

/// Shared request state, built once at startup and cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<DirectoryService>,
    pub auth: AuthSettings,
}

impl AppState {
    pub fn new(directory: DirectoryService, auth: AuthSettings) -> Self {
        Self { directory: Arc::new(directory), auth }
    }
}
