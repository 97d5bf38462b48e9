use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("malformed data: {0}")]
    MalformedData(String),
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(id: &str) -> Self { Self::NotFound(format!("user {} not found", id)) }

    pub fn unavailable(e: impl std::fmt::Display) -> Self { Self::BackendUnavailable(e.to_string()) }
}
