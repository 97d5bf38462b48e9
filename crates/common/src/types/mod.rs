use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// JSON error body returned by the HTTP layer.
#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub error: String,
}
