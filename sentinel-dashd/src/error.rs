use thiserror::Error;

#[derive(Error, Debug)]
pub enum DaemonError {
    /// The RPC port could not be reached or refused our credentials.
    #[error("Cannot connect to dashd: {0}")]
    Connectivity(String),

    /// dashd answered with a JSON-RPC error.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Invalid response to {method}: {details}")]
    InvalidResponse { method: String, details: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DaemonError {
    pub fn is_connectivity(&self) -> bool {
        matches!(self, DaemonError::Connectivity(_))
    }

    pub fn invalid_response(method: &str, details: impl Into<String>) -> Self {
        DaemonError::InvalidResponse {
            method: method.to_string(),
            details: details.into(),
        }
    }
}
