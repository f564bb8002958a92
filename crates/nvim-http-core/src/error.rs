//! Error types reported by an RPC session.

use serde_json::Value;

/// Failure of a remote call
#[derive(Debug, Clone, thiserror::Error)]
pub enum RpcError {
    /// The editor answered with a structured error
    #[error("Remote error: {0}")]
    Remote(Value),

    /// The call never produced an answer (connection lost, encode failure)
    #[error("Transport error: {0}")]
    Transport(String),
}

impl RpcError {
    /// Create a transport error from any displayable cause
    pub fn transport(cause: impl std::fmt::Display) -> Self {
        RpcError::Transport(cause.to_string())
    }

    /// Remote error payload, if any
    pub fn remote_payload(&self) -> Option<&Value> {
        match self {
            RpcError::Remote(payload) => Some(payload),
            RpcError::Transport(_) => None,
        }
    }
}
