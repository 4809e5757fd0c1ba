//! Error types for session configuration and session operations
//!
//! Decode problems are deliberately absent here: a cookie that cannot be
//! decoded is reported through [`crate::session::codec::DecodeOutcome`] and
//! recovered inside the handle.

use actix_web::{HttpResponse, ResponseError};

/// Fatal problems with the supplied session configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// No secret was supplied at all
    #[error("a session secret is required")]
    MissingSecret,

    /// A secret entry carried zero bytes of key material
    #[error("session secret with id {0} is empty")]
    EmptySecret(u32),

    /// Two ring entries share the same id
    #[error("duplicate session secret id {0}")]
    DuplicateSecretId(u32),

    /// Rolling percentage outside of `(0, 100]`
    #[error("rolling percentage must be within (0, 100], got {0}")]
    InvalidRolling(f64),

    /// A lifetime of zero would expire every session on creation
    #[error("session lifetime must be greater than zero")]
    ZeroLifetime,

    /// The lifetime cannot be added to the current time
    #[error("session lifetime of {0} seconds is out of range")]
    LifetimeOutOfRange(u64),

    /// The settings source could not be read or parsed
    #[error("invalid session settings: {0}")]
    Invalid(String),
}

/// Failure reported by a [`crate::session::cipher::SessionCipher`]
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct CipherError(pub String);

impl CipherError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Hard failures of a session operation (`set`, `update`, `refresh`, load-time rotation)
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The payload could not be turned into JSON
    #[error("failed to serialize session payload: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The cipher refused to encrypt the payload
    #[error("failed to encrypt session payload: {0}")]
    Encryption(#[source] CipherError),

    /// The computed expiry does not fit into a timestamp
    #[error("session expiry is out of range")]
    ExpiryOutOfRange,
}

impl ResponseError for SessionError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::InternalServerError().json(serde_json::json!({
            "error": "session_error",
            "message": "Failed to persist session"
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_session_error_maps_to_internal_server_error() {
        let err = SessionError::Encryption(CipherError::new("boom"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_configuration_error_messages() {
        assert_eq!(
            ConfigurationError::MissingSecret.to_string(),
            "a session secret is required"
        );
        assert!(ConfigurationError::InvalidRolling(150.0)
            .to_string()
            .contains("150"));
    }
}
