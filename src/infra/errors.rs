// src/infra/errors.rs — Error types for the resilience engine

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResilienceError {
    // Collaborator errors (degrade to an absent indicator)
    #[error("Source '{source_name}' request failed: {message}")]
    Source {
        source_name: String,
        message: String,
        transient: bool,
    },

    #[error("Source '{source_name}' returned HTTP {status}: {body}")]
    Status {
        source_name: String,
        status: u16,
        body: String,
    },

    #[error("Source '{source_name}' returned a malformed payload: {message}")]
    Decode {
        source_name: String,
        message: String,
    },

    #[error("Source '{source_name}' timed out after {}ms", .after.as_millis())]
    Timeout {
        source_name: String,
        after: Duration,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Configuration
    #[error("Invalid indicator '{id}': {reason}")]
    InvalidDescriptor { id: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ResilienceError {
    /// Whether a retry against the same collaborator could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ResilienceError::Source { transient, .. } => *transient,
            ResilienceError::Status { status, .. } => *status == 429 || *status >= 500,
            ResilienceError::Timeout { .. } => true,
            ResilienceError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ResilienceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transience() {
        let throttled = ResilienceError::Status {
            source_name: "world_bank".into(),
            status: 429,
            body: String::new(),
        };
        let missing = ResilienceError::Status {
            source_name: "world_bank".into(),
            status: 404,
            body: String::new(),
        };
        assert!(throttled.is_transient());
        assert!(!missing.is_transient());
    }

    #[test]
    fn test_timeout_is_transient() {
        let err = ResilienceError::Timeout {
            source_name: "gdelt".into(),
            after: Duration::from_secs(8),
        };
        assert!(err.is_transient());
        assert_eq!(err.to_string(), "Source 'gdelt' timed out after 8000ms");
    }

    #[test]
    fn test_descriptor_error_not_transient() {
        let err = ResilienceError::InvalidDescriptor {
            id: "gdp".into(),
            reason: "empty domain".into(),
        };
        assert!(!err.is_transient());
    }
}
