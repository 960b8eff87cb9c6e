// ⚠️ Error taxonomy for the collaborator seams
// Extraction and scoring never fail for data-quality reasons; only the
// fetch/persistence collaborators and request validation produce these.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerifyError {
    /// Network-level failure before any response arrived
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// Registry answered with a non-success status
    #[error("fetch of {url} failed with status {status}")]
    Status { url: String, status: u16 },

    /// Persistence sink rejected a write
    #[error("{operation} failed: {message}")]
    Sink { operation: String, message: String },

    /// Caller supplied no usable query or payload
    #[error("{0}")]
    InvalidRequest(String),
}

impl VerifyError {
    pub fn sink(operation: impl Into<String>, message: impl Into<String>) -> Self {
        VerifyError::Sink {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        VerifyError::InvalidRequest(message.into())
    }

    /// True for precondition failures the caller can fix (HTTP 400 territory)
    pub fn is_client_error(&self) -> bool {
        matches!(self, VerifyError::InvalidRequest(_))
    }
}

/// Classify an `anyhow::Error` chain: does it carry a client-side `VerifyError`?
pub fn is_client_error(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|e| e.downcast_ref::<VerifyError>())
        .any(VerifyError::is_client_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_keeps_url() {
        let err = VerifyError::Status {
            url: "https://example.org/view_dog?id=1".to_string(),
            status: 503,
        };
        let msg = err.to_string();
        assert!(msg.contains("view_dog?id=1"));
        assert!(msg.contains("503"));
    }

    #[test]
    fn test_client_error_survives_context() {
        let err = anyhow::Error::new(VerifyError::invalid("Provide ?name=DOGNAME or ?id=12345"))
            .context("lookup failed");
        assert!(is_client_error(&err));

        let err = anyhow::Error::new(VerifyError::sink("insert pedigrees", "409 conflict"));
        assert!(!is_client_error(&err));
    }
}
