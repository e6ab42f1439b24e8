use thiserror::Error;

/// Main error type for Reckon API operations
#[derive(Debug, Error)]
pub enum ReckonError {
    /// The client was configured with values that cannot form a request
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Network failure, timeout, or failure while reading the response body
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A successful response whose body does not have the expected shape
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Any non-200 status returned by the identity or API host
    #[error("{context} failed: {status} {reason}")]
    Status {
        context: &'static str,
        status: u16,
        reason: String,
        body: String,
    },

    /// Redirect chain without a usable Location or longer than allowed
    #[error("redirect error: {0}")]
    Redirect(String),
}

impl ReckonError {
    /// Create a new status error
    pub fn status(context: &'static str, status: reqwest::StatusCode, body: String) -> Self {
        ReckonError::Status {
            context,
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("unknown status").to_string(),
            body,
        }
    }

    /// Get the HTTP status code if the server answered with a failure status
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ReckonError::Status { status, .. } => Some(*status),
            ReckonError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if the server rejected the credentials or token (401)
    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == Some(401)
    }

    /// Check if this error came from the network rather than from the server
    pub fn is_transport(&self) -> bool {
        matches!(self, ReckonError::Transport(_))
    }
}

/// Result type for Reckon operations
pub type Result<T> = std::result::Result<T, ReckonError>;

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_status_error_message() {
        let error = ReckonError::status("access token request", StatusCode::BAD_REQUEST, "{}".to_string());
        assert_eq!(error.to_string(), "access token request failed: 400 Bad Request");
        assert_eq!(error.status_code(), Some(400));
        assert!(!error.is_unauthorized());
    }

    #[test]
    fn test_error_unauthorized() {
        let error = ReckonError::status("cashbooks request", StatusCode::UNAUTHORIZED, String::new());
        assert!(error.is_unauthorized());
        assert!(!error.is_transport());
    }

    #[test]
    fn test_decode_error_has_no_status() {
        let json_err = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let error = ReckonError::from(json_err);
        assert!(matches!(error, ReckonError::Decode(_)));
        assert_eq!(error.status_code(), None);
    }
}
