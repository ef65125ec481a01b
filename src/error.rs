use thiserror::Error;

/// Failure taxonomy for every call that crosses the API boundary.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server could not be reached (refused, DNS, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// 401 from the server: the session is missing, expired or invalid.
    #[error("{0}")]
    Auth(String),

    /// Any other non-2xx response.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// User input rejected locally, before any request was made.
    #[error("{0}")]
    Validation(String),

    /// A 2xx response whose body did not match the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn is_auth(&self) -> bool {
        matches!(self, ClientError::Auth(_))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ClientError::Validation(msg.into())
    }

    /// HTTP status of the failure, when the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Auth(_) => Some(401),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_displays_server_message() {
        let err = ClientError::Api {
            status: 409,
            message: "already requested".to_string(),
        };
        assert_eq!(err.to_string(), "already requested");
        assert_eq!(err.status(), Some(409));
        assert!(!err.is_auth());
    }

    #[test]
    fn test_auth_error_reports_401() {
        let err = ClientError::Auth("Not authenticated".to_string());
        assert!(err.is_auth());
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_decode_from_serde_error() {
        let parse: Result<u32, _> = serde_json::from_str::<u32>("\"nope\"");
        let err: ClientError = parse.unwrap_err().into();
        assert!(matches!(err, ClientError::Decode(_)));
        assert_eq!(err.status(), None);
    }
}
