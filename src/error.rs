//! Error types for routechat.
//!
//! Every fallible operation in the crate returns [`Result`]. The variants fall
//! into two groups: startup/terminal failures that end the program, and
//! exchange failures that the chat loop reports and recovers from.

use std::error;
use std::fmt;
use std::io;
use std::sync::Arc;

/// The main error type for routechat.
#[derive(Clone, Debug)]
pub enum Error {
    /// No credential was found in the environment or the fallback file.
    CredentialMissing {
        /// Human-readable error message.
        message: String,
    },

    /// The remote endpoint rejected the credential.
    Authentication {
        /// Human-readable error message.
        message: String,
    },

    /// The interactive menu could not be drawn or read.
    MenuRender {
        /// Human-readable error message.
        message: String,
        /// The underlying terminal error.
        source: Option<Arc<io::Error>>,
    },

    /// Connection error.
    Connection {
        /// Human-readable error message.
        message: String,
        /// Underlying cause.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// The completion request did not finish in time.
    Timeout {
        /// Human-readable error message.
        message: String,
        /// Duration of the timeout in seconds.
        duration: Option<f64>,
    },

    /// HTTP client error.
    HttpClient {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// The API answered with a non-success status or an error body.
    Api {
        /// HTTP status code.
        status_code: u16,
        /// Error code or type reported by the API.
        error_type: Option<String>,
        /// Human-readable error message.
        message: String,
    },

    /// Rate limit exceeded.
    RateLimit {
        /// Human-readable error message.
        message: String,
        /// Time to wait before retrying, in seconds.
        retry_after: Option<u64>,
    },

    /// Server is failing, overloaded or unavailable.
    ServiceUnavailable {
        /// HTTP status code.
        status_code: u16,
        /// Human-readable error message.
        message: String,
        /// Time to wait before retrying, in seconds.
        retry_after: Option<u64>,
    },

    /// The response payload was not a valid completion.
    Decode {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// The user interrupted an in-flight request.
    Interrupted {
        /// Human-readable error message.
        message: String,
    },

    /// I/O error.
    Io {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Arc<io::Error>,
    },

    /// An option or URL could not be used.
    Config {
        /// Human-readable error message.
        message: String,
        /// Option that caused the error.
        param: Option<String>,
    },
}

impl Error {
    /// Creates a new missing-credential error.
    pub fn credential_missing(message: impl Into<String>) -> Self {
        Error::CredentialMissing {
            message: message.into(),
        }
    }

    /// Creates a new authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Error::Authentication {
            message: message.into(),
        }
    }

    /// Creates a new menu rendering error.
    pub fn menu_render(message: impl Into<String>, source: Option<io::Error>) -> Self {
        Error::MenuRender {
            message: message.into(),
            source: source.map(Arc::new),
        }
    }

    /// Creates a new connection error.
    pub fn connection(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Connection {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new timeout error.
    pub fn timeout(message: impl Into<String>, duration: Option<f64>) -> Self {
        Error::Timeout {
            message: message.into(),
            duration,
        }
    }

    /// Creates a new HTTP client error.
    pub fn http_client(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::HttpClient {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new API error.
    pub fn api(status_code: u16, error_type: Option<String>, message: impl Into<String>) -> Self {
        Error::Api {
            status_code,
            error_type,
            message: message.into(),
        }
    }

    /// Creates a new rate limit error.
    pub fn rate_limit(message: impl Into<String>, retry_after: Option<u64>) -> Self {
        Error::RateLimit {
            message: message.into(),
            retry_after,
        }
    }

    /// Creates a new service unavailable error.
    pub fn service_unavailable(
        status_code: u16,
        message: impl Into<String>,
        retry_after: Option<u64>,
    ) -> Self {
        Error::ServiceUnavailable {
            status_code,
            message: message.into(),
            retry_after,
        }
    }

    /// Creates a new decode error.
    pub fn decode(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Decode {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new interrupted error.
    pub fn interrupted(message: impl Into<String>) -> Self {
        Error::Interrupted {
            message: message.into(),
        }
    }

    /// Creates a new I/O error.
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            message: message.into(),
            source: Arc::new(source),
        }
    }

    /// Creates a new configuration error.
    pub fn config(message: impl Into<String>, param: Option<String>) -> Self {
        Error::Config {
            message: message.into(),
            param,
        }
    }

    /// Returns true if the credential could not be found.
    pub fn is_credential_missing(&self) -> bool {
        matches!(self, Error::CredentialMissing { .. })
    }

    /// Returns true if this error is related to authentication.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Error::Authentication { .. })
    }

    /// Returns true if the menu could not be rendered.
    pub fn is_menu_render(&self) -> bool {
        matches!(self, Error::MenuRender { .. })
    }

    /// Returns true if this error is related to rate limiting.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Error::RateLimit { .. })
    }

    /// Returns true if this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Returns true if this error is a connection error.
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection { .. })
    }

    /// Returns true if the response payload could not be decoded.
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode { .. })
    }

    /// Returns true if the user interrupted the request.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Error::Interrupted { .. })
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Api { status_code, .. } => {
                matches!(status_code, 408 | 409 | 429 | 500..=599)
            }
            Error::Timeout { .. } => true,
            Error::Connection { .. } => true,
            Error::RateLimit { .. } => true,
            Error::ServiceUnavailable { .. } => true,
            _ => false,
        }
    }

    /// Returns true if a failed exchange can be reported and the chat resumed.
    ///
    /// Credential, menu, terminal and configuration failures are not
    /// recoverable because there is no interactive state left to return to.
    pub fn is_exchange_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Authentication { .. }
                | Error::Connection { .. }
                | Error::Timeout { .. }
                | Error::HttpClient { .. }
                | Error::Api { .. }
                | Error::RateLimit { .. }
                | Error::ServiceUnavailable { .. }
                | Error::Decode { .. }
                | Error::Interrupted { .. }
        )
    }

    /// Returns the server-suggested wait before retrying, in seconds.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Error::RateLimit { retry_after, .. } => *retry_after,
            Error::ServiceUnavailable { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Returns the status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api { status_code, .. } => Some(*status_code),
            Error::ServiceUnavailable { status_code, .. } => Some(*status_code),
            Error::RateLimit { .. } => Some(429),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::CredentialMissing { message } => {
                write!(f, "Credential missing: {message}")
            }
            Error::Authentication { message } => {
                write!(f, "Authentication error: {message}")
            }
            Error::MenuRender { message, .. } => {
                write!(f, "Menu error: {message}")
            }
            Error::Connection { message, .. } => {
                write!(f, "Connection error: {message}")
            }
            Error::Timeout { message, duration } => {
                if let Some(duration) = duration {
                    write!(f, "Timeout error: {message} ({duration} seconds)")
                } else {
                    write!(f, "Timeout error: {message}")
                }
            }
            Error::HttpClient { message, .. } => {
                write!(f, "HTTP client error: {message}")
            }
            Error::Api {
                status_code,
                error_type,
                message,
            } => {
                if let Some(error_type) = error_type {
                    write!(f, "API error {status_code} ({error_type}): {message}")
                } else {
                    write!(f, "API error {status_code}: {message}")
                }
            }
            Error::RateLimit {
                message,
                retry_after,
            } => {
                if let Some(retry_after) = retry_after {
                    write!(
                        f,
                        "Rate limit exceeded: {message} (retry after {retry_after} seconds)"
                    )
                } else {
                    write!(f, "Rate limit exceeded: {message}")
                }
            }
            Error::ServiceUnavailable {
                status_code,
                message,
                retry_after,
            } => {
                if let Some(retry_after) = retry_after {
                    write!(
                        f,
                        "Service unavailable ({status_code}): {message} (retry after {retry_after} seconds)"
                    )
                } else {
                    write!(f, "Service unavailable ({status_code}): {message}")
                }
            }
            Error::Decode { message, .. } => {
                write!(f, "Decode error: {message}")
            }
            Error::Interrupted { message } => {
                write!(f, "Interrupted: {message}")
            }
            Error::Io { message, .. } => {
                write!(f, "I/O error: {message}")
            }
            Error::Config { message, param } => {
                if let Some(param) = param {
                    write!(f, "Configuration error: {message} (option: {param})")
                } else {
                    write!(f, "Configuration error: {message}")
                }
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::MenuRender { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Connection { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::HttpClient { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Decode { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Io { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::io(err.to_string(), err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::decode(format!("JSON error: {err}"), Some(Box::new(err)))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::config(format!("URL parse error: {err}"), Some("base-url".to_string()))
    }
}

/// A specialized Result type for routechat operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(Error::timeout("slow", Some(60.0)).is_retryable());
        assert!(Error::connection("refused", None).is_retryable());
        assert!(Error::rate_limit("slow down", Some(2)).is_retryable());
        assert!(Error::service_unavailable(503, "busy", None).is_retryable());
        assert!(Error::api(409, None, "conflict").is_retryable());
        assert!(!Error::api(400, None, "bad").is_retryable());
        assert!(!Error::authentication("nope").is_retryable());
        assert!(!Error::decode("garbage", None).is_retryable());
    }

    #[test]
    fn exchange_recoverable_errors() {
        assert!(Error::decode("garbage", None).is_exchange_recoverable());
        assert!(Error::interrupted("ctrl-c").is_exchange_recoverable());
        assert!(Error::api(400, None, "bad").is_exchange_recoverable());
        assert!(!Error::credential_missing("unset").is_exchange_recoverable());
        assert!(!Error::menu_render("no tty", None).is_exchange_recoverable());
        assert!(!Error::config("bad", None).is_exchange_recoverable());
    }

    #[test]
    fn display_includes_context() {
        let err = Error::api(402, Some("payment_required".to_string()), "no credits");
        assert_eq!(err.to_string(), "API error 402 (payment_required): no credits");

        let err = Error::rate_limit("slow down", Some(3));
        assert_eq!(
            err.to_string(),
            "Rate limit exceeded: slow down (retry after 3 seconds)"
        );
    }

    #[test]
    fn serde_errors_become_decode_errors() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(err.is_decode());
        assert!(error::Error::source(&err).is_some());
    }

    #[test]
    fn retry_after_is_exposed() {
        assert_eq!(Error::rate_limit("x", Some(7)).retry_after(), Some(7));
        assert_eq!(Error::timeout("x", None).retry_after(), None);
        assert_eq!(Error::rate_limit("x", None).status_code(), Some(429));
    }
}
