//! Error types for the backend client.
//!
//! # Design
//! Every failure is a structured value rather than a formatted message:
//! unexpected statuses keep the raw status code and body so callers can
//! branch on remote error shapes, and login failures collapse the remote's
//! `error_code` values into `AuthError` reasons. Nothing in this crate
//! retries; each variant reaches the immediate caller unchanged.

/// Result alias used by every client operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error produced by an `HttpSend` implementation.
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by `Client` construction and operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required environment value is absent or empty.
    #[error("missing configuration: {0} is not set")]
    ConfigurationMissing(&'static str),

    /// An explicit constructor was handed an empty base URL or key.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The process-wide default client could not be built.
    #[error("default client is unavailable")]
    DefaultUnavailable,

    /// The request never produced a response.
    #[error("{context}: {source}")]
    Transport {
        context: &'static str,
        #[source]
        source: TransportError,
    },

    /// The remote answered with a status the operation does not accept.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The request payload could not be encoded as JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The login flow was rejected by the remote.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl Error {
    /// Status code carried by `Error::Status`, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn status_with_body(status: u16, body: &[u8]) -> Self {
        Error::Status {
            status,
            body: String::from_utf8_lossy(body).into_owned(),
        }
    }
}

/// Named login failure reasons.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid_credentials")]
    InvalidCredentials,

    #[error("email_not_confirmed")]
    EmailNotConfirmed,

    #[error("user_not_found")]
    UserNotFound,

    /// Any other rejection, carrying the remote message or raw body.
    #[error("login_failed: {0}")]
    LoginFailed(String),
}

impl AuthError {
    /// Maps a remote `error_code` to a reason, falling back to
    /// `LoginFailed` with the remote message.
    pub fn from_code(code: &str, message: &str) -> Self {
        match code {
            "invalid_credentials" => AuthError::InvalidCredentials,
            "email_not_confirmed" => AuthError::EmailNotConfirmed,
            "user_not_found" => AuthError::UserNotFound,
            _ => AuthError::LoginFailed(message.to_string()),
        }
    }

    /// Stable reason string.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::EmailNotConfirmed => "email_not_confirmed",
            AuthError::UserNotFound => "user_not_found",
            AuthError::LoginFailed(_) => "login_failed",
        }
    }
}
