// Error taxonomy shared by every layer
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Fatal at startup: unreadable or malformed configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Fatal at startup: client certificate bundle could not be loaded.
    #[error("credential error: {0}")]
    Credential(String),

    #[error("no dashboard registered as '{0}'")]
    NotFound(String),

    #[error("time range '{0}' is invalid")]
    InvalidTimeRange(String),

    #[error("request verification failed: {0}")]
    Verification(#[from] VerificationError),

    #[error("malformed slash command payload: {0}")]
    Payload(String),

    #[error("render request failed: {0}")]
    Render(String),

    #[error("upload failed: {0}")]
    Upload(String),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerificationError {
    #[error("missing or unreadable header {0}")]
    MissingHeader(&'static str),

    #[error("timestamp '{0}' is not a unix time")]
    InvalidTimestamp(String),

    #[error("timestamp {0} is outside the replay window")]
    StaleTimestamp(i64),

    #[error("signature is not a v0 hex digest")]
    MalformedSignature,

    #[error("signature mismatch")]
    SignatureMismatch,
}

impl VerificationError {
    /// Setup failures happen before any digest is computed and map to a server error.
    pub fn is_setup_failure(&self) -> bool {
        matches!(
            self,
            VerificationError::MissingHeader(_)
                | VerificationError::InvalidTimestamp(_)
                | VerificationError::StaleTimestamp(_)
        )
    }
}

pub type AppResult<T> = Result<T, AppError>;
