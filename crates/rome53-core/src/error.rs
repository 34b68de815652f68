//! Error types for rome53
//!
//! Every fatal condition of a run is a variant here. The binary turns an
//! error into a process exit code with [`Error::exit_code`].

use thiserror::Error;

/// Result type alias for rome53 operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for rome53
#[derive(Error, Debug)]
pub enum Error {
    /// Provider credentials are missing or were rejected
    #[error("Could not authenticate with AWS: {0}")]
    Authentication(String),

    /// The domain has no A record (it exists, but with other types only)
    #[error(
        "{0} is not an A record. To avoid an accident, rome53 does not operate on records of other types."
    )]
    NotARecord(String),

    /// The A record carries more than one value
    #[error(
        "{domain} has multiple records ({}). To avoid an accident, rome53 will do nothing.",
        .values.join(", ")
    )]
    MultipleValues {
        /// The fully-qualified domain name
        domain: String,
        /// Every value currently held by the record
        values: Vec<String>,
    },

    /// No hosted zone in the account holds a record with this name
    #[error("Could not find {0} in this account")]
    DomainNotFound(String),

    /// Ctrl-C arrived before the change was submitted
    #[error("Interrupted before any change was submitted")]
    Interrupted,

    /// WAN IP detection failed
    #[error("WAN IP lookup failed: {0}")]
    WanIp(String),

    /// DNS provider API errors
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The summary line could not be written to stdout
    #[error("Failed to write summary: {0}")]
    Output(#[source] std::io::Error),
}

/// Process exit codes
///
/// Success is `0`; usage errors are reported by the argument parser with
/// its own code before any of these apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Record updated, already correct, or wait interrupted
    Success = 0,
    /// Credentials missing or rejected
    Authentication = 1,
    /// Target record is not type A
    NotARecord = 2,
    /// Target record has multiple values
    MultipleValues = 3,
    /// Domain not found in any zone of the account
    DomainNotFound = 4,
    /// Any other runtime failure
    RuntimeError = 5,
}

impl ExitStatus {
    /// Numeric process exit code
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        std::process::ExitCode::from(status.code())
    }
}

impl Error {
    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a WAN IP lookup error
    pub fn wan_ip(msg: impl Into<String>) -> Self {
        Self::WanIp(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// The exit status this error terminates the process with
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            Error::Authentication(_) => ExitStatus::Authentication,
            Error::NotARecord(_) => ExitStatus::NotARecord,
            Error::MultipleValues { .. } => ExitStatus::MultipleValues,
            Error::DomainNotFound(_) => ExitStatus::DomainNotFound,
            _ => ExitStatus::RuntimeError,
        }
    }

    /// Numeric exit code for this error
    pub fn exit_code(&self) -> u8 {
        self.exit_status().code()
    }
}
