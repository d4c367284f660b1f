use doorward_gpio::GpioError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Validation errors
    #[error("Invalid door id: {message}")]
    InvalidDoor { message: String },

    #[error("Invalid door side: {value}")]
    InvalidSide { value: String },

    #[error("Invalid credential: {message}")]
    InvalidCredential { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    // Attempt lifecycle
    /// Canonical reason for an explicit authorization rejection. Admitters
    /// receiving a deny may branch on this variant to distinguish a policy
    /// rejection from an operational failure.
    #[error("access denied")]
    AccessDenied,

    #[error("Authorization attempt cancelled")]
    Cancelled,

    #[error("Authorization attempt timed out")]
    TimedOut,

    // Collaborator failures
    #[error("Hardware fault: {message}")]
    Hardware { message: String },

    #[error(transparent)]
    Gpio(#[from] GpioError),

    #[error("Authorization backend error: {message}")]
    Backend { message: String },

    /// An admitter in the fan-out chain failed. Fatal to the guard that
    /// dispatched the call, since the door state may now be unknown.
    #[error("{context}: {source}")]
    AdmitterFailure {
        context: String,
        #[source]
        source: Box<Error>,
    },

    // Guard lifecycle
    #[error("Guard terminated abnormally: {message}")]
    GuardAborted { message: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a hardware fault error.
    pub fn hardware(message: impl Into<String>) -> Self {
        Self::Hardware {
            message: message.into(),
        }
    }

    /// Create an authorization-backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Wrap an admitter error with the action that failed.
    pub fn admitter(context: impl Into<String>, source: Error) -> Self {
        Self::AdmitterFailure {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Returns `true` for the canonical access-denied sentinel.
    #[must_use]
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Error::AccessDenied)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_denied_sentinel() {
        let err = Error::AccessDenied;
        assert!(err.is_access_denied());
        assert_eq!(err.to_string(), "access denied");

        assert!(!Error::Cancelled.is_access_denied());
    }

    #[test]
    fn test_admitter_failure_wraps_source() {
        let err = Error::admitter("failed to allow access", Error::hardware("relay fault"));
        assert_eq!(
            err.to_string(),
            "failed to allow access: Hardware fault: relay fault"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_gpio_error_converts() {
        let err: Error = GpioError::write("stuck pin").into();
        assert_eq!(err.to_string(), "failed to drive pin: stuck pin");
    }
}
