//! Error types for pin operations.

/// Result type alias for pin operations.
pub type Result<T> = std::result::Result<T, GpioError>;

/// Errors that can occur while driving a pin.
#[derive(Debug, thiserror::Error)]
pub enum GpioError {
    /// The electrical write to the pin failed.
    #[error("failed to drive pin: {message}")]
    Write { message: String },

    /// The pin backend is gone (driver unloaded, mock dropped).
    #[error("pin backend closed: {message}")]
    Closed { message: String },

    /// Operation is not supported by this pin backend.
    #[error("unsupported pin operation: {operation}")]
    Unsupported { operation: String },
}

impl GpioError {
    /// Create a new write error.
    pub fn write(message: impl Into<String>) -> Self {
        Self::Write {
            message: message.into(),
        }
    }

    /// Create a new closed-backend error.
    pub fn closed(message: impl Into<String>) -> Self {
        Self::Closed {
            message: message.into(),
        }
    }

    /// Create a new unsupported-operation error.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }
}
