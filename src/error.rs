use thiserror::Error;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Usage authorization is not granted; monitoring does not begin.
    #[error("PERMISSION_MISSING")]
    PermissionMissing,

    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Platform error: {0}")]
    Platform(String),
}

impl AppError {
    /// Stable error code reported to callers across the process boundary.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::PermissionMissing => "PERMISSION_MISSING",
            AppError::InvalidInput { .. } => "INVALID_INPUT",
            AppError::Decode(_) => "DECODE_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Platform(_) => "PLATFORM_ERROR",
        }
    }
}

// For callers that surface errors as plain strings
impl From<AppError> for String {
    fn from(e: AppError) -> Self {
        e.to_string()
    }
}
