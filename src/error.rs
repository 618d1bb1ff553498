//! Global error handling for treecopy
//!
//! Only failures that stop a whole call end up here. Problems with single
//! files or directories are recovered inside the walker and reported as
//! diagnostics instead.

use std::io;
use thiserror::Error;

/// Global error type for treecopy operations
#[derive(Error, Debug)]
pub enum TreeCopyError {
    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON processing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Path not found
    #[error("Path not found: {0}")]
    PathNotFound(String),

    /// The selection holds no paths
    #[error("Nothing to do: the selection is empty")]
    EmptySelection,

    /// Unknown compression level name
    #[error("Invalid compression level: {0} (expected light, medium or hard)")]
    InvalidCompressionLevel(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The walk was abandoned through its cancellation token
    #[error("Operation cancelled")]
    Cancelled,
}

/// Specialized Result type for treecopy operations
pub type Result<T> = std::result::Result<T, TreeCopyError>;

/// Creates a TreeCopyError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::TreeCopyError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

impl From<TreeCopyError> for io::Error {
    fn from(err: TreeCopyError) -> Self {
        io::Error::new(io::ErrorKind::Other, err.to_string())
    }
}
