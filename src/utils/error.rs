//! Error types for the Vireo shell

use thiserror::Error;

use crate::toolkit::ObjectId;

/// Errors raised by shell operations
#[derive(Debug, Error)]
pub enum ShellError {
    /// Index past the end of the tab collection
    #[error("no tab at index {index} (have {len})")]
    NoSuchTab { index: usize, len: usize },

    /// Only the shown tab can be dragged to a new position
    #[error("tab showing {child} is not the active page and cannot be reordered")]
    ReorderNotActive { child: ObjectId },

    /// A close button that belongs to no tab
    #[error("close button {0} belongs to no tab")]
    UnknownCloseControl(ObjectId),

    /// The browser window has already been closed
    #[error("browser is closed")]
    Closed,

    /// GUI frontend failure
    #[error("frontend error: {0}")]
    Frontend(#[from] eframe::Error),
}

/// Result type for shell operations
pub type Result<T> = std::result::Result<T, ShellError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ShellError::NoSuchTab { index: 4, len: 2 };
        assert_eq!(err.to_string(), "no tab at index 4 (have 2)");
        assert_eq!(ShellError::Closed.to_string(), "browser is closed");
    }
}
