//! Error types for the drum reorder engine

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, ReorderError>;

/// Error types that can occur in the reorder engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReorderError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid capacity: {0} (must be a positive number of request slots)")]
    InvalidCapacity(usize),

    #[error("LBA {lba} is out of range (drum holds {num_blocks} blocks)")]
    OutOfRange { lba: u64, num_blocks: u64 },

    #[error("Request pool is full ({capacity} slots)")]
    CapacityExceeded { capacity: usize },

    #[error("LBA {lba} is already pending")]
    DuplicateKey { lba: u64 },

    #[error("No pending requests to select from")]
    EmptyQueue,

    #[error("LBA {lba} is not pending")]
    NotFound { lba: u64 },
}

impl ReorderError {
    /// Determine if the caller can sensibly retry the operation with
    /// different input
    ///
    /// Returns true for errors where regenerating the input may succeed
    /// (e.g. picking a different LBA after `DuplicateKey`). Returns false
    /// for errors that indicate a driver bug or a capacity-planning problem.
    pub fn is_retryable(&self) -> bool {
        match self {
            // A different LBA may well be admissible
            ReorderError::DuplicateKey { .. } => true,
            ReorderError::OutOfRange { .. } => true,

            // The pool stays full until the driver completes something
            ReorderError::CapacityExceeded { .. } => false,

            // Selecting from an empty pool is a sequencing bug in the driver
            ReorderError::EmptyQueue => false,

            // Completing an unknown LBA is a double-completion bug
            ReorderError::NotFound { .. } => false,

            // Construction-time errors are permanent
            ReorderError::ConfigError(_) => false,
            ReorderError::InvalidCapacity(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReorderError::OutOfRange {
            lba: 20_000_000,
            num_blocks: 18_000_000,
        };
        assert!(err.to_string().contains("20000000"));
        assert!(err.to_string().contains("18000000"));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(ReorderError::DuplicateKey { lba: 5 }.is_retryable());
        assert!(!ReorderError::CapacityExceeded { capacity: 8 }.is_retryable());
        assert!(!ReorderError::EmptyQueue.is_retryable());
        assert!(!ReorderError::NotFound { lba: 9 }.is_retryable());
    }
}
