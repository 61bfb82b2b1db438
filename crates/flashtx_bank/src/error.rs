//! Error types for bank operations.

use crate::bank::Position;
use std::io;
use thiserror::Error;

/// Result type for bank operations.
pub type BankResult<T> = Result<T, BankError>;

/// Errors that can occur during bank operations.
#[derive(Debug, Error)]
pub enum BankError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Attempted to access a range beyond the end of the bank.
    #[error("access beyond end of bank: position {position}, len {len}, capacity {capacity}")]
    OutOfBounds {
        /// The requested start position.
        position: Position,
        /// The requested access length.
        len: usize,
        /// The bank capacity.
        capacity: Position,
    },

    /// A backing file does not match the configured bank capacity.
    #[error("bank file size mismatch: expected {expected} bytes, found {actual}")]
    CapacityMismatch {
        /// The configured capacity.
        expected: Position,
        /// The size of the file on disk.
        actual: u64,
    },

    /// The flash device reported a hardware fault.
    #[error("flash device fault: {0}")]
    Device(String),
}

impl BankError {
    /// Creates a device fault error.
    pub fn device(message: impl Into<String>) -> Self {
        Self::Device(message.into())
    }
}
