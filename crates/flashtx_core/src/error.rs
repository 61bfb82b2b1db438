//! Error types for the FlashTx engine.

use flashtx_bank::BankError;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur during engine operations.
///
/// Corruption found at boot is not an error: the engine silently resets to
/// the default payload, so a constructed instance is always consistent. An
/// oversized payload is reported through `write`'s `Ok(false)` return.
/// What remains here are bank faults and caller-side buffer mistakes.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A bank operation failed.
    #[error("bank error: {0}")]
    Bank(#[from] BankError),

    /// The destination buffer cannot hold the stored payload.
    #[error("destination buffer too small: payload is {needed} bytes, buffer holds {provided}")]
    BufferTooSmall {
        /// The stored payload length.
        needed: usize,
        /// The caller-provided buffer length.
        provided: usize,
    },
}
