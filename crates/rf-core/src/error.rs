//! Error types for the slot machine workspace

use thiserror::Error;

/// Core error type
///
/// The simulation itself never fails at runtime; these errors come from the
/// edges where text or overrides enter the system.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Row length mismatch: expected {expected} symbols, got {got}")]
    RowLength { expected: usize, got: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias
pub type SlotResult<T> = Result<T, SlotError>;
