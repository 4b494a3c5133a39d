//! # Error Types: Core Validation Errors
//!
//! Errors raised by the validated constructors in this crate. Each variant
//! carries the rejected input so the message can be shown next to the form
//! field that produced it.

use thiserror::Error;

/// Validation failure for a core identifier or value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Account address is not `0x`-prefixed hex of at most 20 bytes.
    #[error("invalid account address {0:?}: expected 0x followed by 1-40 hex digits")]
    InvalidAddress(String),

    /// Record identifier is not a non-negative decimal integer.
    #[error("invalid medicine id {0:?}: expected a decimal number")]
    InvalidMedicineId(String),

    /// Content identifier was empty.
    #[error("content identifier must not be empty")]
    EmptyContentId,

    /// Transaction hash is not `0x`-prefixed hex.
    #[error("invalid transaction hash {0:?}")]
    InvalidTxHash(String),

    /// Network identifier is not a decimal integer.
    #[error("invalid network id {0:?}")]
    InvalidChainId(String),

    /// Role code outside the known set.
    #[error("unknown role code {0:?}")]
    UnknownRole(String),

    /// Timestamp could not be parsed.
    #[error("invalid timestamp {0:?}: {1}")]
    InvalidTimestamp(String, String),
}
