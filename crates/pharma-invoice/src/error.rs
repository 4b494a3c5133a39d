//! Errors raised while rendering documents.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InvoiceError {
    /// A tax invoice with no field lines.
    #[error("cannot render an invoice with no fields")]
    NoFields,

    /// A record could not be flattened into text fields.
    #[error("record is not a flat mapping of text fields: {0}")]
    NotFlat(String),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("QR encoding failed: {0}")]
    Qr(String),
}
