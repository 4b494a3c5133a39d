//! # pharma-invoice -- Document Generator
//!
//! Renders the documents the workflows pin to the content store before a
//! ledger write:
//!
//! - **Tax invoice** (`pdf.rs`): a single-page PDF with a title bar, the
//!   generation date and time, then one `key: value` line per field in the
//!   caller's order.
//! - **Metadata** (`layout.rs`): the same ordered fields as a JSON object.
//! - **QR payload** (`qr.rs`): a record snapshot as JSON, drawn as an SVG
//!   QR code for display.
//!
//! ## Determinism
//!
//! The clock is read once per [`DocumentRenderer::render`] call and that
//! instant is reused for every timestamp in the document. With a
//! [`pharma_core::FixedClock`] the output is byte-identical across calls.

pub mod error;
pub mod layout;
pub mod pdf;
pub mod qr;

pub use error::InvoiceError;
pub use layout::{record_fields, DocumentRenderer, Fields, InvoiceRenderer, LayoutKind};
pub use qr::{qr_payload, render_qr_svg};
