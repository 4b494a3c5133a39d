//! Layout selection and the renderer seam.

use std::sync::Arc;

use indexmap::IndexMap;
use pharma_core::{Clock, SystemClock};
use serde::Serialize;
use serde_json::Value;

use crate::error::InvoiceError;
use crate::pdf::PdfInvoice;

/// Ordered `key -> value` lines. Order is the caller's insertion order.
pub type Fields = IndexMap<String, String>;

/// Which document to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    /// Single-page PDF: title, generation date/time, one line per field.
    TaxInvoice,
    /// The fields as a JSON object, keys in order.
    Metadata,
}

/// Turns ordered fields into document bytes.
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, layout: LayoutKind, fields: &Fields) -> Result<Vec<u8>, InvoiceError>;
}

/// The production renderer.
#[derive(Clone)]
pub struct InvoiceRenderer {
    title: String,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for InvoiceRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvoiceRenderer")
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

impl InvoiceRenderer {
    pub fn new(title: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            title: title.into(),
            clock,
        }
    }

    /// Renderer stamping documents with wall-clock time.
    pub fn with_system_clock(title: impl Into<String>) -> Self {
        Self::new(title, Arc::new(SystemClock))
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

impl DocumentRenderer for InvoiceRenderer {
    fn render(&self, layout: LayoutKind, fields: &Fields) -> Result<Vec<u8>, InvoiceError> {
        match layout {
            LayoutKind::TaxInvoice => {
                if fields.is_empty() {
                    return Err(InvoiceError::NoFields);
                }
                let generated_at = self.clock.now();
                let bytes = PdfInvoice {
                    title: &self.title,
                    generated_at,
                    fields,
                }
                .to_bytes();
                tracing::debug!(fields = fields.len(), size = bytes.len(), "rendered tax invoice");
                Ok(bytes)
            }
            LayoutKind::Metadata => Ok(serde_json::to_vec(fields)?),
        }
    }
}

/// Flatten a serializable record into ordered text fields.
///
/// Field order follows the record's serialization order. Strings are taken
/// as-is, numbers and booleans in their JSON spelling. Nested values are
/// rejected.
pub fn record_fields<T: Serialize>(record: &T) -> Result<Fields, InvoiceError> {
    let json = serde_json::to_string(record)?;
    let raw: IndexMap<String, Value> =
        serde_json::from_str(&json).map_err(|e| InvoiceError::NotFlat(e.to_string()))?;
    raw.into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(InvoiceError::NotFlat(format!("field {key} is nested")))
                }
            };
            Ok((key, text))
        })
        .collect()
}
