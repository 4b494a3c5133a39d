//! QR payloads for record snapshots.
//!
//! The payload is the record serialized as compact JSON; scanners show it
//! as text.

use qrcode::render::svg;
use qrcode::QrCode;
use serde::Serialize;

use crate::error::InvoiceError;

const MIN_DIMENSION: u32 = 200;

/// JSON payload for a record snapshot.
pub fn qr_payload<T: Serialize>(record: &T) -> Result<String, InvoiceError> {
    Ok(serde_json::to_string(record)?)
}

/// Draw `payload` as an SVG QR code.
pub fn render_qr_svg(payload: &str) -> Result<String, InvoiceError> {
    let code = QrCode::new(payload.as_bytes()).map_err(|e| InvoiceError::Qr(e.to_string()))?;
    Ok(code
        .render::<svg::Color<'_>>()
        .min_dimensions(MIN_DIMENSION, MIN_DIMENSION)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Snapshot<'a> {
        id: &'a str,
        name: &'a str,
    }

    #[test]
    fn payload_is_compact_json() {
        let p = qr_payload(&Snapshot { id: "7", name: "X" }).unwrap();
        assert_eq!(p, r#"{"id":"7","name":"X"}"#);
    }

    #[test]
    fn svg_is_rendered() {
        let svg = render_qr_svg(r#"{"id":"7"}"#).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn oversized_payload_is_an_error() {
        let payload = "x".repeat(8000);
        assert!(matches!(render_qr_svg(&payload), Err(InvoiceError::Qr(_))));
    }
}
