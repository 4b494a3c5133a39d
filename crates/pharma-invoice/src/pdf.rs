//! Minimal PDF 1.4 writer for the tax invoice layout.
//!
//! Layout (PDF user space, origin bottom-left, page `w` x `h`):
//!
//! | Element | Position | Font |
//! |---------|----------|------|
//! | Title | `(w/2 - 100, h - 50)` | Helvetica-Bold 18 |
//! | `Time: HH:MM:SS` | `(w - 200, h - 70)` | Helvetica 12 |
//! | `Date: YYYY-MM-DD` | `(w - 200, h - 80)` | Helvetica 12 |
//! | Field lines | `(50, h - 100 - 20 i)` | Helvetica 15 |
//!
//! The page is A4 wide. It is A4 tall unless the field lines need more room,
//! in which case it grows so every line stays above the bottom margin. The
//! content stream is left uncompressed.

use pharma_core::Timestamp;

use crate::layout::Fields;

pub const PAGE_WIDTH: f64 = 595.28;
pub const MIN_PAGE_HEIGHT: f64 = 841.89;

const TITLE_SIZE: u32 = 18;
const STAMP_SIZE: u32 = 12;
const FIELD_SIZE: u32 = 15;
const FIELD_X: f64 = 50.0;
const FIELD_TOP: f64 = 100.0;
const LINE_STEP: f64 = 20.0;
const BOTTOM_MARGIN: f64 = 40.0;

/// One tax invoice, ready to serialize.
#[derive(Debug)]
pub struct PdfInvoice<'a> {
    pub title: &'a str,
    pub generated_at: Timestamp,
    pub fields: &'a Fields,
}

impl PdfInvoice<'_> {
    /// Page height needed to fit every field line.
    pub fn page_height(&self) -> f64 {
        let lines = self.fields.len().saturating_sub(1) as f64;
        MIN_PAGE_HEIGHT.max(FIELD_TOP + LINE_STEP * lines + BOTTOM_MARGIN)
    }

    fn content_stream(&self) -> String {
        let w = PAGE_WIDTH;
        let h = self.page_height();
        let mut ops = String::new();
        text_op(&mut ops, "F2", TITLE_SIZE, w / 2.0 - 100.0, h - 50.0, self.title);
        text_op(
            &mut ops,
            "F1",
            STAMP_SIZE,
            w - 200.0,
            h - 80.0,
            &format!("Date: {}", self.generated_at.date_display()),
        );
        text_op(
            &mut ops,
            "F1",
            STAMP_SIZE,
            w - 200.0,
            h - 70.0,
            &format!("Time: {}", self.generated_at.time_display()),
        );
        for (i, (key, value)) in self.fields.iter().enumerate() {
            let y = h - FIELD_TOP - LINE_STEP * i as f64;
            text_op(&mut ops, "F1", FIELD_SIZE, FIELD_X, y, &format!("{key}: {value}"));
        }
        ops
    }

    /// Serialize the document.
    pub fn to_bytes(&self) -> Vec<u8> {
        let content = self.content_stream();
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                 /Resources << /Font << /F1 4 0 R /F2 5 0 R >> >> /Contents 6 0 R >>",
                num(PAGE_WIDTH),
                num(self.page_height())
            ),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_string(),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
                .to_string(),
            format!("<< /Length {} >>\nstream\n{content}endstream", content.len()),
            format!(
                "<< /Title ({}) /CreationDate ({}) >>",
                escape(self.title),
                self.generated_at.to_pdf_date()
            ),
        ];

        let mut out: Vec<u8> = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
        }

        let xref_at = out.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            xref.push_str(&format!("{offset:010} 00000 n \n"));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
            objects.len() + 1,
            objects.len()
        ));
        out.extend_from_slice(xref.as_bytes());
        out
    }
}

fn text_op(ops: &mut String, font: &str, size: u32, x: f64, y: f64, text: &str) {
    ops.push_str(&format!(
        "BT /{font} {size} Tf {} {} Td ({}) Tj ET\n",
        num(x),
        num(y),
        escape(text)
    ));
}

/// Fixed two-decimal spelling with trailing zeros dropped.
fn num(v: f64) -> String {
    let s = format!("{v:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Escape a literal string for a Type1 font in WinAnsi encoding.
///
/// Latin-1 characters become octal escapes; anything outside Latin-1 is
/// drawn as `?`.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            '\n' | '\r' | '\t' => out.push(' '),
            ' '..='~' => out.push(c),
            '\u{a0}'..='\u{ff}' => out.push_str(&format!("\\{:03o}", c as u32)),
            _ => out.push('?'),
        }
    }
    out
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn escaped_text_is_ascii_with_balanced_delimiters(s in "\\PC{0,64}") {
            let e = escape(&s);
            prop_assert!(e.is_ascii());
            let bytes = e.as_bytes();
            let mut i = 0;
            while i < bytes.len() {
                match bytes[i] {
                    b'\\' => i += 2,
                    b'(' | b')' => prop_assert!(false, "bare delimiter in {e}"),
                    _ => i += 1,
                }
            }
        }
    }
}
