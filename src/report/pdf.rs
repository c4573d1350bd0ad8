//! Self-contained PDF 1.4 writer.
//!
//! Only what the report needs: the built-in Courier font, A4 pages, and
//! top-to-bottom lines with automatic page breaks. All text reaching the
//! content stream has already been sanitized to printable ASCII.

use super::{body_lines, heading, sanitize_line, wrap_line, RenderError, ReportMeta, ReportSink};
use crate::diagnostics::{FacetValue, Verdict};
use std::io::Write;

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 42.0;
/// Courier advance width as a fraction of the font size
const COURIER_ADVANCE: f32 = 0.6;

const TITLE_SIZE: f32 = 14.0;
const SECTION_SIZE: f32 = 12.0;
const HEADING_SIZE: f32 = 10.0;
const BODY_SIZE: f32 = 8.0;

#[derive(Debug, Clone, PartialEq)]
struct Line {
    size: f32,
    text: String,
    centered: bool,
}

impl Line {
    fn leading(&self) -> f32 {
        self.size + 4.0
    }
}

pub struct PdfSink {
    lines: Vec<Line>,
}

impl PdfSink {
    pub fn new(meta: &ReportMeta) -> Self {
        let mut sink = Self { lines: Vec::new() };
        sink.push(TITLE_SIZE, &meta.title, true);
        sink.push(BODY_SIZE, &meta.generated_line(), false);
        sink.blank(BODY_SIZE);
        sink
    }

    fn push(&mut self, size: f32, text: &str, centered: bool) {
        let columns = ((PAGE_WIDTH - 2.0 * MARGIN) / (size * COURIER_ADVANCE)) as usize;
        for chunk in wrap_line(&sanitize_line(text), columns) {
            self.lines.push(Line {
                size,
                text: chunk,
                centered,
            });
        }
    }

    fn blank(&mut self, size: f32) {
        self.lines.push(Line {
            size,
            text: String::new(),
            centered: false,
        });
    }
}

impl ReportSink for PdfSink {
    type Output = Vec<u8>;

    fn begin_section(&mut self, title: &str) -> Result<(), RenderError> {
        self.push(SECTION_SIZE, &format!("[{title} Diagnostics]"), false);
        Ok(())
    }

    fn emit_facet(
        &mut self,
        name: &str,
        verdict: Verdict,
        value: &FacetValue,
    ) -> Result<(), RenderError> {
        self.push(HEADING_SIZE, &heading(name, verdict), false);
        for line in body_lines(value, 2) {
            self.lines.push(Line {
                size: BODY_SIZE,
                text: line,
                centered: false,
            });
        }
        Ok(())
    }

    fn end_section(&mut self) -> Result<(), RenderError> {
        self.blank(BODY_SIZE);
        Ok(())
    }

    fn finish(self) -> Result<Self::Output, RenderError> {
        let pages = paginate(&self.lines);
        write_document(&pages)
    }
}

/// Lay lines out top to bottom, starting a new page when the bottom margin is reached
fn paginate(lines: &[Line]) -> Vec<String> {
    let mut pages = Vec::new();
    let mut content = String::new();
    let mut y = PAGE_HEIGHT - MARGIN;

    for line in lines {
        let leading = line.leading();
        if y - leading < MARGIN && !content.is_empty() {
            pages.push(std::mem::take(&mut content));
            y = PAGE_HEIGHT - MARGIN;
        }
        y -= leading;
        if line.text.is_empty() {
            continue;
        }
        let x = if line.centered {
            let width = line.text.len() as f32 * line.size * COURIER_ADVANCE;
            ((PAGE_WIDTH - width) / 2.0).max(MARGIN)
        } else {
            MARGIN
        };
        content.push_str(&format!(
            "BT /F1 {} Tf {:.2} {:.2} Td ({}) Tj ET\n",
            line.size,
            x,
            y,
            escape_pdf_text(&line.text)
        ));
    }

    if !content.is_empty() || pages.is_empty() {
        pages.push(content);
    }
    pages
}

fn escape_pdf_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '(' | ')') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Serialize catalog, page tree, font, pages, xref table and trailer
fn write_document(pages: &[String]) -> Result<Vec<u8>, RenderError> {
    let mut out: Vec<u8> = Vec::new();
    let mut offsets: Vec<usize> = Vec::new();

    out.write_all(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n")?;

    // Objects 1..=3 are fixed; each page then takes a page object and a content stream.
    let page_ids: Vec<usize> = (0..pages.len()).map(|i| 4 + 2 * i).collect();
    let kids = page_ids
        .iter()
        .map(|id| format!("{id} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");

    offsets.push(out.len());
    write!(out, "1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n")?;

    offsets.push(out.len());
    write!(
        out,
        "2 0 obj\n<< /Type /Pages /Kids [{}] /Count {} >>\nendobj\n",
        kids,
        pages.len()
    )?;

    offsets.push(out.len());
    write!(
        out,
        "3 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Courier /Encoding /WinAnsiEncoding >>\nendobj\n"
    )?;

    for (content, page_id) in pages.iter().zip(&page_ids) {
        let content_id = page_id + 1;

        offsets.push(out.len());
        write!(
            out,
            "{page_id} 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {content_id} 0 R >>\nendobj\n"
        )?;

        offsets.push(out.len());
        write!(
            out,
            "{content_id} 0 obj\n<< /Length {} >>\nstream\n{}endstream\nendobj\n",
            content.len(),
            content
        )?;
    }

    let xref_offset = out.len();
    write!(out, "xref\n0 {}\n", offsets.len() + 1)?;
    out.write_all(b"0000000000 65535 f \n")?;
    for offset in &offsets {
        write!(out, "{offset:010} 00000 n \n")?;
    }
    write!(
        out,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        offsets.len() + 1,
        xref_offset
    )?;

    Ok(out)
}
