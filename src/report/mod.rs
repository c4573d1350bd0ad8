//! Format-agnostic report rendering.
//!
//! [`render`] walks the sections once, classifies every facet and hands the
//! `(name, verdict, value)` triple to a [`ReportSink`]. Sinks only format.

pub mod console;
pub mod html;
pub mod json;
pub mod pdf;
pub mod text;

use crate::diagnostics::{classify, DiagnosticsResult, FacetValue, Verdict};
use chrono::{DateTime, Local};
use std::fmt;
use thiserror::Error;

pub use console::ConsoleSink;
pub use html::HtmlSink;
pub use json::JsonSink;
pub use pdf::PdfSink;
pub use text::TextSink;

pub const REPORT_TITLE: &str = "HashiCorp Doctor Diagnostics Report";

/// Column width used by the text and PDF sinks
pub const WRAP_WIDTH: usize = 90;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to format report: {0}")]
    Fmt(#[from] fmt::Error),
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// One service's block of the report
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    /// `Err` when the aggregator itself died
    pub outcome: Result<DiagnosticsResult, String>,
}

impl Section {
    pub fn new(title: impl Into<String>, outcome: Result<DiagnosticsResult, String>) -> Self {
        Self {
            title: title.into(),
            outcome,
        }
    }

    pub fn ok(title: impl Into<String>, result: DiagnosticsResult) -> Self {
        Self::new(title, Ok(result))
    }

    pub fn failed(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, Err(message.into()))
    }
}

/// Who/when stamp printed at the top of document sinks
#[derive(Debug, Clone)]
pub struct ReportMeta {
    pub title: String,
    pub generated: DateTime<Local>,
    pub host: String,
}

impl ReportMeta {
    pub fn new(title: impl Into<String>) -> Self {
        let host = hostname::get()
            .map(|h| h.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "unknown".to_string());
        Self {
            title: title.into(),
            generated: Local::now(),
            host,
        }
    }

    pub fn generated_line(&self) -> String {
        format!(
            "Generated: {} on {}",
            self.generated.format("%Y-%m-%d %H:%M:%S %Z"),
            self.host
        )
    }
}

impl Default for ReportMeta {
    fn default() -> Self {
        Self::new(REPORT_TITLE)
    }
}

/// Formatting backend driven by [`render`]
pub trait ReportSink {
    type Output;

    fn begin_section(&mut self, title: &str) -> Result<(), RenderError>;
    fn emit_facet(
        &mut self,
        name: &str,
        verdict: Verdict,
        value: &FacetValue,
    ) -> Result<(), RenderError>;
    fn end_section(&mut self) -> Result<(), RenderError>;
    fn finish(self) -> Result<Self::Output, RenderError>;
}

/// Single traversal shared by every sink.
///
/// A section whose aggregator failed is rendered as one `error` facet.
pub fn render<S: ReportSink>(sections: &[Section], mut sink: S) -> Result<S::Output, RenderError> {
    for section in sections {
        sink.begin_section(&section.title)?;
        match &section.outcome {
            Ok(result) => {
                for (name, value) in result.iter() {
                    sink.emit_facet(name, classify(name, value), value)?;
                }
            }
            Err(message) => {
                let value = FacetValue::error(message.as_str());
                sink.emit_facet("error", classify("error", &value), &value)?;
            }
        }
        sink.end_section()?;
    }
    sink.finish()
}

/// `NAME - Verdict`; the autopilot health facets use a double dash
pub fn heading(name: &str, verdict: Verdict) -> String {
    let separator = match name {
        "autopilot_health" | "autopilot_state" => "--",
        _ => "-",
    };
    format!("{} {} {}", name.to_uppercase(), separator, verdict)
}

/// Replace anything outside printable ASCII with `?`; tabs and newlines become spaces
pub fn sanitize_line(line: &str) -> String {
    line.chars()
        .map(|c| match c {
            '\t' | '\n' | '\r' => ' ',
            ' '..='~' => c,
            _ => '?',
        })
        .collect()
}

/// Hard-wrap into `width`-column chunks, dropping whitespace-only chunks
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    chars
        .chunks(width.max(1))
        .map(|chunk| chunk.iter().collect::<String>())
        .filter(|chunk| !chunk.trim().is_empty())
        .collect()
}

/// Sanitized, wrapped body lines of a facet value
pub fn body_lines(value: &FacetValue, indent: usize) -> Vec<String> {
    value
        .pretty(indent)
        .lines()
        .flat_map(|line| wrap_line(&sanitize_line(line), WRAP_WIDTH))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Console,
    Html,
    Text,
    Pdf,
    Json,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Console | ReportFormat::Text => "txt",
            ReportFormat::Html => "html",
            ReportFormat::Pdf => "pdf",
            ReportFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ReportFormat::Console | ReportFormat::Text => "text/plain; charset=utf-8",
            ReportFormat::Html => "text/html; charset=utf-8",
            ReportFormat::Pdf => "application/pdf",
            ReportFormat::Json => "application/json",
        }
    }
}

/// A finished report document
#[derive(Debug, Clone)]
pub struct Report {
    pub format: ReportFormat,
    pub body: Vec<u8>,
}

impl Report {
    pub fn as_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Render complete documents for every format
pub fn render_report(
    sections: &[Section],
    format: ReportFormat,
    meta: &ReportMeta,
) -> Result<Report, RenderError> {
    let body = match format {
        ReportFormat::Console => render(sections, ConsoleSink::new(Vec::new()))?,
        ReportFormat::Html => render(sections, HtmlSink::document(meta))?.into_bytes(),
        ReportFormat::Text => render(sections, TextSink::new(meta))?.into_bytes(),
        ReportFormat::Pdf => render(sections, PdfSink::new(meta))?,
        ReportFormat::Json => render(sections, JsonSink::new(meta))?,
    };
    Ok(Report { format, body })
}
