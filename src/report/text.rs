use super::{body_lines, heading, sanitize_line, RenderError, ReportMeta, ReportSink};
use crate::diagnostics::{FacetValue, Verdict};
use std::fmt::Write;

const RULE_WIDTH: usize = 60;

/// Plain ASCII report suitable for attachments and tickets
pub struct TextSink {
    buf: String,
}

impl TextSink {
    pub fn new(meta: &ReportMeta) -> Self {
        let mut buf = String::new();
        buf.push_str(&sanitize_line(&meta.title));
        buf.push('\n');
        buf.push_str(&sanitize_line(&meta.generated_line()));
        buf.push('\n');
        Self { buf }
    }
}

impl ReportSink for TextSink {
    type Output = String;

    fn begin_section(&mut self, title: &str) -> Result<(), RenderError> {
        let rule = "=".repeat(RULE_WIDTH);
        write!(self.buf, "\n{rule}\n{}\n{rule}\n", sanitize_line(title))?;
        Ok(())
    }

    fn emit_facet(
        &mut self,
        name: &str,
        verdict: Verdict,
        value: &FacetValue,
    ) -> Result<(), RenderError> {
        writeln!(self.buf, "  {}", sanitize_line(&heading(name, verdict)))?;
        writeln!(self.buf, "  {}", "-".repeat(name.len()))?;
        for line in body_lines(value, 4) {
            writeln!(self.buf, "{line}")?;
        }
        Ok(())
    }

    fn end_section(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    fn finish(self) -> Result<Self::Output, RenderError> {
        Ok(self.buf)
    }
}
