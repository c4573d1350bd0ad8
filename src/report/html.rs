use super::{heading, RenderError, ReportMeta, ReportSink};
use crate::diagnostics::{FacetValue, Verdict};
use std::fmt::Write;

const STYLE: &str = r#"body { font-family: Arial, sans-serif; margin: 2em; }
h1 { color: #2d5fa4; }
h2 { color: #1a3d6d; border-bottom: 1px solid #ccc; }
.section { margin-bottom: 2em; }
.state-good { color: green; font-weight: bold; }
.state-failed { color: red; font-weight: bold; }
.state-unknown { color: #888; font-weight: bold; }
.state-healthy { color: green; font-weight: bold; }
.state-unhealthy { color: red; font-weight: bold; }
.generated { color: #555; font-size: 0.9em; }
pre { background: #f8f8f8; border: 1px solid #ddd; padding: 8px; overflow-x: auto; }"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// Standalone page with header and stylesheet
    Document,
    /// Single-service page served by the web UI
    Fragment,
}

pub struct HtmlSink {
    buf: String,
    layout: Layout,
}

impl HtmlSink {
    pub fn document(meta: &ReportMeta) -> Self {
        let mut buf = String::new();
        buf.push_str("<!DOCTYPE html>\n<html><head><meta charset='utf-8'>");
        buf.push_str(&format!("<title>{}</title>\n", escape_html(&meta.title)));
        buf.push_str(&format!("<style>\n{STYLE}\n</style></head><body>\n"));
        buf.push_str(&format!("<h1>{}</h1>\n", escape_html(&meta.title)));
        buf.push_str(&format!(
            "<p class='generated'>{}</p>\n",
            escape_html(&meta.generated_line())
        ));
        Self {
            buf,
            layout: Layout::Document,
        }
    }

    pub fn fragment() -> Self {
        Self {
            buf: format!("<style>\n{STYLE}\n</style>\n"),
            layout: Layout::Fragment,
        }
    }
}

impl ReportSink for HtmlSink {
    type Output = String;

    fn begin_section(&mut self, title: &str) -> Result<(), RenderError> {
        let title = escape_html(title);
        match self.layout {
            Layout::Document => writeln!(self.buf, "<div class='section'><h2>{title}</h2>")?,
            Layout::Fragment => writeln!(self.buf, "<div class='section'><h2>{title} Diagnostics</h2>")?,
        }
        Ok(())
    }

    fn emit_facet(
        &mut self,
        name: &str,
        verdict: Verdict,
        value: &FacetValue,
    ) -> Result<(), RenderError> {
        writeln!(
            self.buf,
            "<div><span class='{}'>{}</span></div>",
            verdict.css_class(),
            escape_html(&heading(name, verdict))
        )?;
        writeln!(self.buf, "<pre>{}</pre>", escape_html(&value.pretty(4)))?;
        Ok(())
    }

    fn end_section(&mut self) -> Result<(), RenderError> {
        self.buf.push_str("</div>\n");
        Ok(())
    }

    fn finish(mut self) -> Result<Self::Output, RenderError> {
        match self.layout {
            Layout::Document => self.buf.push_str("</body></html>\n"),
            Layout::Fragment => self.buf.push_str("<a href=\"/\">Back</a>\n"),
        }
        Ok(self.buf)
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
