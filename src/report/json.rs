use super::{RenderError, ReportMeta, ReportSink};
use crate::diagnostics::{FacetValue, Verdict};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct JsonReport {
    title: String,
    generated: String,
    host: String,
    sections: Vec<JsonSection>,
}

#[derive(Debug, Serialize)]
struct JsonSection {
    title: String,
    facets: Vec<JsonFacet>,
}

#[derive(Debug, Serialize)]
struct JsonFacet {
    name: String,
    verdict: Verdict,
    value: FacetValue,
}

/// Machine-readable report with verdicts alongside raw values
pub struct JsonSink {
    report: JsonReport,
}

impl JsonSink {
    pub fn new(meta: &ReportMeta) -> Self {
        Self {
            report: JsonReport {
                title: meta.title.clone(),
                generated: meta.generated.to_rfc3339(),
                host: meta.host.clone(),
                sections: Vec::new(),
            },
        }
    }
}

impl ReportSink for JsonSink {
    type Output = Vec<u8>;

    fn begin_section(&mut self, title: &str) -> Result<(), RenderError> {
        self.report.sections.push(JsonSection {
            title: title.to_string(),
            facets: Vec::new(),
        });
        Ok(())
    }

    fn emit_facet(
        &mut self,
        name: &str,
        verdict: Verdict,
        value: &FacetValue,
    ) -> Result<(), RenderError> {
        if let Some(section) = self.report.sections.last_mut() {
            section.facets.push(JsonFacet {
                name: name.to_string(),
                verdict,
                value: value.clone(),
            });
        }
        Ok(())
    }

    fn end_section(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    fn finish(self) -> Result<Self::Output, RenderError> {
        Ok(serde_json::to_vec_pretty(&self.report)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticsResult;
    use crate::report::{render, Section};
    use serde_json::{json, Value};

    #[test]
    fn sections_and_verdicts_are_serialized_in_order() {
        let mut result = DiagnosticsResult::new();
        result.insert("jobs", FacetValue::from_json(json!([])));
        result.insert("leader", FacetValue::text_scalar("10.0.0.1:4647"));
        let sections = vec![Section::ok("Nomad", result), Section::failed("Vault", "boom")];

        let bytes = render(&sections, JsonSink::new(&ReportMeta::default())).unwrap();
        let doc: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(doc["title"], "HashiCorp Doctor Diagnostics Report");
        assert_eq!(doc["sections"][0]["title"], "Nomad");
        assert_eq!(doc["sections"][0]["facets"][0]["verdict"], "Failed");
        assert_eq!(doc["sections"][0]["facets"][1]["value"], "10.0.0.1:4647");
        assert_eq!(doc["sections"][0]["facets"][1]["verdict"], "Good");
        assert_eq!(doc["sections"][1]["facets"][0]["name"], "error");
        assert_eq!(doc["sections"][1]["facets"][0]["value"], "boom");
    }
}
