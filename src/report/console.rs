use super::{heading, RenderError, ReportSink};
use crate::diagnostics::{FacetValue, Verdict};
use colored::{ColoredString, Colorize};
use std::io::Write;

/// Colored terminal output, one block per facet
pub struct ConsoleSink<W: Write> {
    out: W,
    tally: [usize; 5],
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, tally: [0; 5] }
    }
}

fn tally_slot(verdict: Verdict) -> usize {
    match verdict {
        Verdict::Good => 0,
        Verdict::Healthy => 1,
        Verdict::Failed => 2,
        Verdict::Unhealthy => 3,
        Verdict::Unknown => 4,
    }
}

fn paint(text: &str, verdict: Verdict) -> ColoredString {
    match verdict {
        Verdict::Good | Verdict::Healthy => text.green().bold(),
        Verdict::Failed | Verdict::Unhealthy => text.red().bold(),
        Verdict::Unknown => text.dimmed().bold(),
    }
}

impl<W: Write> ReportSink for ConsoleSink<W> {
    type Output = W;

    fn begin_section(&mut self, title: &str) -> Result<(), RenderError> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", format!("[{title} Diagnostics]").yellow().bold())?;
        Ok(())
    }

    fn emit_facet(
        &mut self,
        name: &str,
        verdict: Verdict,
        value: &FacetValue,
    ) -> Result<(), RenderError> {
        self.tally[tally_slot(verdict)] += 1;
        writeln!(self.out)?;
        writeln!(self.out, "  {}", paint(&heading(name, verdict), verdict))?;
        writeln!(self.out, "{}", value.pretty(4))?;
        Ok(())
    }

    fn end_section(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    fn finish(mut self) -> Result<Self::Output, RenderError> {
        let [good, healthy, failed, unhealthy, unknown] = self.tally;
        writeln!(self.out)?;
        writeln!(
            self.out,
            "Summary: {} good, {} healthy, {} failed, {} unhealthy, {} unknown",
            good.to_string().green(),
            healthy.to_string().green(),
            failed.to_string().red(),
            unhealthy.to_string().red(),
            unknown.to_string().dimmed()
        )?;
        self.out.flush()?;
        Ok(self.out)
    }
}
