//! Text and JSON rendering of a completed [`Summary`]

use std::io::{self, Stdout, Write};

use super::config::SEPARATOR_WIDTH;
use super::result::{Outcome, Summary, TaskResult};

/// Writes results, summaries and status lines to any [`Write`] target
///
/// The reporter never mutates the summary it is given and can be called
/// repeatedly on the same one.
pub struct Reporter<W: Write = Stdout> {
    out: W,
    verbose: bool,
}

impl Reporter<Stdout> {
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for Reporter<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Reporter<W> {
    pub fn with_output(out: W) -> Self {
        Self {
            out,
            verbose: false,
        }
    }

    /// Always list failed repositories in the full report, not only on failure
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn print_result(&mut self, result: &TaskResult) -> io::Result<()> {
        writeln!(self.out, "  {result}")
    }

    pub fn print_results(&mut self, results: &[TaskResult]) -> io::Result<()> {
        for result in results {
            self.print_result(result)?;
        }
        Ok(())
    }

    pub fn print_summary(&mut self, summary: &Summary) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "Summary:")?;
        writeln!(self.out, "  Success: {}", summary.success_count)?;
        writeln!(self.out, "  Failed:  {}", summary.failed_count)?;
        if summary.skipped_count > 0 {
            writeln!(self.out, "  Skipped: {}", summary.skipped_count)?;
        }
        writeln!(
            self.out,
            "  Total time: {:.2}s",
            summary.total_duration.as_secs_f64()
        )
    }

    pub fn print_failed_details(&mut self, summary: &Summary) -> io::Result<()> {
        let failed = summary.failed_results();
        if failed.is_empty() {
            return Ok(());
        }

        writeln!(self.out)?;
        writeln!(self.out, "Failed repositories:")?;
        for result in failed {
            writeln!(self.out, "  ✗ {}", result.repo_name)?;
            if let Some(err) = &result.error {
                writeln!(self.out, "    Error: {err}")?;
            }
        }
        Ok(())
    }

    pub fn print_header(&mut self, operation: &str, details: &[&str]) -> io::Result<()> {
        writeln!(self.out, "{operation}...")?;
        for detail in details {
            writeln!(self.out, "  {detail}")?;
        }
        Ok(())
    }

    /// Per-result lines, the summary block and, when verbose or on failure, the failure listing
    pub fn print_full_report(&mut self, summary: &Summary) -> io::Result<()> {
        self.print_results(&summary.results)?;
        self.print_summary(summary)?;
        if self.verbose || summary.has_failures() {
            self.print_failed_details(summary)?;
        }
        Ok(())
    }

    /// Like [`Reporter::print_full_report`], with each result's captured output indented beneath it
    pub fn print_full_report_with_output(&mut self, summary: &Summary) -> io::Result<()> {
        for result in &summary.results {
            self.print_result_with_output(result)?;
        }
        self.print_summary(summary)?;
        if self.verbose || summary.has_failures() {
            self.print_failed_details(summary)?;
        }
        Ok(())
    }

    fn print_result_with_output(&mut self, result: &TaskResult) -> io::Result<()> {
        let secs = result.duration.as_secs_f64();
        let output = result.message.as_deref().filter(|m| !m.is_empty());

        match result.outcome {
            Outcome::Failed => match &result.error {
                Some(err) => writeln!(self.out, "  ✗ {} ({:.2}s) - {}", result.repo_name, secs, err)?,
                None => writeln!(self.out, "  ✗ {} ({:.2}s)", result.repo_name, secs)?,
            },
            Outcome::Skipped => writeln!(self.out, "  - {} (skipped)", result.repo_name)?,
            Outcome::Success => writeln!(self.out, "  ✓ {} ({:.2}s)", result.repo_name, secs)?,
        }

        if let Some(output) = output {
            for line in output.lines() {
                writeln!(self.out, "    {line}")?;
            }
        }
        Ok(())
    }

    pub fn print_progress(&mut self, current: usize, total: usize, repo_name: &str) -> io::Result<()> {
        writeln!(self.out, "[{current}/{total}] Processing {repo_name}...")
    }

    pub fn print_success(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "✓ {message}")
    }

    pub fn print_error(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "✗ {message}")
    }

    pub fn print_warning(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "⚠ {message}")
    }

    pub fn print_separator(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", "-".repeat(SEPARATOR_WIDTH))
    }

    /// Pretty-printed JSON of the whole summary
    pub fn print_json(&mut self, summary: &Summary) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut self.out, summary)?;
        writeln!(self.out)
    }
}
