//! Per-repository commands
//!
//! Each command has an explicit parameters struct, a task constructor that
//! turns the parameters into a [`Task`] for the executor, and a handler that
//! prints the header, runs the task over the registry and reports the summary.
//! Handlers return `true` when any repository failed.

pub mod checkout;
pub mod clone;
pub mod exec;
pub mod pull;
pub mod push;
pub mod tag;

use anyhow::{Context, Result};
use std::io::Write;
use std::time::Instant;
use tokio::runtime::Handle;

use crate::config::Config;
use crate::core::{
    CancellationToken, Executor, Registry, RepoError, Reporter, RunProgress, Summary, Task,
    TaskResult,
};

/// Report format selected with `--format`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => anyhow::bail!("unknown output format '{other}' (expected text or json)"),
        }
    }
}

/// State shared by every command in one invocation
pub struct CommandContext {
    pub registry: Registry,
    pub runtime: Handle,
    pub cancel: CancellationToken,
    pub format: OutputFormat,
    pub verbose: bool,
}

impl CommandContext {
    pub fn new(config: Config, runtime: Handle, cancel: CancellationToken) -> Self {
        Self {
            registry: Registry::new(config),
            runtime,
            cancel,
            format: OutputFormat::Text,
            verbose: false,
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Applies a `--parallel` override; `<= 0` keeps the configured value
    pub fn with_parallelism(mut self, workers: i64) -> Self {
        self.registry = self.registry.with_parallelism(workers);
        self
    }

    pub fn is_text(&self) -> bool {
        self.format == OutputFormat::Text
    }

    /// Prints the operation header in text mode
    pub fn header(&self, operation: &str) -> Result<()> {
        if self.is_text() {
            Reporter::new().print_header(operation, &[])?;
        }
        Ok(())
    }

    /// Runs `task` over the registry, driving a progress bar in text mode
    pub fn execute<T: Task>(&self, label: &str, task: T) -> Result<Summary> {
        let progress = self.progress(label)?;
        let observe = |result: &TaskResult| progress.observe(result);

        let summary = Executor::new(&self.registry).execute(task, &self.cancel, Some(&observe));
        progress.finish();
        Ok(summary)
    }

    fn progress(&self, label: &str) -> Result<RunProgress> {
        if self.is_text() {
            RunProgress::new(label, self.registry.count())
        } else {
            Ok(RunProgress::hidden(self.registry.count()))
        }
    }

    /// Prints the summary in the selected format and returns whether anything failed
    pub fn report(&self, summary: &Summary, with_output: bool) -> Result<bool> {
        let mut reporter = Reporter::new().verbose(self.verbose);
        self.report_to(&mut reporter, summary, with_output)
    }

    fn report_to<W: Write>(
        &self,
        reporter: &mut Reporter<W>,
        summary: &Summary,
        with_output: bool,
    ) -> Result<bool> {
        match self.format {
            OutputFormat::Json => reporter.print_json(summary),
            OutputFormat::Text if with_output => reporter.print_full_report_with_output(summary),
            OutputFormat::Text => reporter.print_full_report(summary),
        }
        .context("failed to write report")?;
        Ok(summary.has_failures())
    }
}

/// How a repository task finished when it did not fail
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Completion {
    Done,
    DoneWith(String),
    Skipped(String),
}

/// Converts a task outcome into a timed result
pub(crate) fn finish(
    repo_name: &str,
    start: Instant,
    outcome: Result<Completion, RepoError>,
) -> TaskResult {
    let elapsed = start.elapsed();
    match outcome {
        Ok(Completion::Done) => TaskResult::success(repo_name, elapsed),
        Ok(Completion::DoneWith(message)) => {
            TaskResult::success(repo_name, elapsed).with_message(message)
        }
        Ok(Completion::Skipped(message)) => TaskResult::skipped(repo_name, message),
        Err(err) => TaskResult::failed(repo_name, err, elapsed),
    }
}

/// Prefixes an error message with what had already happened
pub(crate) fn after(context: &str, mut err: RepoError) -> RepoError {
    err.message = format!("{context}: {}", err.message);
    err
}
