//! Progress bar driven by the executor's per-result callback

use anyhow::Result;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::config::{PROGRESS_CHARS, PROGRESS_TEMPLATE};
use super::result::TaskResult;

/// A single bar advanced once per finished repository
///
/// `ProgressBar` is internally synchronized, so [`RunProgress::observe`] may be
/// called from several workers at once.
pub struct RunProgress {
    bar: ProgressBar,
}

impl RunProgress {
    /// Creates a bar drawn to stderr for `total` repositories
    pub fn new(label: &str, total: usize) -> Result<Self> {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(create_progress_style()?);
        bar.set_prefix(label.to_string());
        Ok(Self { bar })
    }

    /// A bar that draws nothing, for JSON output and tests
    pub fn hidden(total: usize) -> Self {
        let bar = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::hidden());
        Self { bar }
    }

    pub fn observe(&self, result: &TaskResult) {
        self.bar
            .set_message(format!("{} {}", result.outcome.symbol(), result.repo_name));
        self.bar.inc(1);
    }

    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Removes the bar so the report starts on a clean line
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Returns a ProgressStyle configured with the application's visual styling
pub(crate) fn create_progress_style() -> Result<ProgressStyle> {
    Ok(ProgressStyle::default_bar()
        .template(PROGRESS_TEMPLATE)?
        .progress_chars(PROGRESS_CHARS))
}
