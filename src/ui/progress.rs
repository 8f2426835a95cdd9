use std::future::Future;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::ui::icons::{CHECK, CROSS, WARN};

/// A labelled unit of work shown as a spinner on stderr.
///
/// The spinner resolves into exactly one final line: succeeded, warned or
/// failed. When stderr is not a terminal the spinner is hidden and only the
/// final line is printed.
pub struct Step {
    bar: ProgressBar,
    label: String,
}

impl Step {
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        let bar = if console::user_attended_stderr() {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.cyan} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        } else {
            ProgressBar::hidden()
        };
        bar.set_message(label.clone());
        Self { bar, label }
    }

    pub fn succeed(self) {
        let line = format!("{}{}", CHECK, self.label);
        self.finish(line);
    }

    /// Finish with a warning; `note` replaces the label on the final line.
    pub fn warn(self, note: &str) {
        let line = format!("{}{}", WARN, style(note).yellow());
        self.finish(line);
    }

    pub fn fail(self) {
        let line = format!("{}{}", CROSS, style(&self.label).red());
        self.finish(line);
    }

    fn finish(self, line: String) {
        self.bar.finish_and_clear();
        eprintln!("{}", line);
    }

    /// Run `work` under a spinner labelled `label`, resolving the step from
    /// the result.
    pub async fn run<T, E, F>(label: impl Into<String>, work: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        let step = Step::start(label);
        match work.await {
            Ok(value) => {
                step.succeed();
                Ok(value)
            }
            Err(err) => {
                step.fail();
                Err(err)
            }
        }
    }
}

/// Print a status line that is not tied to a spinner.
pub fn print_line(msg: impl AsRef<str>) {
    eprintln!("{}", msg.as_ref());
}
