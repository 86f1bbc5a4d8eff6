//! Progress bar utilities for report runs
//!
//! Fetching a day of depth per (venue, pair) is slow, so the CLI shows one
//! bar per report and a spinner for single requests.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress bar over the rows of one report
pub struct ReportProgress {
    pub progress: ProgressBar,
}

impl ReportProgress {
    pub fn new(total_rows: usize, label: &str) -> Self {
        let progress = ProgressBar::new(total_rows as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template(&format!(
                    "{{spinner:.green}} {} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}}\n{{msg}}",
                    label
                ))
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        Self { progress }
    }

    /// Advance one row, flagging rows that came back empty
    pub fn row_done(&self, name: &str, complete: bool) {
        self.progress.inc(1);
        if complete {
            self.progress.set_message(format!("📊 {}", name));
        } else {
            self.progress.set_message(format!("⚠️  {} (no data)", name));
        }
    }

    pub fn finish(&self, failed_rows: usize) {
        let total = self.progress.length().unwrap_or(0);
        if failed_rows == 0 {
            self.progress
                .finish_with_message(format!("✅ {} rows complete", total));
        } else {
            self.progress.finish_with_message(format!(
                "✅ {} rows, {} without data",
                total, failed_rows
            ));
        }
    }
}

/// Spinner for quick operations
pub struct Spinner {
    pub spinner: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner.set_message(message.to_string());

        Self { spinner }
    }

    pub fn finish(&self, message: &str) {
        self.spinner.finish_with_message(format!("✅ {}", message));
    }

    pub fn finish_with_error(&self, message: &str) {
        self.spinner.finish_with_message(format!("❌ {}", message));
    }
}
