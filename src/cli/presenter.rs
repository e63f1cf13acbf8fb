//! CLI presenter for output formatting

use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Presenter for CLI output formatting
#[derive(Debug, Clone, Copy)]
pub struct Presenter {
    quiet_spinner: bool,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self {
            quiet_spinner: false,
        }
    }

    /// Presenter whose spinners never draw (used while debug logs stream)
    pub fn without_spinner() -> Self {
        Self {
            quiet_spinner: true,
        }
    }

    /// Start a spinner with message. The bar is cheap to clone into callbacks.
    pub fn start_spinner(&self, message: &str) -> ProgressBar {
        if self.quiet_spinner {
            let spinner = ProgressBar::hidden();
            spinner.set_message(message.to_string());
            return spinner;
        }

        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    }

    /// Print a completed step above a running spinner
    pub fn step_done(&self, spinner: &ProgressBar, message: &str) {
        let line = format!("{} {}", "✓".green(), message);
        if spinner.is_hidden() {
            eprintln!("{}", line);
        } else {
            spinner.println(line);
        }
    }

    /// Clear the spinner line
    pub fn stop_spinner(&self, spinner: &ProgressBar) {
        spinner.finish_and_clear();
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout (transcript paths, config values)
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// Format elapsed wall-clock time, e.g. `4.2s` or `2m 05s`
    pub fn format_elapsed(&self, elapsed: Duration) -> String {
        let total_secs = elapsed.as_secs();
        if total_secs < 60 {
            format!("{:.1}s", elapsed.as_secs_f64())
        } else {
            format!("{}m {:02}s", total_secs / 60, total_secs % 60)
        }
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_elapsed_under_a_minute() {
        let presenter = Presenter::new();
        assert_eq!(presenter.format_elapsed(Duration::from_millis(4200)), "4.2s");
        assert_eq!(presenter.format_elapsed(Duration::ZERO), "0.0s");
    }

    #[test]
    fn format_elapsed_minutes() {
        let presenter = Presenter::new();
        assert_eq!(presenter.format_elapsed(Duration::from_secs(125)), "2m 05s");
        assert_eq!(presenter.format_elapsed(Duration::from_secs(60)), "1m 00s");
    }

    #[test]
    fn hidden_spinner_keeps_message() {
        let presenter = Presenter::without_spinner();
        let spinner = presenter.start_spinner("Converting audio...");
        assert!(spinner.is_hidden());
        assert_eq!(spinner.message(), "Converting audio...");
    }
}
