use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

const PROGRESS_SCALE: u64 = 1000;

/// Receives batch progress as a fraction in `[0, 1]`
pub trait ProgressSink: Send + Sync {
    fn report(&self, fraction: f64, message: &str);
}

/// Receives human readable log lines from a translation run
pub trait LogSink: Send + Sync {
    fn info(&self, message: &str);
}

/// Terminal progress bar
pub struct ConsoleProgress {
    bar: ProgressBar,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(PROGRESS_SCALE);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { bar }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ConsoleProgress {
    fn report(&self, fraction: f64, message: &str) {
        let position = (fraction.clamp(0.0, 1.0) * PROGRESS_SCALE as f64).round() as u64;
        self.bar.set_position(position);
        if position >= PROGRESS_SCALE {
            self.bar.finish_with_message(message.to_string());
        } else {
            self.bar.set_message(message.to_string());
        }
    }
}

/// Forwards log lines to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl LogSink for TracingLog {
    fn info(&self, message: &str) {
        info!("{}", message);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct RecordingProgress {
        pub reports: Mutex<Vec<(f64, String)>>,
    }

    impl ProgressSink for RecordingProgress {
        fn report(&self, fraction: f64, message: &str) {
            self.reports.lock().unwrap().push((fraction, message.to_string()));
        }
    }

    #[derive(Default)]
    pub struct RecordingLog {
        pub lines: Mutex<Vec<String>>,
    }

    impl RecordingLog {
        pub fn contains(&self, needle: &str) -> bool {
            self.lines.lock().unwrap().iter().any(|line| line.contains(needle))
        }
    }

    impl LogSink for RecordingLog {
        fn info(&self, message: &str) {
            self.lines.lock().unwrap().push(message.to_string());
        }
    }
}
