use indicatif::{ProgressBar, ProgressStyle};

/// Receives coarse progress checkpoints from long-running operations
pub trait ProgressReporter: Send + Sync {
    /// `fraction` runs from 0.0 to 1.0
    fn report(&self, message: &str, fraction: f32);
}

impl<F> ProgressReporter for F
where
    F: Fn(&str, f32) + Send + Sync,
{
    fn report(&self, message: &str, fraction: f32) {
        self(message, fraction);
    }
}

/// Discards every checkpoint
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _message: &str, _fraction: f32) {}
}

/// Terminal progress bar for the CLI
pub struct ConsoleProgress {
    bar: ProgressBar,
}

impl ConsoleProgress {
    #[must_use]
    pub fn new() -> Self {
        let bar = ProgressBar::new(100);
        if let Ok(style) = ProgressStyle::with_template("{bar:30.cyan/blue} {percent:>3}% {msg}") {
            bar.set_style(style);
        }
        Self { bar }
    }

    /// Clear the bar once the operation has finished
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for ConsoleProgress {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn report(&self, message: &str, fraction: f32) {
        let position = (fraction.clamp(0.0, 1.0) * 100.0).round() as u64;
        self.bar.set_position(position);
        self.bar.set_message(message.to_string());
    }
}
