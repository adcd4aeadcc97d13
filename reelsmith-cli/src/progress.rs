// ============================================================================
// reelsmith-cli/src/progress.rs
// ============================================================================
//
// PROGRESS REPORTING: indicatif bar driven by the core progress callback
//
// The core reports progress as a fraction in 0..=1. The bar maps that onto
// a per-mille scale so small steps on long encodes still move it.

use console::Term;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const BAR_SCALE: u64 = 1000;

/// Terminal progress bar for one encoder run.
#[derive(Debug, Clone)]
pub struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    /// Creates a bar labelled with `message`. It is hidden when stderr is
    /// not a terminal.
    pub fn new(message: impl Into<String>) -> Self {
        let bar = ProgressBar::new(BAR_SCALE);
        if Term::stderr().is_term() {
            bar.set_draw_target(ProgressDrawTarget::stderr());
        } else {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        let style = ProgressStyle::with_template(
            "{msg} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {percent:>3}% (eta {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
        bar.set_style(style);
        bar.set_message(message.into());
        Self { bar }
    }

    /// Moves the bar to `fraction` of the way.
    pub fn update(&self, fraction: f64) {
        self.bar.set_position(Self::position_for(fraction));
    }

    /// Callback to hand to the core's `run` methods.
    pub fn callback(&self) -> impl FnMut(f64) + '_ {
        move |fraction| self.update(fraction)
    }

    pub fn finish(&self, message: impl Into<String>) {
        self.bar.finish_with_message(message.into());
    }

    pub fn abandon(&self) {
        self.bar.abandon();
    }

    fn position_for(fraction: f64) -> u64 {
        if !fraction.is_finite() {
            return 0;
        }
        (fraction.clamp(0.0, 1.0) * BAR_SCALE as f64).round() as u64
    }

    /// Formats a duration in seconds as `HH:MM:SS`.
    #[must_use]
    pub fn format_duration_seconds(seconds: f64) -> String {
        let total = if seconds.is_finite() && seconds > 0.0 {
            seconds as u64
        } else {
            0
        };
        format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
    }
}
