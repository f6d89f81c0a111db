use crate::core::base::*;

use indicatif::*;

const PROGRESS_STEPS: u64 = 1000;

/// Terminal progress bar fed from a fractional progress value.
pub struct ProgressReporter {
    pb: ProgressBar,
}

impl ProgressReporter {
    pub fn new(title: &str) -> Self {
        let pb = ProgressBar::new(PROGRESS_STEPS);
        let template = format!("{{spinner:.bold.green}} {}: ", title)
            + "[{wide_bar:.cyan}] {percent:>3}% ({elapsed_precise}|{eta_precise}) {msg}";
        let style = ProgressStyle::with_template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▇▆▅▄▃▂▁  ");
        pb.set_style(style);
        pb.tick();
        ProgressReporter { pb }
    }

    pub fn hidden() -> Self {
        ProgressReporter {
            pb: ProgressBar::hidden(),
        }
    }

    pub fn update(&mut self, fraction: Float) {
        let pos = (Float::clamp(fraction, 0.0, 1.0) * PROGRESS_STEPS as Float) as u64;
        self.pb.set_position(pos);
    }

    pub fn set_message(&mut self, msg: &str) {
        self.pb.set_message(msg.to_string());
    }

    pub fn done(&mut self) {
        self.pb.set_position(PROGRESS_STEPS);
        self.pb.finish();
    }
}
