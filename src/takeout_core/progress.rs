use indicatif::{ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}";

/// Numbers the enabled phases of a run: "1/3", "2/3", ...
#[derive(Debug, Clone)]
pub struct Stepper {
    total: usize,
    current: usize,
}

impl Stepper {
    pub fn new(total: usize) -> Self {
        Self { total, current: 0 }
    }

    /// Advance to the next phase and prefix `label` with its position.
    pub fn next_label(&mut self, label: &str) -> String {
        self.current += 1;
        format!("{}/{} {}", self.current, self.total, label)
    }
}

/// Progress bar for one phase.
pub fn phase_bar(len: usize, message: String) -> ProgressBar {
    let style = ProgressStyle::default_bar()
        .template(BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    let bar = ProgressBar::new(len as u64).with_style(style);
    bar.set_message(message);
    bar
}
