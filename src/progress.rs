// Progress bars for the two conversion passes, using indicatif.
// All bars live under one MultiProgress so they render on separate lines.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Arc;

#[derive(Clone)]
pub struct ProgressManager {
    multi: Option<Arc<MultiProgress>>,
}

impl ProgressManager {
    // Create a new manager. If enabled=false, no bars are created.
    pub fn new(enabled: bool) -> Self {
        let multi = if enabled {
            Some(Arc::new(MultiProgress::new()))
        } else {
            None
        };
        Self { multi }
    }

    // Create a bar counting dump lines for one pass.
    pub fn new_pass_bar(&self, total_lines: u64, label: &str) -> Option<ProgressBar> {
        let mp = self.multi.as_ref()?;
        let bar = mp.add(ProgressBar::new(total_lines));
        bar.set_style(pass_style());
        bar.set_prefix(label.to_string());
        Some(bar)
    }
}

fn pass_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:20} {pos:>9}/{len:<9} [{bar:50}] {percent:>3}%")
        .expect("valid progress template")
        .progress_chars("█ ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_manager_creates_no_bars() {
        let progress = ProgressManager::new(false);
        assert!(progress.new_pass_bar(10, "Schema").is_none());
    }
}
