//! Progress tracking for export runs
//!
//! Shows a progress bar against the `DBSIZE` estimate when one is known,
//! otherwise a spinner counting exported keys.

use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress tracker for export runs
pub struct ProgressTracker {
    /// Start time of the run
    start_time: Instant,
    /// Progress bar (optional, can be disabled)
    bar: Option<ProgressBar>,
}

impl ProgressTracker {
    /// Create a new progress tracker
    ///
    /// # Arguments
    /// * `enable_bar` - Whether to display a progress bar
    pub fn new(enable_bar: bool) -> Self {
        let bar = enable_bar.then(|| {
            let bar = ProgressBar::new_spinner();
            if let Ok(style) =
                ProgressStyle::default_spinner().template("{spinner:.green} {pos} keys {msg}")
            {
                bar.set_style(style);
            }
            bar
        });

        Self {
            start_time: Instant::now(),
            bar,
        }
    }

    /// A tracker that displays nothing
    pub fn hidden() -> Self {
        Self::new(false)
    }

    /// Whether anything is displayed
    pub fn is_enabled(&self) -> bool {
        self.bar.is_some()
    }

    /// Switch to a bounded bar once the key count is known
    ///
    /// The count is an estimate: keys may appear or vanish during the run.
    pub fn set_total(&self, total: u64) {
        if let Some(ref bar) = self.bar {
            bar.set_length(total);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} keys {msg}")
            {
                bar.set_style(style.progress_chars("#>-"));
            }
        }
    }

    /// Update progress with the number of keys processed so far
    pub fn update(&self, count: u64) {
        if let Some(ref bar) = self.bar {
            bar.set_position(count);

            let elapsed = self.start_time.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                let speed = count as f64 / elapsed;
                bar.set_message(format!("({:.0} keys/sec)", speed));
            }
        }
    }

    /// Milliseconds since the tracker was created
    pub fn elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    /// Finish and clear the progress bar
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_tracker() {
        let tracker = ProgressTracker::hidden();
        assert!(!tracker.is_enabled());
        tracker.set_total(1000);
        tracker.update(500);
        tracker.finish();
    }

    #[test]
    fn test_visible_tracker() {
        let tracker = ProgressTracker::new(true);
        tracker.set_total(10);
        tracker.update(10);
        tracker.finish();
        assert!(tracker.elapsed_ms() < 60_000);
    }
}
