use std::time::{Duration, Instant};

/// Percentage points between two progress reports.
pub const PROGRESS_STEP_PERCENT: f64 = 4.0;

/// One emitted progress report.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressReport {
    /// Share of waypoints done, `0..=100`.
    pub percent: f64,
    /// Time since the track started.
    pub elapsed: Duration,
    /// Linear estimate of the time left; unknown before the first waypoint is done.
    pub remaining: Option<Duration>,
}

/// Throttled progress logging for one track.
#[derive(Debug)]
pub struct Progress {
    label: String,
    total: usize,
    started: Instant,
    last_reported: Option<f64>,
}

impl Progress {
    /// Start tracking `total` waypoints of the track called `label`.
    pub fn new(label: impl Into<String>, total: usize) -> Self {
        Self {
            label: label.into(),
            total,
            started: Instant::now(),
            last_reported: None,
        }
    }

    /// Record `done` finished waypoints and log when a report is due.
    pub fn update(&mut self, done: usize) -> Option<ProgressReport> {
        let report = self.update_at(done, self.started.elapsed())?;
        tracing::info!(
            track = %self.label,
            percent = %format!("{:.0}%", report.percent),
            elapsed = ?report.elapsed,
            remaining = ?report.remaining,
            "progress"
        );
        Some(report)
    }

    /// Like [`Self::update`] with an explicit elapsed time and no logging.
    pub fn update_at(&mut self, done: usize, elapsed: Duration) -> Option<ProgressReport> {
        if self.total == 0 {
            return None;
        }
        let percent = 100.0 * done.min(self.total) as f64 / self.total as f64;
        let due = match self.last_reported {
            None => true,
            Some(last) => percent > last + PROGRESS_STEP_PERCENT,
        };
        if !due {
            return None;
        }
        self.last_reported = Some(percent);

        let remaining = (done > 0).then(|| {
            let per_item = elapsed.as_secs_f64() / done as f64;
            Duration::from_secs_f64(per_item * self.total.saturating_sub(done) as f64)
        });
        Some(ProgressReport {
            percent,
            elapsed,
            remaining,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sim/progress.rs"]
mod tests;
