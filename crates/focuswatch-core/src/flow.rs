//! Flow state tracking.
//!
//! A flow period starts when the score increases, persists through flat
//! ticks, and ends on any decrease. The `decreasing` flag means "the last
//! observed change was a drop": it is set on a decrease and cleared by the
//! very next non-decreasing tick, whether or not flow resumes.

use chrono::NaiveDateTime;
use tracing::debug;

/// Tracks flow state and score-decrease detection across ticks.
///
/// Invariant: `started_at` is `Some` exactly while `in_flow` is true.
#[derive(Debug, Clone, Default)]
pub struct FlowTracker {
    in_flow: bool,
    started_at: Option<NaiveDateTime>,
    decreasing: bool,
}

impl FlowTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe one (current, previous) score pair.
    pub fn update(&mut self, current_score: i64, previous_score: i64, now: NaiveDateTime) {
        if current_score > previous_score {
            if !self.in_flow {
                debug!(score = current_score, "entering flow state");
                self.in_flow = true;
                self.started_at = Some(now);
            }
            self.decreasing = false;
        } else if current_score < previous_score {
            if self.in_flow {
                debug!(score = current_score, "leaving flow state");
            }
            self.in_flow = false;
            self.started_at = None;
            self.decreasing = true;
        } else {
            // Flat tick: hold the flow state as-is, but the score is no
            // longer decreasing.
            self.decreasing = false;
        }
    }

    pub fn is_in_flow(&self) -> bool {
        self.in_flow
    }

    pub fn is_decreasing(&self) -> bool {
        self.decreasing
    }

    /// Seconds spent in the current flow period, 0.0 when not in flow.
    pub fn duration_secs(&self, now: NaiveDateTime) -> f64 {
        match self.started_at {
            Some(started_at) if self.in_flow => {
                (now - started_at).num_milliseconds() as f64 / 1000.0
            }
            _ => 0.0,
        }
    }

    /// Whole seconds spent in the current flow period, 0 when not in flow.
    pub fn elapsed_secs(&self, now: NaiveDateTime) -> i64 {
        self.duration_secs(now) as i64
    }
}
