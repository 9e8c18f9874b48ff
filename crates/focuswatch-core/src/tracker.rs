//! Score tracking orchestration.
//!
//! [`ScoreTracker`] owns the single authoritative cumulative score. Each
//! tick it checks the 30-minute reset slot, tracks dwell time on the
//! current window, asks the [`ScoreCalculator`] for a delta, applies it,
//! and feeds the result to the [`FlowTracker`]. The caller supplies `now`
//! on every operation -- the tracker never reads a clock.

use chrono::{NaiveDateTime, Timelike};
use tracing::debug;

use crate::calculator::{ScoreCalculator, ScoreMatch};
use crate::config::Config;
use crate::flow::FlowTracker;

/// A fixed 30-minute wall-clock window, used for the periodic score reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TimeSlot {
    hour: u32,
    /// 0 for :00-:29, 1 for :30-:59.
    half: u32,
}

fn time_slot(now: NaiveDateTime) -> TimeSlot {
    TimeSlot {
        hour: now.hour(),
        half: if now.minute() < 30 { 0 } else { 1 },
    }
}

/// Outcome of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickResult {
    /// Whether a non-zero delta was applied this tick.
    pub score_changed: bool,
    /// What matched, or `None` when no rule applied.
    pub matched: Option<ScoreMatch>,
}

/// Tracks the cumulative score from window title observations.
pub struct ScoreTracker {
    calculator: ScoreCalculator,
    flow: FlowTracker,

    default_score: i64,
    reset_every_half_hour: bool,
    self_window_title: String,

    score: i64,
    last_title: String,
    current_match: Option<ScoreMatch>,
    last_reset_slot: Option<TimeSlot>,
    /// When the current window became active; drives dwell displays.
    window_since: NaiveDateTime,
}

impl ScoreTracker {
    /// Create a tracker from a validated configuration snapshot.
    pub fn new(config: &Config, now: NaiveDateTime) -> Self {
        Self {
            calculator: ScoreCalculator::from_config(config),
            flow: FlowTracker::new(),
            default_score: config.default_score,
            reset_every_half_hour: config.reset_score_every_30_minutes,
            self_window_title: config.self_window_title.clone(),
            score: 0,
            last_title: String::new(),
            current_match: None,
            last_reset_slot: config
                .reset_score_every_30_minutes
                .then(|| time_slot(now)),
            window_since: now,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn current_match(&self) -> Option<&ScoreMatch> {
        self.current_match.as_ref()
    }

    /// Default score as configured, for status displays.
    pub fn default_score(&self) -> i64 {
        self.default_score
    }

    pub fn is_in_flow(&self) -> bool {
        self.flow.is_in_flow()
    }

    pub fn is_score_decreasing(&self) -> bool {
        self.flow.is_decreasing()
    }

    /// Seconds spent in the current flow period, 0.0 when not in flow.
    pub fn flow_duration_secs(&self, now: NaiveDateTime) -> f64 {
        self.flow.duration_secs(now)
    }

    /// Whole seconds spent in the current flow period, 0 when not in flow.
    pub fn flow_elapsed_secs(&self, now: NaiveDateTime) -> i64 {
        self.flow.elapsed_secs(now)
    }

    /// Whole seconds the current window has been active.
    pub fn window_elapsed_secs(&self, now: NaiveDateTime) -> i64 {
        (now - self.window_since).num_seconds().max(0)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Observe one tick of (title, screensaver flag).
    pub fn update(&mut self, title: &str, is_screensaver: bool, now: NaiveDateTime) -> TickResult {
        self.reset_if_slot_changed(now);

        let previous_score = self.score;

        if self.last_title != title {
            self.window_since = now;
            self.last_title = title.to_string();
        }

        let is_self_window =
            !self.self_window_title.is_empty() && title == self.self_window_title;
        let (delta, matched) =
            self.calculator
                .calculate(title, is_screensaver, is_self_window, now);
        self.current_match = matched;

        let score_changed = delta != 0;
        if score_changed {
            self.score += delta;
        }

        self.flow.update(self.score, previous_score, now);

        TickResult {
            score_changed,
            matched: self.current_match.clone(),
        }
    }

    /// Force the score back to zero, independent of the timed reset.
    pub fn reset_score(&mut self) {
        debug!(score = self.score, "manual score reset");
        self.score = 0;
    }

    /// Atomically swap in a new configuration snapshot.
    ///
    /// When the 30-minute reset is newly enabled, the reset slot is seeded
    /// with the current slot so enabling the feature does not trigger an
    /// immediate reset.
    pub fn apply_config(&mut self, config: &Config, now: NaiveDateTime) {
        self.calculator.apply_config(config);
        self.default_score = config.default_score;
        self.reset_every_half_hour = config.reset_score_every_30_minutes;
        self.self_window_title = config.self_window_title.clone();
        if self.reset_every_half_hour && self.last_reset_slot.is_none() {
            self.last_reset_slot = Some(time_slot(now));
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn reset_if_slot_changed(&mut self, now: NaiveDateTime) {
        if !self.reset_every_half_hour {
            return;
        }
        let current = time_slot(now);
        if self.last_reset_slot != Some(current) {
            debug!(score = self.score, hour = current.hour, half = current.half, "30-minute slot reset");
            self.score = 0;
            self.last_reset_slot = Some(current);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::MatchSource;
    use crate::config::WindowRule;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32, secs: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(hour, minute, secs)
            .unwrap()
    }

    fn rule(regex: &str, score: i64, description: &str) -> WindowRule {
        WindowRule {
            regex: regex.into(),
            score,
            description: description.into(),
        }
    }

    fn test_config() -> Config {
        Config {
            window_patterns: vec![
                rule("github", 10, "GitHub"),
                rule("twitter|x\\.com", -5, "Twitter/X"),
                rule("vscode", 8, "VS Code"),
            ],
            apply_default_score_mode: false,
            reset_score_every_30_minutes: false,
            ..Config::default()
        }
    }

    fn tracker() -> ScoreTracker {
        ScoreTracker::new(&test_config(), at(12, 0, 0))
    }

    #[test]
    fn initial_score_is_zero() {
        assert_eq!(tracker().score(), 0);
    }

    #[test]
    fn matching_rule_changes_score() {
        let mut tracker = tracker();
        let result = tracker.update("GitHub - Pull Requests", false, at(12, 0, 1));
        assert!(result.score_changed);
        assert!(result.matched.is_some());
        assert_eq!(tracker.score(), 10);
    }

    #[test]
    fn negative_rule_decreases_score() {
        let mut tracker = tracker();
        tracker.update("Twitter - Home", false, at(12, 0, 1));
        assert_eq!(tracker.score(), -5);
    }

    #[test]
    fn score_accumulates_across_windows() {
        let mut tracker = tracker();
        tracker.update("GitHub - Issues", false, at(12, 0, 1));
        assert_eq!(tracker.score(), 10);
        tracker.update("VSCode Editor", false, at(12, 0, 2));
        assert_eq!(tracker.score(), 18);
        tracker.update("Twitter Feed", false, at(12, 0, 3));
        assert_eq!(tracker.score(), 13);
    }

    #[test]
    fn same_window_keeps_accumulating() {
        let mut tracker = tracker();
        for i in 1..=5 {
            let result = tracker.update("GitHub - Repository", false, at(12, 0, i));
            assert!(result.score_changed);
            assert_eq!(tracker.score(), 10 * i as i64);
        }
    }

    #[test]
    fn no_match_without_default_leaves_score_alone() {
        let mut tracker = tracker();
        let result = tracker.update("Random Window Title", false, at(12, 0, 1));
        assert!(!result.score_changed);
        assert!(result.matched.is_none());
        assert_eq!(tracker.score(), 0);
    }

    #[test]
    fn no_match_with_default_applies_it() {
        let mut config = test_config();
        config.apply_default_score_mode = true;
        let mut tracker = ScoreTracker::new(&config, at(12, 0, 0));
        let result = tracker.update("Random Window Title", false, at(12, 0, 1));
        assert!(result.score_changed);
        assert!(result.matched.is_none());
        assert_eq!(tracker.score(), -1);
    }

    #[test]
    fn self_window_title_is_detected() {
        let mut config = test_config();
        config.self_window_score = 3;
        let mut tracker = ScoreTracker::new(&config, at(12, 0, 0));
        let result = tracker.update("FocusWatch", false, at(12, 0, 1));
        assert_eq!(
            result.matched.unwrap().source,
            MatchSource::SelfWindow
        );
        assert_eq!(tracker.score(), 3);
    }

    #[test]
    fn reset_score_goes_back_to_zero() {
        let mut tracker = tracker();
        tracker.update("GitHub", false, at(12, 0, 1));
        assert_eq!(tracker.score(), 10);
        tracker.reset_score();
        assert_eq!(tracker.score(), 0);
    }

    #[test]
    fn current_match_is_kept_between_queries() {
        let mut tracker = tracker();
        tracker.update("GitHub - Issues", false, at(12, 0, 1));
        assert_eq!(tracker.current_match().unwrap().description, "GitHub");
    }

    #[test]
    fn dwell_clock_resets_on_window_change() {
        let mut tracker = tracker();
        tracker.update("GitHub", false, at(12, 0, 10));
        tracker.update("GitHub", false, at(12, 0, 20));
        assert_eq!(tracker.window_elapsed_secs(at(12, 0, 25)), 15);

        tracker.update("Twitter", false, at(12, 0, 30));
        assert_eq!(tracker.window_elapsed_secs(at(12, 0, 32)), 2);
    }

    #[test]
    fn slot_reset_zeroes_score_before_applying_delta() {
        let mut config = test_config();
        config.reset_score_every_30_minutes = true;
        let mut tracker = ScoreTracker::new(&config, at(10, 10, 0));
        tracker.update("GitHub", false, at(10, 15, 0));
        tracker.update("GitHub", false, at(10, 20, 0));
        assert_eq!(tracker.score(), 20);

        // Crossing into the (10, 1) slot resets, then applies this tick.
        tracker.update("GitHub", false, at(10, 30, 0));
        assert_eq!(tracker.score(), 10);
    }

    #[test]
    fn slot_reset_disabled_carries_score_across_slots() {
        let mut tracker = tracker();
        tracker.update("GitHub", false, at(10, 29, 59));
        tracker.update("GitHub", false, at(10, 30, 0));
        assert_eq!(tracker.score(), 20);
    }

    #[test]
    fn enabling_slot_reset_via_config_does_not_reset_immediately() {
        let mut tracker = tracker();
        tracker.update("GitHub", false, at(10, 40, 0));
        assert_eq!(tracker.score(), 10);

        let mut config = test_config();
        config.reset_score_every_30_minutes = true;
        tracker.apply_config(&config, at(10, 41, 0));

        // Same slot: no reset on the next tick.
        tracker.update("GitHub", false, at(10, 42, 0));
        assert_eq!(tracker.score(), 20);

        // Next slot: the reset fires.
        tracker.update("GitHub", false, at(11, 0, 0));
        assert_eq!(tracker.score(), 10);
    }

    #[test]
    fn flow_state_follows_score_changes() {
        let mut tracker = tracker();
        tracker.update("GitHub", false, at(12, 0, 1));
        assert!(tracker.is_in_flow());
        assert!(!tracker.is_score_decreasing());

        tracker.update("Twitter", false, at(12, 0, 2));
        assert!(!tracker.is_in_flow());
        assert!(tracker.is_score_decreasing());

        // Flat tick (no match, no default) clears decreasing.
        tracker.update("Random", false, at(12, 0, 3));
        assert!(!tracker.is_in_flow());
        assert!(!tracker.is_score_decreasing());
    }

    #[test]
    fn flow_survives_screensaver_ticks() {
        let mut tracker = tracker();
        tracker.update("GitHub", false, at(12, 0, 1));
        assert!(tracker.is_in_flow());
        tracker.update("GitHub", true, at(12, 0, 2));
        assert!(tracker.is_in_flow());
        assert_eq!(tracker.flow_elapsed_secs(at(12, 0, 4)), 3);
    }

    #[test]
    fn slot_reset_feeds_post_reset_score_to_flow() {
        let mut config = test_config();
        config.reset_score_every_30_minutes = true;
        let mut tracker = ScoreTracker::new(&config, at(10, 10, 0));
        tracker.update("GitHub", false, at(10, 15, 0));
        tracker.update("GitHub", false, at(10, 16, 0));
        assert!(tracker.is_in_flow());

        // The previous score is captured after the reset: 0 -> 10 is an
        // increase, so the reset tick does not read as a drop.
        tracker.update("GitHub", false, at(10, 30, 0));
        assert_eq!(tracker.score(), 10);
        assert!(tracker.is_in_flow());
        assert!(!tracker.is_score_decreasing());
    }
}
