//! Score delta calculation from window titles.
//!
//! [`ScoreCalculator`] is a pure function of (title, screensaver flag,
//! self-window flag, now): it owns no mutable state beyond its configured
//! parameters and never reads a clock. Evaluation order, first applicable
//! wins:
//!
//! 1. Screensaver active: delta 0, synthetic match (suppresses the default
//!    score while idle)
//! 2. Self window focused: `self_window_score`, synthetic match
//! 3. First rule whose regex matches the title (case-insensitive,
//!    unanchored search)
//! 4. Default score, when `apply_default_score_mode` and the score is
//!    non-zero; otherwise delta 0
//!
//! Mild penalty: between the configured hours (inclusive, wrapping past
//! midnight when start > end), any negative delta is clamped to exactly -1.
//! Positive and zero deltas are never altered.

use chrono::{NaiveDateTime, Timelike};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::config::Config;

const SCREENSAVER_DESCRIPTION: &str = "Screensaver";
const SELF_WINDOW_DESCRIPTION: &str = "FocusWatch (self)";

/// What produced a score match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    /// A configured window rule, by position in the rule list.
    Rule { index: usize },
    /// Synthetic match while the screensaver is active.
    Screensaver,
    /// Synthetic match while the watcher's own window is focused.
    SelfWindow,
}

/// A resolved match for one tick.
///
/// `score` is the configured score of whatever matched, before any mild
/// penalty adjustment -- status displays show the configured value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreMatch {
    pub source: MatchSource,
    pub score: i64,
    pub description: String,
}

struct CompiledRule {
    /// `None` for empty patterns, which never match.
    regex: Option<Regex>,
    score: i64,
    description: String,
}

/// Calculator for score deltas based on window rules and time-based policy.
pub struct ScoreCalculator {
    rules: Vec<CompiledRule>,
    default_score: i64,
    apply_default_score: bool,
    mild_penalty: bool,
    mild_penalty_start_hour: u32,
    mild_penalty_end_hour: u32,
    self_window_score: i64,
}

impl ScoreCalculator {
    /// Build a calculator from a validated configuration snapshot.
    pub fn from_config(config: &Config) -> Self {
        let rules = config
            .window_patterns
            .iter()
            .map(|rule| CompiledRule {
                regex: compile_pattern(&rule.regex),
                score: rule.score,
                description: rule.description.clone(),
            })
            .collect();
        Self {
            rules,
            default_score: config.default_score,
            apply_default_score: config.apply_default_score_mode,
            mild_penalty: config.mild_penalty_mode,
            mild_penalty_start_hour: config.mild_penalty_start_hour,
            mild_penalty_end_hour: config.mild_penalty_end_hour,
            self_window_score: config.self_window_score,
        }
    }

    /// Atomically replace every calculator parameter.
    pub fn apply_config(&mut self, config: &Config) {
        *self = Self::from_config(config);
    }

    /// Calculate the score delta for one tick.
    ///
    /// Returns the (possibly penalty-adjusted) delta and the match that
    /// produced it, or `None` when no rule applied.
    pub fn calculate(
        &self,
        title: &str,
        is_screensaver: bool,
        is_self_window: bool,
        now: NaiveDateTime,
    ) -> (i64, Option<ScoreMatch>) {
        // While idle there is no meaningful foreground window; the
        // synthetic match keeps the default score from draining it.
        if is_screensaver {
            return (
                0,
                Some(ScoreMatch {
                    source: MatchSource::Screensaver,
                    score: 0,
                    description: SCREENSAVER_DESCRIPTION.into(),
                }),
            );
        }

        if is_self_window {
            let delta = self.apply_mild_penalty(self.self_window_score, now);
            return (
                delta,
                Some(ScoreMatch {
                    source: MatchSource::SelfWindow,
                    score: self.self_window_score,
                    description: SELF_WINDOW_DESCRIPTION.into(),
                }),
            );
        }

        for (index, rule) in self.rules.iter().enumerate() {
            let Some(regex) = &rule.regex else {
                continue;
            };
            if regex.is_match(title) {
                let delta = self.apply_mild_penalty(rule.score, now);
                return (
                    delta,
                    Some(ScoreMatch {
                        source: MatchSource::Rule { index },
                        score: rule.score,
                        description: rule.description.clone(),
                    }),
                );
            }
        }

        if self.apply_default_score && self.default_score != 0 {
            let delta = self.apply_mild_penalty(self.default_score, now);
            return (delta, None);
        }

        (0, None)
    }

    /// Whether `now` falls inside the mild penalty hours.
    fn in_mild_penalty_hours(&self, now: NaiveDateTime) -> bool {
        if !self.mild_penalty {
            return false;
        }
        let hour = now.hour();
        if self.mild_penalty_start_hour <= self.mild_penalty_end_hour {
            (self.mild_penalty_start_hour..=self.mild_penalty_end_hour).contains(&hour)
        } else {
            // Wrapped range, e.g. 23..=1 covers 23, 0, 1.
            hour >= self.mild_penalty_start_hour || hour <= self.mild_penalty_end_hour
        }
    }

    fn apply_mild_penalty(&self, delta: i64, now: NaiveDateTime) -> i64 {
        if delta < 0 && self.in_mild_penalty_hours(now) {
            -1
        } else {
            delta
        }
    }
}

fn compile_pattern(pattern: &str) -> Option<Regex> {
    if pattern.is_empty() {
        return None;
    }
    // Patterns are pre-validated at config load; a failure here means the
    // rule simply never matches.
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .ok()
}
