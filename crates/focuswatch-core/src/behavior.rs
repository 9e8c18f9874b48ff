//! Window presentation behavior.
//!
//! [`WindowBehavior`] turns tracker state plus pointer/window geometry into
//! presentation directives for the renderer: one topmost boolean and one
//! transparency value per tick. Directives are emitted only when the
//! resolved value differs from the last emitted one, so an idle overlay
//! costs the renderer nothing and never flickers.
//!
//! Topmost priority chain, highest first (one branch per tick):
//! 1. Forced topmost while the score is decreasing (when enabled)
//! 2. Proximity hiding: pointer inside the expanded bounding box sends the
//!    window to the back (when `always_on_top` + `hide_on_mouse_proximity`)
//! 3. The static `always_on_top` flag
//!
//! Transparency runs an independent fade state machine: after
//! `flow_mode_delay_seconds` of sustained flow the window fades toward
//! fully transparent at `flow_mode_fade_rate_percent_per_second`, and
//! snaps back to the default the instant flow ends.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::tracker::ScoreTracker;

/// Pointer position in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: i32,
    pub y: i32,
}

/// Window bounding box in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl WindowRect {
    /// Whether `pointer` lies within this box expanded by `margin` pixels
    /// on all four sides. Boundaries are inclusive.
    pub fn expanded_contains(&self, pointer: PointerPosition, margin: i32) -> bool {
        pointer.x >= self.x - margin
            && pointer.x <= self.x + self.width + margin
            && pointer.y >= self.y - margin
            && pointer.y <= self.y + self.height + margin
    }
}

/// Presentation changes resolved for one tick. `None` fields mean "nothing
/// to apply" -- the renderer's current state already matches.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Directives {
    pub topmost: Option<bool>,
    pub transparency: Option<f64>,
}

impl Directives {
    pub fn is_empty(&self) -> bool {
        self.topmost.is_none() && self.transparency.is_none()
    }
}

/// Resolves topmost and transparency directives from engine state.
pub struct WindowBehavior {
    /// Last emitted topmost value; `None` until the first emission.
    last_topmost: Option<bool>,
    /// Last observed proximity membership.
    pointer_near: bool,
    transparency: f64,
    fade_active: bool,
}

impl WindowBehavior {
    pub fn new(config: &Config) -> Self {
        Self {
            last_topmost: None,
            pointer_near: false,
            transparency: config.default_transparency,
            fade_active: false,
        }
    }

    /// Current transparency as last resolved (what the renderer shows).
    pub fn transparency(&self) -> f64 {
        self.transparency
    }

    /// Whether the pointer was inside the proximity box last tick.
    pub fn pointer_in_proximity(&self) -> bool {
        self.pointer_near
    }

    /// Resolve directives for one tick.
    ///
    /// `pointer` is `None` when the pointer could not be sampled; the
    /// proximity branch then falls back to the static baseline.
    /// `tick_interval_ms` is the actual interval since the previous tick
    /// and may vary between calls.
    pub fn update(
        &mut self,
        config: &Config,
        tracker: &ScoreTracker,
        pointer: Option<PointerPosition>,
        window: WindowRect,
        tick_interval_ms: u64,
        now: NaiveDateTime,
    ) -> Directives {
        Directives {
            topmost: self.resolve_topmost(config, tracker, pointer, window),
            transparency: self.resolve_transparency(config, tracker, tick_interval_ms, now),
        }
    }

    /// Reset transparency to the configured default, e.g. after a config
    /// reload. Returns the value to apply when it changed.
    pub fn reset_transparency(&mut self, config: &Config) -> Option<f64> {
        self.fade_active = false;
        if self.transparency != config.default_transparency {
            self.transparency = config.default_transparency;
            Some(self.transparency)
        } else {
            None
        }
    }

    // ── Topmost ──────────────────────────────────────────────────────

    fn resolve_topmost(
        &mut self,
        config: &Config,
        tracker: &ScoreTracker,
        pointer: Option<PointerPosition>,
        window: WindowRect,
    ) -> Option<bool> {
        let resolved = if config.always_on_top_while_score_decreasing
            && tracker.is_score_decreasing()
        {
            // Total priority: the overlay demands attention while the
            // score is bleeding.
            true
        } else if config.always_on_top && config.hide_on_mouse_proximity {
            match pointer {
                Some(pointer) => {
                    let near = window.expanded_contains(pointer, config.proximity_distance);
                    self.pointer_near = near;
                    // Mouse near: send to back. Mouse away: bring to front.
                    !near
                }
                None => config.always_on_top,
            }
        } else {
            config.always_on_top
        };

        self.emit_topmost(resolved)
    }

    fn emit_topmost(&mut self, resolved: bool) -> Option<bool> {
        if self.last_topmost == Some(resolved) {
            return None;
        }
        debug!(topmost = resolved, "topmost directive");
        self.last_topmost = Some(resolved);
        Some(resolved)
    }

    // ── Transparency ─────────────────────────────────────────────────

    fn resolve_transparency(
        &mut self,
        config: &Config,
        tracker: &ScoreTracker,
        tick_interval_ms: u64,
        now: NaiveDateTime,
    ) -> Option<f64> {
        let default_transparency = config.default_transparency;

        if !config.fade_window_on_flow_mode_enabled {
            self.fade_active = false;
            if self.transparency != default_transparency {
                self.transparency = default_transparency;
                return Some(default_transparency);
            }
            return None;
        }

        let in_fade_window = tracker.is_in_flow()
            && tracker.flow_duration_secs(now) >= f64::from(config.flow_mode_delay_seconds);

        if in_fade_window {
            self.fade_active = true;
            let fade_per_tick = f64::from(config.flow_mode_fade_rate_percent_per_second)
                / 100.0
                * (tick_interval_ms as f64 / 1000.0);
            let faded = (self.transparency - fade_per_tick).max(0.0);
            if faded != self.transparency {
                debug!(transparency = faded, "flow fade step");
                self.transparency = faded;
                return Some(faded);
            }
            None
        } else {
            // Not in flow, or the delay has not elapsed: rest at the
            // default. Skip the emit when already at rest.
            if self.transparency != default_transparency || self.fade_active {
                self.transparency = default_transparency;
                self.fade_active = false;
                debug!(transparency = default_transparency, "fade reset");
                return Some(default_transparency);
            }
            None
        }
    }
}
