//! # FocusWatch Core Library
//!
//! This library provides the scoring and adaptive-behavior engine for
//! FocusWatch: it turns a stream of (window title, timestamp) observations
//! into a cumulative score, flow/decreasing state, and resolved
//! presentation directives for a small overlay display. It follows a
//! CLI-first philosophy: all logic lives here, and frontends (the bundled
//! CLI, or a GUI shell) are thin glue over the same library.
//!
//! ## Architecture
//!
//! The engine is single-threaded and tick-driven: the caller invokes it
//! once per tick with every environmental fact (title, screensaver flag,
//! pointer/window geometry, current time, tick interval) supplied as
//! parameters. The core never reads a clock, filesystem, or OS API during
//! a tick, which makes every operation deterministic and testable.
//!
//! ## Key Components
//!
//! - [`ScoreCalculator`]: pure per-tick delta computation from window
//!   rules, with the mild-penalty time window
//! - [`FlowTracker`]: flow / score-decreasing state machine
//! - [`ScoreTracker`]: orchestrator owning the cumulative score, the
//!   30-minute reset, and per-window dwell time
//! - [`WindowBehavior`]: topmost priority chain and flow-fade transparency,
//!   emitting directives only on change
//! - [`Config`] / [`ConfigWatcher`]: validated TOML snapshot and
//!   mtime-based hot reload

pub mod behavior;
pub mod calculator;
pub mod config;
pub mod error;
pub mod flow;
pub mod status;
pub mod tracker;

pub use behavior::{Directives, PointerPosition, WindowBehavior, WindowRect};
pub use calculator::{MatchSource, ScoreCalculator, ScoreMatch};
pub use config::{Config, ConfigWatcher, GameDetection, WindowRule};
pub use error::{ConfigError, CoreError};
pub use flow::FlowTracker;
pub use tracker::{ScoreTracker, TickResult};
