//! Terminal rendering for the watch loop.

use chrono::NaiveDateTime;
use focuswatch_core::{status, Config, ScoreMatch, ScoreTracker};

const ANSI_RESET: &str = "\x1b[0m";

/// One status line: the score colored by its last movement, then the
/// match context.
pub fn score_line(
    config: &Config,
    score: i64,
    previous_score: i64,
    matched: Option<&ScoreMatch>,
    title: &str,
    tracker: &ScoreTracker,
    now: NaiveDateTime,
) -> String {
    let color = if score < previous_score {
        &config.score_down_color
    } else {
        &config.score_up_color
    };
    let applied_default = if config.apply_default_score_mode {
        config.default_score
    } else {
        0
    };
    let status = status::format_status(
        matched,
        title,
        applied_default,
        tracker.window_elapsed_secs(now),
        tracker.flow_elapsed_secs(now),
    );
    match ansi_foreground(color) {
        Some(prefix) => format!("{prefix}Score: {score}{ANSI_RESET}  {status}"),
        None => format!("Score: {score}  {status}"),
    }
}

/// 24-bit ANSI foreground escape from a validated `#rrggbb` color.
fn ansi_foreground(hex: &str) -> Option<String> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(format!("\x1b[38;2;{r};{g};{b}m"))
}
