//! Status text formatting for score displays.

use crate::calculator::ScoreMatch;

/// Maximum window title length before truncation.
const MAX_TITLE_LEN: usize = 40;

/// Build the one-line status text.
///
/// `applied_default` is the default score as it would be applied this tick:
/// callers pass 0 when `apply_default_score_mode` is off so an unapplied
/// default is not advertised. Flow time takes priority over dwell time in
/// the elapsed suffix.
pub fn format_status(
    matched: Option<&ScoreMatch>,
    title: &str,
    applied_default: i64,
    dwell_secs: i64,
    flow_secs: i64,
) -> String {
    let elapsed = if flow_secs > 0 {
        format!(" [flow: {flow_secs}s]")
    } else if dwell_secs > 0 {
        format!(" [{dwell_secs}s]")
    } else {
        String::new()
    };

    if let Some(matched) = matched {
        return format!(
            "{} ({}){elapsed}",
            matched.description,
            signed(matched.score)
        );
    }

    // No match: always show the window title to help users write rules.
    let display_title = truncate_title(title);
    if applied_default != 0 {
        let score = signed(applied_default);
        if display_title.is_empty() {
            format!("No match ({score}){elapsed}")
        } else {
            format!("No match: {display_title} ({score}){elapsed}")
        }
    } else if display_title.is_empty() {
        format!("Watching...{elapsed}")
    } else {
        format!("{display_title}{elapsed}")
    }
}

fn signed(score: i64) -> String {
    if score >= 0 {
        format!("+{score}")
    } else {
        score.to_string()
    }
}

fn truncate_title(title: &str) -> String {
    if title.chars().count() > MAX_TITLE_LEN {
        let truncated: String = title.chars().take(MAX_TITLE_LEN).collect();
        format!("{truncated}...")
    } else {
        title.to_string()
    }
}
