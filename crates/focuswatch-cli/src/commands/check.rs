//! One-shot evaluation of a window title against the configured rules.

use std::error::Error;
use std::path::Path;

use chrono::Local;
use focuswatch_core::{ConfigWatcher, ScoreCalculator};

pub fn run(title: &str, config_path: &Path) -> Result<(), Box<dyn Error>> {
    let config = ConfigWatcher::new(config_path).load()?;
    let calculator = ScoreCalculator::from_config(&config);
    let now = Local::now().naive_local();

    let is_self_window =
        !config.self_window_title.is_empty() && title == config.self_window_title;
    let (delta, matched) = calculator.calculate(title, false, is_self_window, now);

    let report = serde_json::json!({
        "title": title,
        "delta": delta,
        "matched": matched,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
