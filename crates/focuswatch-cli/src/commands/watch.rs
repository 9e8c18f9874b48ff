//! The watch loop: sensors in, score and directives out.

use std::error::Error;
use std::path::Path;
use std::time::{Duration, Instant};

use chrono::Local;
use focuswatch_core::{Config, ConfigWatcher, ScoreTracker, WindowBehavior, WindowRect};
use tracing::{debug, info, warn};

use crate::render;
use crate::sensors;

/// Overlay geometry used for the proximity check; matches the renderer's
/// fixed window size.
const WINDOW_WIDTH: i32 = 400;
const WINDOW_HEIGHT: i32 = 200;

pub fn run(
    config_path: &Path,
    interval_ms: u64,
    ticks: Option<u64>,
) -> Result<(), Box<dyn Error>> {
    let mut watcher = ConfigWatcher::new(config_path);
    let mut config = watcher.load()?;
    info!(path = %watcher.path().display(), "configuration loaded");
    if config.verbose {
        print!("{}", toml::to_string_pretty(&config)?);
    }

    let now = Local::now().naive_local();
    let mut tracker = ScoreTracker::new(&config, now);
    let mut behavior = WindowBehavior::new(&config);
    let mut game = GameCheck::new();
    let mut previous_score = 0i64;
    let mut tick = 0u64;

    loop {
        match watcher.reload_if_modified() {
            Ok(Some(reloaded)) => {
                let now = Local::now().naive_local();
                tracker.apply_config(&reloaded, now);
                if let Some(alpha) = behavior.reset_transparency(&reloaded) {
                    debug!(alpha, "transparency reset after reload");
                }
                config = reloaded;
                info!(path = %watcher.path().display(), "configuration reloaded");
                if config.verbose {
                    print!("{}", toml::to_string_pretty(&config)?);
                }
            }
            Ok(None) => {}
            Err(e) => warn!("keeping previous configuration: {e}"),
        }

        // A running game stretches the tick so the watcher stays out of
        // the way of a foreground title that never changes.
        let tick_ms = if game.playing(&config) {
            config.game_playing_detection.check_interval_seconds * 1000
        } else {
            interval_ms
        };

        let title = sensors::active_window_title();
        let is_screensaver = sensors::screensaver_active();
        let now = Local::now().naive_local();
        let result = tracker.update(&title, is_screensaver, now);

        let window = WindowRect {
            x: config.window_x.unwrap_or(0),
            y: config.window_y.unwrap_or(0),
            width: WINDOW_WIDTH,
            height: WINDOW_HEIGHT,
        };
        let directives = behavior.update(
            &config,
            &tracker,
            sensors::pointer_position(),
            window,
            tick_ms,
            now,
        );
        if let Some(topmost) = directives.topmost {
            info!(topmost, "window directive");
        }
        if let Some(alpha) = directives.transparency {
            debug!(alpha, "window directive");
        }

        let score = tracker.score();
        println!(
            "{}",
            render::score_line(
                &config,
                score,
                previous_score,
                result.matched.as_ref(),
                &title,
                &tracker,
                now,
            )
        );
        previous_score = score;

        tick += 1;
        if let Some(limit) = ticks {
            if tick >= limit {
                break;
            }
        }
        std::thread::sleep(Duration::from_millis(tick_ms));
    }

    Ok(())
}

/// Re-checks the configured game process list at most once per
/// `check_interval_seconds`; process scans are too expensive for every
/// tick.
struct GameCheck {
    last_checked: Option<Instant>,
    running: bool,
}

impl GameCheck {
    fn new() -> Self {
        Self {
            last_checked: None,
            running: false,
        }
    }

    fn playing(&mut self, config: &Config) -> bool {
        let detection = &config.game_playing_detection;
        if !detection.enabled || detection.process_names.is_empty() {
            return false;
        }
        let due = match self.last_checked {
            Some(checked) => {
                checked.elapsed() >= Duration::from_secs(detection.check_interval_seconds)
            }
            None => true,
        };
        if due {
            self.running = sensors::any_process_running(&detection.process_names);
            self.last_checked = Some(Instant::now());
            if self.running {
                debug!("game process detected; stretching tick interval");
            }
        }
        self.running
    }
}
