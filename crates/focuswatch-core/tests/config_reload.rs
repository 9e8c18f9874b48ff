//! Configuration loading and hot-reload tests.

use std::fs;
use std::io::Write;
use std::time::{Duration, SystemTime};

use focuswatch_core::{ConfigError, ConfigWatcher};

fn write_config(path: &std::path::Path, body: &str) {
    let mut file = fs::File::create(path).unwrap();
    file.write_all(body.as_bytes()).unwrap();
    file.sync_all().unwrap();
}

/// Push the file's mtime forward so coarse-grained filesystems still
/// register a change between writes.
fn bump_mtime(path: &std::path::Path) {
    let file = fs::File::options().append(true).open(path).unwrap();
    file.set_modified(SystemTime::now() + Duration::from_secs(2))
        .unwrap();
}

#[test]
fn load_reads_and_validates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    write_config(
        &path,
        r#"
default_score = -2

[[window_patterns]]
regex = "github"
score = 10
description = "GitHub"
"#,
    );

    let mut watcher = ConfigWatcher::new(&path);
    let config = watcher.load().unwrap();
    assert_eq!(config.default_score, -2);
    assert_eq!(config.window_patterns.len(), 1);
}

#[test]
fn missing_file_is_a_not_found_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut watcher = ConfigWatcher::new(dir.path().join("nope.toml"));
    assert!(matches!(
        watcher.load().unwrap_err(),
        ConfigError::NotFound { .. }
    ));
}

#[test]
fn unmodified_file_is_not_reloaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    write_config(&path, "default_score = -2\n");

    let mut watcher = ConfigWatcher::new(&path);
    watcher.load().unwrap();
    assert!(!watcher.is_modified());
    assert!(watcher.reload_if_modified().unwrap().is_none());
}

#[test]
fn modified_file_is_reloaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    write_config(&path, "default_score = -2\n");

    let mut watcher = ConfigWatcher::new(&path);
    let config = watcher.load().unwrap();
    assert_eq!(config.default_score, -2);

    write_config(&path, "default_score = -7\n");
    bump_mtime(&path);
    assert!(watcher.is_modified());

    let reloaded = watcher.reload_if_modified().unwrap().unwrap();
    assert_eq!(reloaded.default_score, -7);

    // A successful reload re-arms the watcher.
    assert!(watcher.reload_if_modified().unwrap().is_none());
}

#[test]
fn invalid_replacement_surfaces_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    write_config(&path, "default_score = -2\n");

    let mut watcher = ConfigWatcher::new(&path);
    let original = watcher.load().unwrap();

    write_config(&path, "default_transparency = 4.0\n");
    bump_mtime(&path);

    // The caller keeps using `original`; the engine never sees the bad file.
    let err = watcher.reload_if_modified().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
    assert_eq!(original.default_score, -2);
}
