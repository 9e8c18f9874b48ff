//! Platform sensors: active window title, screensaver state, pointer
//! position, and game-process detection.
//!
//! Every sensor is a best-effort subprocess or procfs probe. Failures
//! degrade to neutral values (empty title, no screensaver, no pointer)
//! instead of stopping the watch loop.

use std::process::Command;

use focuswatch_core::PointerPosition;

/// Title of the active window, or an empty string when unavailable.
pub fn active_window_title() -> String {
    imp::active_window_title().unwrap_or_default()
}

/// Whether a screensaver (or display power-save) is currently active.
pub fn screensaver_active() -> bool {
    imp::screensaver_active()
}

/// Current pointer position in screen pixels, when it can be sampled.
pub fn pointer_position() -> Option<PointerPosition> {
    imp::pointer_position()
}

/// Whether any of the named processes is currently running. Names are
/// compared case-insensitively with any `.exe` suffix stripped.
pub fn any_process_running(names: &[String]) -> bool {
    let wanted: Vec<String> = names.iter().map(|n| normalize_process_name(n)).collect();
    imp::running_process_names()
        .iter()
        .any(|running| wanted.contains(&normalize_process_name(running)))
}

fn normalize_process_name(name: &str) -> String {
    let lower = name.to_lowercase();
    lower
        .strip_suffix(".exe")
        .map(str::to_string)
        .unwrap_or(lower)
}

fn command_stdout(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Extract the title from `xprop -id <id> WM_NAME` output, which looks
/// like `WM_NAME(STRING) = "Title"`.
fn parse_xprop_wm_name(output: &str) -> Option<String> {
    let (_, value) = output.split_once('=')?;
    Some(value.trim().trim_matches('"').to_string())
}

/// Extract coordinates from `xdotool getmouselocation` output, which
/// looks like `x:512 y:384 screen:0 window:123`.
fn parse_mouse_location(output: &str) -> Option<PointerPosition> {
    let mut x = None;
    let mut y = None;
    for part in output.split_whitespace() {
        if let Some(value) = part.strip_prefix("x:") {
            x = value.parse().ok();
        } else if let Some(value) = part.strip_prefix("y:") {
            y = value.parse().ok();
        }
    }
    Some(PointerPosition { x: x?, y: y? })
}

#[cfg(target_os = "linux")]
mod imp {
    use super::{command_stdout, parse_mouse_location, parse_xprop_wm_name};
    use focuswatch_core::PointerPosition;

    pub fn active_window_title() -> Option<String> {
        if let Some(title) = command_stdout("xdotool", &["getactivewindow", "getwindowname"]) {
            return Some(title);
        }
        // Fallback to xprop.
        let active = command_stdout("xprop", &["-root", "_NET_ACTIVE_WINDOW"])?;
        let window_id = active.split_whitespace().last()?.to_string();
        let name = command_stdout("xprop", &["-id", &window_id, "WM_NAME"])?;
        parse_xprop_wm_name(&name)
    }

    pub fn screensaver_active() -> bool {
        if let Some(out) = command_stdout("gnome-screensaver-command", &["-q"]) {
            if out.to_lowercase().contains("is active") {
                return true;
            }
        }
        if let Some(out) = command_stdout("xscreensaver-command", &["-time"]) {
            let out = out.to_lowercase();
            if out.contains("blanked") || out.contains("locked") {
                return true;
            }
        }
        // DPMS standby/suspend/off is display power saving, not strictly a
        // screensaver, but it equally means the user is away.
        if let Some(out) = command_stdout("xset", &["q"]) {
            let mut dpms_section = false;
            for line in out.lines() {
                if line.contains("DPMS") {
                    dpms_section = true;
                }
                if dpms_section && line.contains("Monitor is") {
                    return ["Standby", "Suspend", "Off"]
                        .iter()
                        .any(|state| line.contains(state));
                }
            }
        }
        false
    }

    pub fn pointer_position() -> Option<PointerPosition> {
        let out = command_stdout("xdotool", &["getmouselocation"])?;
        parse_mouse_location(&out)
    }

    pub fn running_process_names() -> Vec<String> {
        let entries = match std::fs::read_dir("/proc") {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };
        let mut names = Vec::new();
        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let Some(pid) = file_name.to_str() else {
                continue;
            };
            if !pid.bytes().all(|b| b.is_ascii_digit()) {
                continue;
            }
            if let Ok(comm) = std::fs::read_to_string(entry.path().join("comm")) {
                names.push(comm.trim().to_string());
            }
        }
        names
    }
}

#[cfg(target_os = "macos")]
mod imp {
    use super::command_stdout;
    use focuswatch_core::PointerPosition;

    pub fn active_window_title() -> Option<String> {
        command_stdout(
            "osascript",
            &[
                "-e",
                "tell application \"System Events\" to get name of first application process whose frontmost is true",
            ],
        )
    }

    pub fn screensaver_active() -> bool {
        command_stdout(
            "osascript",
            &["-e", "tell application \"System Events\" to get name of every process"],
        )
        .is_some_and(|out| out.contains("ScreenSaverEngine"))
    }

    pub fn pointer_position() -> Option<PointerPosition> {
        // No subprocess probe for the pointer on macOS; the proximity
        // branch falls back to the static baseline.
        None
    }

    pub fn running_process_names() -> Vec<String> {
        command_stdout("ps", &["-axco", "comm="])
            .map(|out| out.lines().map(|line| line.trim().to_string()).collect())
            .unwrap_or_default()
    }
}

#[cfg(target_os = "windows")]
mod imp {
    use super::command_stdout;
    use focuswatch_core::PointerPosition;

    pub fn active_window_title() -> Option<String> {
        let script = r#"Add-Type @"
using System;
using System.Runtime.InteropServices;
public class Window {
[DllImport("user32.dll")]
public static extern IntPtr GetForegroundWindow();
[DllImport("user32.dll")]
public static extern int GetWindowText(IntPtr hWnd, System.Text.StringBuilder text, int count);
}
"@
$h = [Window]::GetForegroundWindow()
$s = New-Object System.Text.StringBuilder 256
[Window]::GetWindowText($h, $s, 256)
$s.ToString()"#;
        command_stdout("powershell", &["-Command", script])
    }

    pub fn screensaver_active() -> bool {
        let script = r#"$signature = @'
[DllImport("user32.dll")]
public static extern bool SystemParametersInfo(uint uiAction, uint uiParam, ref uint pvParam, uint fWinIni);
'@
$type = Add-Type -MemberDefinition $signature -Name Win32Utils -Namespace ScreenSaver -PassThru
$running = 0
$type::SystemParametersInfo(0x0072, 0, [ref]$running, 0)
$running"#;
        command_stdout("powershell", &["-Command", script]).as_deref() == Some("1")
    }

    pub fn pointer_position() -> Option<PointerPosition> {
        let script = "Add-Type -AssemblyName System.Windows.Forms; \
                      $p = [System.Windows.Forms.Cursor]::Position; \
                      Write-Output \"x:$($p.X) y:$($p.Y)\"";
        let out = command_stdout("powershell", &["-Command", script])?;
        super::parse_mouse_location(&out)
    }

    pub fn running_process_names() -> Vec<String> {
        command_stdout("tasklist", &["/fo", "csv", "/nh"])
            .map(|out| {
                out.lines()
                    .filter_map(|line| line.split(',').next())
                    .map(|name| name.trim_matches('"').to_string())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
mod imp {
    use focuswatch_core::PointerPosition;

    pub fn active_window_title() -> Option<String> {
        None
    }

    pub fn screensaver_active() -> bool {
        false
    }

    pub fn pointer_position() -> Option<PointerPosition> {
        None
    }

    pub fn running_process_names() -> Vec<String> {
        Vec::new()
    }
}
