//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT sleep. Promotion and expiry run on
//! `tokio::time::interval`; a sleep in their place drifts and cannot be
//! cancelled cleanly.
//! **Exception**: the TUI frame limiter, which sleeps for what is left of
//! `frame_duration` in `tui/src/app.rs`.

use std::path::Path;

use architectural_enforcement::{production_lines, production_sources, CodeLine};

/// Test that production code does not contain sleep() calls
#[test]
fn test_no_sleep_in_production_code() {
    let mut violations = Vec::new();

    for (path, content) in production_sources() {
        for line in production_lines(&content) {
            if is_sleep(line.code) && !is_frame_limiter(&path, line) {
                violations.push(format!(
                    "{}:{} - {}",
                    path.display(),
                    line.number,
                    line.code.trim()
                ));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "\nSleep calls found in production code (use tokio::time::interval):\n  {}\n",
        violations.join("\n  ")
    );
}

fn is_sleep(code: &str) -> bool {
    code.contains("::sleep(") || code.contains(".sleep(") || code.starts_with("sleep(")
}

fn is_frame_limiter(path: &Path, line: CodeLine<'_>) -> bool {
    path.ends_with("tui/src/app.rs") && line.code.contains("frame_duration")
}

#[test]
fn test_sleep_detection() {
    assert!(is_sleep("        tokio::time::sleep(Duration::from_millis(10)).await;"));
    assert!(is_sleep("    std::thread::sleep(d);"));
    assert!(!is_sleep("    sleep_until(deadline).await;"));
    assert!(!is_sleep("    let mut ticker = tokio::time::interval(resolution);"));
}

#[test]
fn test_frame_limiter_only_in_app() {
    let line = CodeLine {
        number: 1,
        code: "    tokio::time::sleep(frame_duration - elapsed).await;",
    };
    assert!(is_frame_limiter(Path::new("/ws/tui/src/app.rs"), line));
    assert!(!is_frame_limiter(Path::new("/ws/noti/core/src/expiry.rs"), line));
}
