//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: Async code MUST NOT block on I/O. The coordinator and the TUI
//! event loop share one runtime, so a blocking read stalls promotion ticks
//! and progress bars alike.
//! **Allowed**: blocking calls inside plain `fn`s, which run before the
//! runtime needs them (config loading, log file setup).

use architectural_enforcement::{enclosing_fn_is_async, production_lines, production_sources};

/// Blocking APIs and what to use instead
const BLOCKING: &[(&str, &str)] = &[
    ("std::fs::", "tokio::fs"),
    ("use std::fs", "tokio::fs"),
    ("std::net::", "tokio::net"),
    ("std::process::Command", "tokio::process::Command"),
    ("std::io::stdin()", "tokio::io::stdin()"),
    ("std::thread::sleep", "tokio::time"),
];

/// Test that async production code does not use blocking I/O
#[test]
fn test_no_blocking_io_in_async_code() {
    let mut violations = Vec::new();

    for (path, content) in production_sources() {
        let lines = production_lines(&content);
        for (idx, line) in lines.iter().enumerate() {
            let Some(replacement) = blocking_call(line.code) else {
                continue;
            };
            // Module-level `use` lines count as async context
            if enclosing_fn_is_async(&lines, idx) == Some(false) {
                continue;
            }
            violations.push(format!(
                "{}:{} - {} (use {})",
                path.display(),
                line.number,
                line.code.trim(),
                replacement
            ));
        }
    }

    assert!(
        violations.is_empty(),
        "\nBlocking I/O found in async code:\n  {}\n",
        violations.join("\n  ")
    );
}

fn blocking_call(code: &str) -> Option<&'static str> {
    BLOCKING
        .iter()
        .find(|(pattern, _)| code.contains(pattern))
        .map(|(_, replacement)| *replacement)
}

#[test]
fn test_blocking_call_detection() {
    assert_eq!(
        blocking_call("    let s = std::fs::read_to_string(path)?;"),
        Some("tokio::fs")
    );
    assert_eq!(
        blocking_call("    let file = tokio::fs::File::open(path).await?;"),
        None
    );
}

#[test]
fn test_blocking_allowed_only_outside_async() {
    let source = "\
fn load_with_env(path: PathBuf) {
    let s = std::fs::read_to_string(path);
}
async fn load_feed(path: &Path) {
    let s = std::fs::read_to_string(path);
}
";
    let lines = production_lines(source);
    assert_eq!(enclosing_fn_is_async(&lines, 1), Some(false));
    assert_eq!(enclosing_fn_is_async(&lines, 4), Some(true));
}
