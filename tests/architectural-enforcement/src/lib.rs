//! Architectural Enforcement Integration Tests
//!
//! Source scans that keep the workspace honest:
//! - Timing comes from `tokio::time::interval`, not `sleep`
//! - Async code never blocks on I/O
//! - The toast core stays free of UI dependencies
//!
//! Scans only look at production code: anything under a `#[cfg(test)]`
//! attribute is skipped, and `//` comments are cut off.

use std::fs;
use std::path::{Path, PathBuf};

/// Production source directories checked by the enforcement tests
pub const PRODUCTION_DIRS: &[&str] = &["noti/core/src", "tui/src"];

/// Workspace root, resolved from this package's manifest directory
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Every `.rs` file under `dir` (relative to the workspace root)
#[must_use]
pub fn rust_sources(dir: &str) -> Vec<PathBuf> {
    let path = workspace_root().join(dir);
    if !path.exists() {
        return Vec::new();
    }

    walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// One line of production code
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodeLine<'a> {
    /// 1-based line number in the file
    pub number: usize,
    /// The line with any `//` comment removed
    pub code: &'a str,
}

/// Lines of `content` outside `#[cfg(test)]` items, comments stripped
///
/// The item after a `#[cfg(test)]` attribute is skipped up to its closing
/// brace, or up to its `;` when it has no body.
#[must_use]
pub fn production_lines(content: &str) -> Vec<CodeLine<'_>> {
    let mut lines = Vec::new();
    let mut skipping = false;
    let mut depth = 0i32;
    let mut opened = false;

    for (idx, line) in content.lines().enumerate() {
        let code = line.split("//").next().unwrap_or(line);

        if !skipping && code.trim_start().starts_with("#[cfg(test)]") {
            skipping = true;
            depth = 0;
            opened = false;
            continue;
        }

        if skipping {
            for c in code.chars() {
                match c {
                    '{' => {
                        depth += 1;
                        opened = true;
                    }
                    '}' => depth -= 1,
                    _ => {}
                }
            }
            let ended = if opened {
                depth <= 0
            } else {
                code.trim_end().ends_with(';')
            };
            if ended {
                skipping = false;
            }
            continue;
        }

        lines.push(CodeLine {
            number: idx + 1,
            code,
        });
    }

    lines
}

/// Contents of every production source file, paired with its path
#[must_use]
pub fn production_sources() -> Vec<(PathBuf, String)> {
    PRODUCTION_DIRS
        .iter()
        .flat_map(|dir| rust_sources(dir))
        .filter_map(|path| fs::read_to_string(&path).ok().map(|content| (path, content)))
        .collect()
}

/// Whether the nearest `fn` above `lines[idx]` is `async`
///
/// `None` when there is no enclosing function (module level).
#[must_use]
pub fn enclosing_fn_is_async(lines: &[CodeLine<'_>], idx: usize) -> Option<bool> {
    lines[..=idx].iter().rev().find_map(|line| {
        let code = line.code.trim_start();
        let is_fn = code.starts_with("fn ") || code.contains(" fn ");
        is_fn.then(|| code.contains("async fn "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_skip_test_items() {
        let source = "\
fn real() {}
#[cfg(test)]
pub(crate) fn helper() {
    inner();
}
fn also_real() {} // trailing note
#[cfg(test)]
use something::Else;
#[cfg(test)]
mod tests {
    fn t() { sleep(x); }
}
fn last() {}
";
        let lines = production_lines(source);
        let code: Vec<&str> = lines.iter().map(|l| l.code.trim()).collect();
        assert_eq!(code, vec!["fn real() {}", "fn also_real() {}", "fn last() {}"]);
        assert_eq!(lines[1].number, 6);
    }

    #[test]
    fn test_enclosing_fn_detection() {
        let source = "\
pub async fn load(path: &Path) {
    read(path);
}
fn load_sync(path: &Path) {
    read(path);
}
";
        let lines = production_lines(source);
        assert_eq!(enclosing_fn_is_async(&lines, 1), Some(true));
        assert_eq!(enclosing_fn_is_async(&lines, 4), Some(false));
    }
}
