//! Integration Test: Headless Core
//!
//! **Policy**: `noti-core` MUST NOT depend on any UI framework. Drawing lives
//! behind the `RenderSurface` trait, implemented outside the core.

use std::fs;

use architectural_enforcement::{production_lines, rust_sources, workspace_root};

const UI_CRATES: &[&str] = &["ratatui", "crossterm", "termion", "cursive", "egui"];

#[test]
fn test_core_manifest_has_no_ui_crates() {
    let manifest = fs::read_to_string(workspace_root().join("noti/core/Cargo.toml"))
        .expect("noti/core/Cargo.toml should exist");

    let deps = toml_lines::dependency_names(&manifest);
    for krate in UI_CRATES {
        assert!(
            !deps.iter().any(|d| d == krate),
            "noti-core must not depend on {krate}"
        );
    }
}

#[test]
fn test_core_sources_do_not_use_ui_crates() {
    let mut violations = Vec::new();

    for path in rust_sources("noti/core/src") {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };

        for line in production_lines(&content) {
            for krate in UI_CRATES {
                if line.code.contains(&format!("{krate}::")) {
                    violations.push(format!(
                        "{}:{} - {}",
                        path.display(),
                        line.number,
                        line.code.trim()
                    ));
                }
            }
        }
    }

    assert!(
        violations.is_empty(),
        "UI crate used in noti-core:\n{}",
        violations.join("\n")
    );
}

/// Just enough manifest reading to list dependency names
mod toml_lines {
    pub fn dependency_names(manifest: &str) -> Vec<String> {
        let mut in_deps = false;
        let mut names = Vec::new();

        for line in manifest.lines().map(str::trim) {
            if line.starts_with('[') {
                in_deps = line.contains("dependencies");
                continue;
            }
            if !in_deps || line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((name, _)) = line.split_once('=') {
                names.push(name.trim().to_string());
            }
        }

        names
    }

    #[test]
    fn test_dependency_names() {
        let manifest = "[package]\nname = \"x\"\n\n[dependencies]\n# runtime\ntokio = \"1\"\n\n[dev-dependencies]\ntempfile = \"3\"\n";
        assert_eq!(dependency_names(manifest), vec!["tokio", "tempfile"]);
    }
}
