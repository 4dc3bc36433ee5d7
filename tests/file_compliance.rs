// Copyright 2025 Lars Brubaker
// Source layout checks: every crate file stays under the line limit and
// carries the license header.

use std::path::{Path, PathBuf};

const LINE_LIMIT: usize = 800;

const SOURCE_DIRS: &[&str] = &["src", "tests", "benches"];

const HEADER: &str = "// Copyright 2025 Lars Brubaker";

fn rust_files() -> Vec<PathBuf> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let mut files = Vec::new();
    for dir in SOURCE_DIRS {
        collect(&root.join(dir), &mut files);
    }
    files.sort();
    files
}

fn collect(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect(&path, files);
        } else if path.extension().map_or(false, |e| e == "rs") {
            files.push(path);
        }
    }
}

fn non_empty_lines(content: &str) -> usize {
    content.lines().filter(|l| !l.trim().is_empty()).count()
}

#[test]
fn sources_were_found() {
    let files = rust_files();
    assert!(files.iter().any(|f| f.ends_with("src/lib.rs")));
    assert!(files.iter().any(|f| f.ends_with("src/sweep.rs")));
}

#[test]
fn files_stay_under_line_limit() {
    let mut violations = Vec::new();
    for file in rust_files() {
        let content = std::fs::read_to_string(&file).unwrap_or_default();
        let n = non_empty_lines(&content);
        if n > LINE_LIMIT {
            violations.push(format!("  {}: {} non-empty lines", file.display(), n));
        }
    }
    assert!(
        violations.is_empty(),
        "files over {} lines, split them:\n{}",
        LINE_LIMIT,
        violations.join("\n")
    );
}

#[test]
fn files_carry_license_header() {
    let missing: Vec<String> = rust_files()
        .into_iter()
        .filter(|file| {
            let content = std::fs::read_to_string(file).unwrap_or_default();
            !content.lines().take(3).any(|l| l.trim() == HEADER)
        })
        .map(|f| f.display().to_string())
        .collect();
    assert!(missing.is_empty(), "missing header: {:?}", missing);
}
