//! Source tree hygiene: line width and file headers.

use std::fs;
use std::path::{Path, PathBuf};

const MAX_COLUMNS: usize = 100;

fn rust_files(dir: &Path, out: &mut Vec<PathBuf>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            rust_files(&path, out);
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            out.push(path);
        }
    }
}

fn crate_sources() -> Vec<PathBuf> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let mut files = Vec::new();
    for dir in ["src", "tests", "benches"] {
        rust_files(&root.join(dir), &mut files);
    }
    assert!(!files.is_empty());
    files
}

#[test]
fn no_line_exceeds_max_width() {
    let mut long = Vec::new();
    for path in crate_sources() {
        let text = fs::read_to_string(&path).unwrap();
        for (idx, line) in text.lines().enumerate() {
            if line.chars().count() > MAX_COLUMNS {
                long.push(format!("{}:{}", path.display(), idx + 1));
            }
        }
    }
    assert!(long.is_empty(), "lines over {} columns: {:?}", MAX_COLUMNS, long);
}

#[test]
fn sources_carry_no_foreign_copyright_header() {
    let mut headed = Vec::new();
    for path in crate_sources() {
        let text = fs::read_to_string(&path).unwrap();
        let first = text.lines().next().unwrap_or_default();
        if first.starts_with("// Copyright") || first.contains("SPDX-License-Identifier") {
            headed.push(path.display().to_string());
        }
    }
    assert!(headed.is_empty(), "files with copyright headers: {:?}", headed);
}
