//! Hygiene: scans the bridge's production sources for antipatterns.
//!
//! Same rules as the engine crate, plus two for the bridge: nothing may block
//! the calling thread, since the host calls in from its UI loop.
#![allow(clippy::absurd_extreme_comparisons)]

use std::fs;
use std::path::{Path, PathBuf};

const BUDGETS: &[(&str, usize)] = &[
    (".unwrap()", 0),
    (".expect(", 0),
    ("panic!(", 0),
    ("unreachable!(", 0),
    ("todo!(", 0),
    ("unimplemented!(", 0),
    ("let _ =", 0),
    (".ok()", 0),
    ("#[allow(dead_code)]", 0),
    ("println!(", 0),
    // Blocking.
    ("thread::sleep", 0),
    ("block_on(", 0),
];

fn production_sources(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for path in entries.flatten().map(|e| e.path()) {
        if path.is_dir() {
            out.extend(production_sources(&path));
        } else if path.extension().is_some_and(|ext| ext == "rs")
            && !path.to_string_lossy().ends_with("_test.rs")
        {
            out.push(path);
        }
    }
    out.sort();
    out
}

#[test]
fn every_module_is_scanned() {
    let files = production_sources(Path::new("src"));
    for name in ["lib.rs", "bridge.rs", "channel.rs", "lifecycle.rs", "wasm.rs"] {
        assert!(files.iter().any(|p| p.ends_with(name)), "missing {name}");
    }
}

#[test]
fn budgets_hold() {
    let mut counts = vec![(0_usize, Vec::new()); BUDGETS.len()];
    for path in production_sources(Path::new("src")) {
        let content = fs::read_to_string(&path).unwrap_or_default();
        for (i, (pattern, _)) in BUDGETS.iter().enumerate() {
            let n = content.lines().filter(|l| l.contains(pattern)).count();
            if n > 0 {
                counts[i].0 += n;
                counts[i].1.push(format!("    {}: {n}", path.display()));
            }
        }
    }

    let report: Vec<String> = BUDGETS
        .iter()
        .zip(&counts)
        .filter(|((_, max), (found, _))| found > max)
        .map(|((pattern, max), (found, where_))| {
            format!("{pattern} budget exceeded: found {found}, max {max}\n{}", where_.join("\n"))
        })
        .collect();
    assert!(report.is_empty(), "{}", report.join("\n"));
}
