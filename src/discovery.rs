//! File Discovery (component B), grounded on `infra::walk::FileWalker`
//! (gitignore-aware traversal) plus the per-language skip rules from
//! `original_source/python/fim/discovery.py::find_php_files`, generalized
//! over the [`LanguageRegistry`] instead of being hardcoded to PHP.

use std::path::{Path, PathBuf};

use crate::infra::walk::FileWalker;
use crate::lang::LanguageConfig;

pub struct DiscoveredFiles {
    /// Files kept for training (after skip rules and optional test filtering).
    pub source_files: Vec<PathBuf>,
}

/// Walk `root`, keep only files whose extension matches `lang`, prune
/// `lang.skip_dirs`/`lang.skip_patterns`, then apply the test-file policy.
pub fn discover_files(root: &Path, lang: &LanguageConfig, tested_only: bool) -> DiscoveredFiles {
    let extra_ignores: Vec<String> = lang.skip_dirs.iter().map(|d| format!("{d}/**")).collect();
    let walker = FileWalker::new(&extra_ignores).expect("skip_dirs compile to valid globs");
    let all_files = walker.walk_files(root);

    let mut kept = Vec::new();
    let mut test_files: Vec<(String, PathBuf)> = Vec::new();

    for path in all_files {
        if !lang.matches_extension(&path) {
            continue;
        }
        let rel = path.strip_prefix(root).unwrap_or(&path);
        let rel_str = rel.to_string_lossy().to_string();
        let fname = path.file_name().and_then(|f| f.to_str()).unwrap_or("");

        if lang.hooks.is_test_file(&rel_str, fname) {
            test_files.push((rel_str, path));
            continue;
        }

        if lang.matches_skip_pattern(&rel_str) {
            continue;
        }

        kept.push(path);
    }

    if tested_only {
        kept.retain(|f| {
            let stem = f.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            test_files.iter().any(|(rel, _)| rel.contains(stem))
        });
    }

    DiscoveredFiles { source_files: kept }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::LanguageRegistry;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn prunes_skip_dirs_and_keeps_matching_extension() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("target/debug")).unwrap();
        fs::write(root.join("target/debug/build.rs"), "fn main() {}").unwrap();
        fs::write(root.join("lib.rs"), "fn lib() {}").unwrap();
        fs::write(root.join("readme.md"), "hi").unwrap();

        let registry = LanguageRegistry::with_defaults();
        let rust = registry.get("rust").unwrap();
        let found = discover_files(root, rust, false);

        assert_eq!(found.source_files.len(), 1);
        assert!(found.source_files[0].ends_with("lib.rs"));
    }

    #[test]
    fn tested_only_keeps_only_files_with_a_matching_test() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("foo.rs"), "fn foo() {}").unwrap();
        fs::write(root.join("bar.rs"), "fn bar() {}").unwrap();
        fs::create_dir_all(root.join("tests")).unwrap();
        fs::write(root.join("tests/foo_test.rs"), "fn t() {}").unwrap();

        let registry = LanguageRegistry::with_defaults();
        let rust = registry.get("rust").unwrap();
        let found = discover_files(root, rust, true);

        assert_eq!(found.source_files.len(), 1);
        assert!(found.source_files[0].ends_with("foo.rs"));
    }
}
