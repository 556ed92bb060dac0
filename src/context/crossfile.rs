//! Cross-File Context Builder (component F), grounded on
//! `original_source/python/fim/crossfile.py`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde_json::json;

use crate::lang::LanguageConfig;

use super::Outcome;

fn extends_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r".*\b(?:extends|implements)\b").unwrap())
}

/// Files actually referenced via import/require, capped at 5, per
/// `crossfile.py::find_related_files`. No same-directory heuristic.
pub fn find_related_files(filepath: &Path, all_files: &[PathBuf], source: &str, lang: &LanguageConfig) -> Vec<PathBuf> {
    let imports = lang.hooks.extract_imports(source);
    let requires = lang.hooks.extract_require_files(source);

    all_files
        .iter()
        .filter(|f| f.as_path() != filepath)
        .filter(|f| {
            let stem = f.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            imports.contains(stem) || requires.contains(stem)
        })
        .take(5)
        .cloned()
        .collect()
}

/// Builds the dependency-signature context string prepended to the FIM
/// prefix. The `extends`/`implements` check scans the **target** file's own
/// `source` for a line naming the related file's stem next to `extends` or
/// `implements` — this is what `crossfile.py::build_cross_file_context`
/// actually does (it scans `source`, not the related file's source).
pub fn build_cross_file_context(
    filepath: &Path,
    all_files: &[PathBuf],
    source: &str,
    max_tokens: usize,
    lang: &LanguageConfig,
    debug: bool,
) -> Outcome<String> {
    let related = find_related_files(filepath, all_files, source, lang);
    let char_budget = max_tokens * 4;

    if related.is_empty() {
        return if debug {
            Outcome::with_debug(
                String::new(),
                json!({"related_files": [], "referenced_symbols": [], "signatures": [], "budget": {"used_chars": 0, "max_chars": char_budget}}),
            )
        } else {
            Outcome::plain(String::new())
        };
    }

    let referenced = lang.hooks.extract_referenced_symbols(source);

    let mut context_parts = Vec::new();
    let mut total_len = 0usize;
    let mut sig_details = Vec::new();

    for rel_file in &related {
        let Ok(rel_source) = std::fs::read_to_string(rel_file) else { continue };

        let stem = rel_file.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        let extends_this = source.split('\n').any(|line| line.contains(stem) && extends_pattern().is_match(line));
        let filter_symbols: Option<&HashSet<String>> = if extends_this { None } else { Some(&referenced) };

        let filename = rel_file.to_string_lossy();
        let sig = lang.hooks.extract_signature(&rel_source, &filename, filter_symbols, 40);
        if sig.is_empty() {
            continue;
        }

        if total_len + sig.len() > char_budget {
            if debug {
                sig_details.push(json!({"file": rel_file.file_name().map(|n| n.to_string_lossy().to_string()), "sig_length": sig.len(), "included": false}));
            }
            break;
        }

        total_len += sig.len();
        if debug {
            sig_details.push(json!({"file": rel_file.file_name().map(|n| n.to_string_lossy().to_string()), "sig_length": sig.len(), "included": true}));
        }
        context_parts.push(sig);
    }

    if context_parts.is_empty() {
        return if debug {
            Outcome::with_debug(
                String::new(),
                json!({
                    "related_files": related.iter().map(|f| f.file_name().map(|n| n.to_string_lossy().to_string())).collect::<Vec<_>>(),
                    "referenced_symbols": referenced,
                    "signatures": sig_details,
                    "budget": {"used_chars": 0, "max_chars": char_budget},
                }),
            )
        } else {
            Outcome::plain(String::new())
        };
    }

    let result = format!("{}\n\n", context_parts.join("\n\n"));
    if debug {
        Outcome::with_debug(
            result,
            json!({
                "related_files": related.iter().map(|f| f.file_name().map(|n| n.to_string_lossy().to_string())).collect::<Vec<_>>(),
                "referenced_symbols": referenced,
                "signatures": sig_details,
                "budget": {"used_chars": total_len, "max_chars": char_budget},
            }),
        )
    } else {
        Outcome::plain(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::LanguageRegistry;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn builds_signature_context_from_an_imported_file() {
        let dir = TempDir::new().unwrap();
        let helper = dir.path().join("helper.rs");
        fs::write(&helper, "pub fn helper_fn() -> i32 { 1 }\n").unwrap();
        let main = dir.path().join("main.rs");
        let source = "use crate::helper;\nfn main() { helper::helper_fn(); }\n";
        fs::write(&main, source).unwrap();

        let registry = LanguageRegistry::with_defaults();
        let rust = registry.get("rust").unwrap();
        let all_files = vec![main.clone(), helper.clone()];

        let outcome = build_cross_file_context(&main, &all_files, source, 1024, rust, false);
        assert!(outcome.value.contains("helper_fn"));
        assert!(outcome.debug.is_none());
    }
}
