//! Helpers shared by C-family-ish languages, grounded on
//! `original_source/python/fim/languages/_shared.py`. Where the Python
//! original builds closures (`make_brace_signature_extractor`, …), this
//! port uses a reusable config struct implementing [`LanguageHooks`]
//! directly, since Rust has no first-class function-pointer-valued struct
//! fields as ergonomically as Python's closures.

use std::collections::HashSet;
use std::path::Path;

use regex::Regex;

use super::LanguageHooks;

pub const COMMON_SKIP_DIRS: &[&str] = &[".git", ".svn", "node_modules", "dist", "build", ".idea", ".vscode"];

/// Generic C-family-ish signature extractor: keeps declaration-keyword
/// lines verbatim, strips function bodies to `{ ... }`, optionally filters
/// members by referenced-symbol set, and preferentially drops
/// public/unreferenced method signatures first when over `max_lines`.
pub struct BraceSignatureHooks {
    pub decl_keywords: &'static [&'static str],
    pub func_pattern: Regex,
    pub comment_header: &'static str,
    pub member_pattern: Option<Regex>,
    pub private_pattern: Option<Regex>,
    pub import_pattern: Regex,
}

impl LanguageHooks for BraceSignatureHooks {
    fn extract_imports(&self, source: &str) -> HashSet<String> {
        let mut out = HashSet::new();
        for cap in self.import_pattern.captures_iter(source) {
            if let Some(m) = cap.get(1) {
                let stem = Path::new(m.as_str())
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or(m.as_str());
                out.insert(stem.to_string());
            }
        }
        out
    }

    fn extract_require_files(&self, _source: &str) -> HashSet<String> {
        HashSet::new()
    }

    fn extract_signature(
        &self,
        source: &str,
        filename: &str,
        referenced: Option<&HashSet<String>>,
        max_lines: usize,
    ) -> String {
        let mut sig_lines: Vec<String> = Vec::new();
        let mut public_unreferenced_indices: Vec<usize> = Vec::new();

        for line in source.split('\n') {
            let stripped = line.trim();

            if self.decl_keywords.iter().any(|kw| stripped.starts_with(kw)) {
                sig_lines.push(line.to_string());
                continue;
            }

            if let Some(caps) = self.func_pattern.captures(line) {
                let fn_name = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                let is_private = self
                    .private_pattern
                    .as_ref()
                    .is_some_and(|re| re.is_match(line));
                let is_referenced = referenced.is_none_or(|r| r.contains(fn_name));

                if is_private && !is_referenced {
                    continue;
                }

                let mut sig = line.trim_end().to_string();
                if let Some(brace) = sig.find('{') {
                    sig.truncate(brace);
                    sig.push_str("{ ... }");
                } else if !sig.contains(';') {
                    sig.push_str(" { ... }");
                }
                if !is_private && !is_referenced {
                    public_unreferenced_indices.push(sig_lines.len());
                }
                sig_lines.push(sig);
                continue;
            }

            if let Some(member_re) = &self.member_pattern {
                if member_re.is_match(stripped) {
                    sig_lines.push(line.to_string());
                }
            }
        }

        if sig_lines.is_empty() {
            return String::new();
        }
        if sig_lines.len() > max_lines {
            for idx in public_unreferenced_indices.into_iter().rev() {
                if sig_lines.len() <= max_lines {
                    break;
                }
                if idx < sig_lines.len() {
                    sig_lines.remove(idx);
                }
            }
            if sig_lines.len() > max_lines {
                sig_lines.truncate(max_lines);
            }
        }

        format!("{} --- {} ---\n{}", self.comment_header, filename, sig_lines.join("\n"))
    }

    fn extract_referenced_symbols(&self, source: &str) -> HashSet<String> {
        extract_c_family_referenced_symbols(source)
    }

    fn is_test_file(&self, rel_path: &str, fname: &str) -> bool {
        let lower = rel_path.to_lowercase();
        lower.contains("test") || fname.contains("Test") || fname.contains("spec")
    }
}

/// Generic symbol extraction: call identifiers and PascalCase identifiers.
pub fn extract_c_family_referenced_symbols(source: &str) -> HashSet<String> {
    static CALL_RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    static PASCAL_RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    let call_re = CALL_RE.get_or_init(|| Regex::new(r"\b(\w+)\s*\(").unwrap());
    let pascal_re = PASCAL_RE.get_or_init(|| Regex::new(r"\b([A-Z]\w+)").unwrap());

    let mut out = HashSet::new();
    for cap in call_re.captures_iter(source) {
        out.insert(cap[1].to_string());
    }
    for cap in pascal_re.captures_iter(source) {
        out.insert(cap[1].to_string());
    }
    out
}
