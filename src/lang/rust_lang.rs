//! Rust [`LanguageConfig`], grounded directly on
//! `original_source/python/fim/languages/_rust.py` — the one concrete,
//! fully worked language reference in the original implementation.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use super::shared::extract_c_family_referenced_symbols;
use super::{LanguageConfig, LanguageHooks};

struct RustHooks {
    import_re: Regex,
    fn_re: Regex,
}

impl LanguageHooks for RustHooks {
    fn extract_imports(&self, source: &str) -> HashSet<String> {
        let mut out = HashSet::new();
        for cap in self.import_re.captures_iter(source) {
            let path = &cap[1];
            let last = path.rsplit("::").next().unwrap_or(path);
            out.insert(last.to_string());
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

            if stripped.starts_with("mod ") {
                sig_lines.push(line.to_string());
                continue;
            }

            if let Some(caps) = self.fn_re.captures(line) {
                let fn_name = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                let is_private = !stripped.starts_with("pub");
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

            if stripped.starts_with("struct ")
                || stripped.starts_with("pub struct ")
                || stripped.starts_with("enum ")
                || stripped.starts_with("pub enum ")
                || stripped.starts_with("trait ")
                || stripped.starts_with("pub trait ")
                || stripped.starts_with("impl ")
                || stripped.starts_with("type ")
                || stripped.starts_with("pub type ")
            {
                sig_lines.push(line.to_string());
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

        format!("// --- {} ---\n{}", filename, sig_lines.join("\n"))
    }

    fn extract_referenced_symbols(&self, source: &str) -> HashSet<String> {
        extract_c_family_referenced_symbols(source)
    }

    fn is_test_file(&self, rel_path: &str, fname: &str) -> bool {
        rel_path.contains("tests/") || rel_path.contains("/tests/") || fname.ends_with("_test.rs") || fname.starts_with("test_")
    }
}

fn import_regex() -> Regex {
    Regex::new(r"^\s*use\s+(?:crate|super|self)?::?([\w:]+)").unwrap()
}

fn fn_regex() -> Regex {
    Regex::new(r"^\s*(?:pub(?:\([\w:]+\))?\s+)?(?:async\s+)?fn\s+(\w+)").unwrap()
}

pub fn config() -> LanguageConfig {
    static TS_LANG: OnceLock<tree_sitter::Language> = OnceLock::new();
    let ts_language = TS_LANG.get_or_init(|| tree_sitter_rust::LANGUAGE.into()).clone();

    LanguageConfig {
        name: "rust",
        extensions: &[".rs"],
        comment_prefix: "//",
        skip_dirs: ["target", ".git", ".svn", "node_modules", ".idea", ".vscode"]
            .into_iter()
            .collect(),
        skip_patterns: vec![Regex::new(r"^target/").unwrap()],
        ts_language: Some(ts_language),
        ast_eligible_types: [
            "expression_statement",
            "return_expression",
            "if_expression",
            "for_expression",
            "while_expression",
            "loop_expression",
            "match_expression",
            "let_declaration",
            "function_item",
            "struct_item",
            "enum_item",
            "impl_item",
            "trait_item",
            "call_expression",
            "method_call_expression",
            "macro_invocation",
            "closure_expression",
            "block",
            "assignment_expression",
            "binary_expression",
            "field_expression",
            "struct_expression",
            "array_expression",
            "tuple_expression",
        ]
        .into_iter()
        .collect(),
        ast_bracket_types: ["arguments", "parameters", "array_expression", "tuple_expression", "parenthesized_expression"]
            .into_iter()
            .collect(),
        ast_ident_node_types: ["identifier", "field_identifier", "type_identifier"].into_iter().collect(),
        ast_name_node_type: "identifier",
        ast_function_types: ["function_item"].into_iter().collect(),
        regex_func_pattern: Some(Regex::new(r"^(\s*)(?:pub(?:\([\w:]+\))?\s+)?(?:async\s+)?fn\s+\w+").unwrap()),
        regex_array_pattern: Some(Regex::new(r"^(\s*)\S.*[\[\{]\s*$").unwrap()),
        regex_block_keywords: &["if", "else if", "else", "for", "while", "match", "loop"],
        trigger_tokens: &[
            "if ", "else if ", "while ", "for ", "match ", "return ", "= ", "let ", "fn ", "(", "[", "{", "=> ", "::",
        ],
        doc_comment_openers: &["///", "//!"],
        hooks: Box::new(RustHooks { import_re: import_regex(), fn_re: fn_regex() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_last_segment_of_use_path() {
        let cfg = config();
        let imports = cfg.hooks.extract_imports("use crate::infra::config::Config;\nuse super::walk::FileWalker;\n");
        assert!(imports.contains("Config"));
        assert!(imports.contains("FileWalker"));
    }

    #[test]
    fn signature_strips_private_unreferenced_fns() {
        let cfg = config();
        let src = "pub struct Foo;\nfn helper() { 1 }\npub fn bar() { helper() }\n";
        let sig = cfg.hooks.extract_signature(src, "foo.rs", Some(&HashSet::from(["bar".to_string()])), 40);
        assert!(sig.contains("pub struct Foo"));
        assert!(sig.contains("bar"));
        assert!(!sig.contains("fn helper"));
    }
}
