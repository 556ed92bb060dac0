//! Python [`LanguageConfig`]. The cross-file hooks are a simplified,
//! indentation-aware cousin of the brace-family extractor in
//! [`super::shared`], since Python has no `{ ... }` bodies to strip.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use super::shared::extract_c_family_referenced_symbols;
use super::{LanguageConfig, LanguageHooks};

struct PythonHooks {
    import_re: Regex,
    from_import_re: Regex,
    def_re: Regex,
}

impl LanguageHooks for PythonHooks {
    fn extract_imports(&self, source: &str) -> HashSet<String> {
        let mut out = HashSet::new();
        for cap in self.import_re.captures_iter(source) {
            out.insert(cap[1].split('.').next_back().unwrap_or(&cap[1]).to_string());
        }
        for cap in self.from_import_re.captures_iter(source) {
            out.insert(cap[1].split('.').next_back().unwrap_or(&cap[1]).to_string());
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

            if stripped.starts_with("class ") {
                sig_lines.push(line.to_string());
                continue;
            }

            if let Some(caps) = self.def_re.captures(line) {
                let name = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                let is_private = name.starts_with('_');
                let is_referenced = referenced.is_none_or(|r| r.contains(name));

                if is_private && !is_referenced {
                    continue;
                }

                let indent: String = line.chars().take_while(|c| *c == ' ').collect();
                let head = stripped.trim_end_matches(':').to_string();
                let sig = format!("{indent}{head}: ...");
                if !is_private && !is_referenced {
                    public_unreferenced_indices.push(sig_lines.len());
                }
                sig_lines.push(sig);
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

        format!("# --- {} ---\n{}", filename, sig_lines.join("\n"))
    }

    fn extract_referenced_symbols(&self, source: &str) -> HashSet<String> {
        extract_c_family_referenced_symbols(source)
    }

    fn is_test_file(&self, rel_path: &str, fname: &str) -> bool {
        let lower = rel_path.to_lowercase();
        lower.contains("test") || fname.starts_with("test_") || fname.ends_with("_test.py")
    }
}

pub fn config() -> LanguageConfig {
    static TS_LANG: OnceLock<tree_sitter::Language> = OnceLock::new();
    let ts_language = TS_LANG.get_or_init(|| tree_sitter_python::LANGUAGE.into()).clone();

    LanguageConfig {
        name: "python",
        extensions: &[".py"],
        comment_prefix: "#",
        skip_dirs: ["__pycache__", ".git", ".svn", "node_modules", ".idea", ".vscode", "venv", ".venv"]
            .into_iter()
            .collect(),
        skip_patterns: vec![Regex::new(r"\.pyc$").unwrap()],
        ts_language: Some(ts_language),
        ast_eligible_types: [
            "expression_statement",
            "return_statement",
            "if_statement",
            "for_statement",
            "while_statement",
            "try_statement",
            "with_statement",
            "function_definition",
            "class_definition",
            "assignment",
            "call",
            "lambda",
            "assert_statement",
            "raise_statement",
            "dictionary",
            "list",
            "tuple",
            "binary_operator",
            "comparison_operator",
            "boolean_operator",
        ]
        .into_iter()
        .collect(),
        ast_bracket_types: ["argument_list", "parameters", "list", "tuple", "dictionary", "parenthesized_expression"]
            .into_iter()
            .collect(),
        ast_ident_node_types: ["identifier", "attribute"].into_iter().collect(),
        ast_name_node_type: "identifier",
        ast_function_types: ["function_definition"].into_iter().collect(),
        regex_func_pattern: Some(Regex::new(r"^(\s*)def\s+\w+\s*\(").unwrap()),
        regex_array_pattern: Some(Regex::new(r"^(\s*)\S.*[\[\{]\s*$").unwrap()),
        regex_block_keywords: &["if", "elif", "else", "for", "while", "try", "except", "with"],
        trigger_tokens: &["if ", "elif ", "while ", "for ", "return ", "= ", "def ", "(", "[", "lambda ", "."],
        doc_comment_openers: &["\"\"\"", "'''"],
        hooks: Box::new(PythonHooks {
            import_re: Regex::new(r"(?m)^\s*import\s+([\w.]+)").unwrap(),
            from_import_re: Regex::new(r"(?m)^\s*from\s+([\w.]+)\s+import\b").unwrap(),
            def_re: Regex::new(r"^\s*def\s+(\w+)\s*\(").unwrap(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_from_import_module_stem() {
        let cfg = config();
        let imports = cfg.hooks.extract_imports("from app.services.user_service import UserService\n");
        assert!(imports.contains("user_service"));
    }
}
