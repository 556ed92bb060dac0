//! Language Registry (component A).
//!
//! A [`LanguageConfig`] bundles everything per-language: file-discovery
//! rules, tree-sitter AST node-type tables, regex-fallback patterns, and a
//! [`LanguageHooks`] trait object for the four callables whose logic
//! genuinely differs per language (import/require/signature/referenced-
//! symbol extraction). The registry is an explicit value built once at
//! startup and threaded through the pipeline, not a global.

pub mod cpp_lang;
pub mod go_lang;
pub mod javascript_lang;
pub mod python_lang;
pub mod rust_lang;
pub mod shared;

use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexMap;
use regex::Regex;
use tree_sitter::Language as TsLanguage;

use crate::error::LangError;

/// The four callables that differ too much per language to tabulate as data.
pub trait LanguageHooks: Send + Sync {
    /// Identifiers implying a file dependency (stem-matched against the pool).
    fn extract_imports(&self, source: &str) -> HashSet<String>;

    /// Explicit file-inclusion targets (e.g. PHP `require`/`include`).
    fn extract_require_files(&self, source: &str) -> HashSet<String>;

    /// Compact signature view: declarations kept, bodies elided, optionally
    /// filtered to `referenced` symbols.
    fn extract_signature(
        &self,
        source: &str,
        filename: &str,
        referenced: Option<&HashSet<String>>,
        max_lines: usize,
    ) -> String;

    /// Identifiers referenced in `source` (calls, class mentions, …), used to
    /// filter cross-file signatures.
    fn extract_referenced_symbols(&self, source: &str) -> HashSet<String>;

    /// Whether `rel_path`/`fname` names a test file for this language.
    fn is_test_file(&self, rel_path: &str, fname: &str) -> bool {
        let lower = rel_path.to_lowercase();
        lower.contains("test") || fname.contains("Test")
    }
}

pub struct LanguageConfig {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
    pub comment_prefix: &'static str,

    // --- File discovery ---
    pub skip_dirs: HashSet<&'static str>,
    pub skip_patterns: Vec<Regex>,

    // --- Tree-sitter ---
    pub ts_language: Option<TsLanguage>,

    // --- AST span config ---
    pub ast_eligible_types: HashSet<&'static str>,
    pub ast_bracket_types: HashSet<&'static str>,
    pub ast_ident_node_types: HashSet<&'static str>,
    pub ast_name_node_type: &'static str,
    pub ast_function_types: HashSet<&'static str>,

    // --- Regex-fallback spans ---
    pub regex_func_pattern: Option<Regex>,
    pub regex_array_pattern: Option<Regex>,
    pub regex_block_keywords: &'static [&'static str],

    // --- Dev-behavior spans ---
    pub trigger_tokens: &'static [&'static str],
    pub doc_comment_openers: &'static [&'static str],

    // --- Cross-file hooks ---
    pub hooks: Box<dyn LanguageHooks>,
}

impl LanguageConfig {
    pub fn matches_extension(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let dotted = format!(".{ext}");
        self.extensions.contains(&dotted.as_str())
    }

    pub fn matches_skip_pattern(&self, rel_path: &str) -> bool {
        self.skip_patterns.iter().any(|re| re.is_match(rel_path))
    }
}

/// Explicit, passed-by-construction registry — see module docs.
pub struct LanguageRegistry {
    langs: IndexMap<String, LanguageConfig>,
}

impl LanguageRegistry {
    pub fn builder() -> LanguageRegistryBuilder {
        LanguageRegistryBuilder { langs: IndexMap::new() }
    }

    /// The default registry: every language this port ships a config for.
    pub fn with_defaults() -> Self {
        Self::builder()
            .register(rust_lang::config())
            .register(python_lang::config())
            .register(javascript_lang::config("javascript", &[".js", ".jsx", ".mjs"]))
            .register(javascript_lang::config("typescript", &[".ts", ".tsx"]))
            .register(go_lang::config())
            .register(cpp_lang::config())
            .build()
    }

    pub fn get(&self, name: &str) -> Result<&LanguageConfig, LangError> {
        self.langs
            .get(name)
            .ok_or_else(|| LangError::UnknownLanguage(name.to_string(), self.registered_languages()))
    }

    pub fn registered_languages(&self) -> Vec<String> {
        self.langs.keys().cloned().collect()
    }

    /// The config whose extension list contains `path`'s extension, if any.
    pub fn by_extension(&self, path: &Path) -> Option<&LanguageConfig> {
        self.langs.values().find(|lc| lc.matches_extension(path))
    }
}

pub struct LanguageRegistryBuilder {
    langs: IndexMap<String, LanguageConfig>,
}

impl LanguageRegistryBuilder {
    pub fn register(mut self, config: LanguageConfig) -> Self {
        self.langs.insert(config.name.to_string(), config);
        self
    }

    pub fn build(self) -> LanguageRegistry {
        LanguageRegistry { langs: self.langs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_language_is_fatal() {
        let reg = LanguageRegistry::with_defaults();
        let err = reg.get("cobol").unwrap_err();
        assert!(matches!(err, LangError::UnknownLanguage(name, _) if name == "cobol"));
    }

    #[test]
    fn rust_is_registered_and_matches_extension() {
        let reg = LanguageRegistry::with_defaults();
        let rust = reg.get("rust").expect("rust registered");
        assert!(rust.matches_extension(Path::new("src/lib.rs")));
        assert!(!rust.matches_extension(Path::new("src/lib.py")));
    }
}
