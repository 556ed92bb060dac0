//! Go [`LanguageConfig`], built on the shared brace-family extractor.

use regex::Regex;

use super::shared::BraceSignatureHooks;
use super::{LanguageConfig, LanguageHooks};

pub fn config() -> LanguageConfig {
    let hooks: Box<dyn LanguageHooks> = Box::new(BraceSignatureHooks {
        decl_keywords: &["type ", "const ", "var "],
        func_pattern: Regex::new(r"^\s*func\s*(?:\([^)]*\)\s*)?(\w+)\s*\(").unwrap(),
        comment_header: "//",
        member_pattern: None,
        private_pattern: Some(Regex::new(r"^\s*func\s*(?:\([^)]*\)\s*)?[a-z]").unwrap()),
        import_pattern: Regex::new(r#"(?m)^\s*"([^"]+)"\s*$"#).unwrap(),
    });

    LanguageConfig {
        name: "go",
        extensions: &[".go"],
        comment_prefix: "//",
        skip_dirs: ["vendor", ".git", ".svn", ".idea", ".vscode"].into_iter().collect(),
        skip_patterns: vec![Regex::new(r"_test\.go$").unwrap()],
        ts_language: Some(tree_sitter_go::LANGUAGE.into()),
        ast_eligible_types: [
            "expression_statement",
            "return_statement",
            "if_statement",
            "for_statement",
            "switch_statement",
            "function_declaration",
            "method_declaration",
            "type_declaration",
            "call_expression",
            "assignment_statement",
            "short_var_declaration",
            "composite_literal",
            "binary_expression",
        ]
        .into_iter()
        .collect(),
        ast_bracket_types: ["argument_list", "parameter_list", "literal_value"].into_iter().collect(),
        ast_ident_node_types: ["identifier", "field_identifier", "type_identifier"].into_iter().collect(),
        ast_name_node_type: "identifier",
        ast_function_types: ["function_declaration", "method_declaration"].into_iter().collect(),
        regex_func_pattern: Some(Regex::new(r"^(\s*)func\s").unwrap()),
        regex_array_pattern: Some(Regex::new(r"^(\s*)\S.*[\[\{]\s*$").unwrap()),
        regex_block_keywords: &["if", "else", "for", "switch"],
        trigger_tokens: &["if ", "for ", "return ", ":= ", "= ", "switch ", "."],
        doc_comment_openers: &["//"],
        hooks,
    }
}
