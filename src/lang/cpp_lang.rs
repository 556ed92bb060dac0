//! C++ [`LanguageConfig`], built on the shared brace-family extractor.

use regex::Regex;

use super::shared::BraceSignatureHooks;
use super::{LanguageConfig, LanguageHooks};

pub fn config() -> LanguageConfig {
    let hooks: Box<dyn LanguageHooks> = Box::new(BraceSignatureHooks {
        decl_keywords: &["class ", "struct ", "namespace ", "enum ", "template "],
        func_pattern: Regex::new(r"^\s*(?:[\w:<>,\s*&]+\s+)?(\w+)\s*\([^;{]*\)\s*(?:const\s*)?\{?\s*$").unwrap(),
        comment_header: "//",
        member_pattern: Some(Regex::new(r"^(?:public|private|protected):").unwrap()),
        private_pattern: None,
        import_pattern: Regex::new(r#"#include\s*[<"]([^>"]+)[>"]"#).unwrap(),
    });

    LanguageConfig {
        name: "cpp",
        extensions: &[".cpp", ".cc", ".cxx", ".hpp", ".hh", ".h"],
        comment_prefix: "//",
        skip_dirs: ["build", ".git", ".svn", "cmake-build-debug", ".idea", ".vscode"].into_iter().collect(),
        skip_patterns: vec![],
        ts_language: Some(tree_sitter_cpp::LANGUAGE.into()),
        ast_eligible_types: [
            "expression_statement",
            "return_statement",
            "if_statement",
            "for_statement",
            "while_statement",
            "switch_statement",
            "function_definition",
            "class_specifier",
            "call_expression",
            "assignment_expression",
            "declaration",
            "binary_expression",
            "initializer_list",
        ]
        .into_iter()
        .collect(),
        ast_bracket_types: ["argument_list", "parameter_list", "initializer_list"].into_iter().collect(),
        ast_ident_node_types: ["identifier", "field_identifier", "type_identifier"].into_iter().collect(),
        ast_name_node_type: "identifier",
        ast_function_types: ["function_definition"].into_iter().collect(),
        regex_func_pattern: Some(Regex::new(r"^(\s*)[\w:<>,\s*&]+\s+\w+\s*\(").unwrap()),
        regex_array_pattern: Some(Regex::new(r"^(\s*)\S.*[\[\{]\s*$").unwrap()),
        regex_block_keywords: &["if", "else", "for", "while", "switch"],
        trigger_tokens: &["if (", "for (", "while (", "return ", "= ", "::", "->", "."],
        doc_comment_openers: &["/**", "///"],
        hooks,
    }
}
