//! JavaScript/TypeScript [`LanguageConfig`], parameterized by `name` since
//! the two grammars and hook behavior are close enough to share one
//! constructor — unlike Rust/Python they get the generic
//! [`BraceSignatureHooks`] rather than a bespoke hook implementation.

use regex::Regex;

use super::shared::BraceSignatureHooks;
use super::{LanguageConfig, LanguageHooks};

fn ts_language_for(name: &str) -> tree_sitter::Language {
    match name {
        "typescript" => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        _ => tree_sitter_javascript::LANGUAGE.into(),
    }
}

pub fn config(name: &'static str, extensions: &'static [&'static str]) -> LanguageConfig {
    let hooks: Box<dyn LanguageHooks> = Box::new(BraceSignatureHooks {
        decl_keywords: &["class ", "export class ", "export default class ", "interface ", "export interface ", "type ", "export type "],
        func_pattern: Regex::new(r"^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s+(\w+)\s*\(").unwrap(),
        comment_header: "//",
        member_pattern: Some(Regex::new(r"^(?:public|private|protected|readonly|static)\s").unwrap()),
        private_pattern: Some(Regex::new(r"^\s*private\s").unwrap()),
        import_pattern: Regex::new(r#"(?:import\s+.*?\sfrom\s+['"]([^'"]+)['"]|require\(\s*['"]([^'"]+)['"]\s*\))"#).unwrap(),
    });

    LanguageConfig {
        name,
        extensions,
        comment_prefix: "//",
        skip_dirs: ["node_modules", "dist", "build", ".git", ".svn", ".idea", ".vscode"].into_iter().collect(),
        skip_patterns: vec![Regex::new(r"\.min\.(?:js|ts)$").unwrap()],
        ts_language: Some(ts_language_for(name)),
        ast_eligible_types: [
            "expression_statement",
            "return_statement",
            "if_statement",
            "for_statement",
            "for_in_statement",
            "while_statement",
            "switch_statement",
            "try_statement",
            "function_declaration",
            "method_definition",
            "class_declaration",
            "assignment_expression",
            "call_expression",
            "arrow_function",
            "object",
            "array",
            "binary_expression",
            "ternary_expression",
            "variable_declaration",
        ]
        .into_iter()
        .collect(),
        ast_bracket_types: ["arguments", "formal_parameters", "array", "object", "parenthesized_expression"]
            .into_iter()
            .collect(),
        ast_ident_node_types: ["identifier", "property_identifier", "type_identifier"].into_iter().collect(),
        ast_name_node_type: "identifier",
        ast_function_types: ["function_declaration", "method_definition"].into_iter().collect(),
        regex_func_pattern: Some(Regex::new(r"^(\s*)(?:export\s+)?(?:async\s+)?function\s+\w+\s*\(").unwrap()),
        regex_array_pattern: Some(Regex::new(r"^(\s*)\S.*[\[\{]\s*$").unwrap()),
        regex_block_keywords: &["if", "else if", "else", "for", "while", "switch", "try", "catch"],
        trigger_tokens: &["if (", "else if (", "while (", "for (", "return ", "= ", "=> ", "."],
        doc_comment_openers: &["/**"],
        hooks,
    }
}
