//! Quality Filter (component I): six-rule rejector, grounded on
//! `original_source/python/generate/_quality.py::filter_low_quality_examples`.

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::assemble::FIMExample;
use crate::lang::LanguageConfig;
use crate::span::{QualityRule, SpanKind};

const MIN_MIDDLE_CHARS: usize = 40;

/// AST-identifier-density complexity score, grounded on
/// `_quality.py::compute_complexity_score`. Falls back to a rough regex
/// identifier count when the language has no tree-sitter grammar.
pub fn compute_complexity_score(source: &str, lang: &LanguageConfig) -> f64 {
    if source.is_empty() {
        return 0.0;
    }

    let Some(ts_lang) = &lang.ts_language else {
        static IDENT_RE: OnceLock<Regex> = OnceLock::new();
        let re = IDENT_RE.get_or_init(|| Regex::new(r"\b[a-zA-Z_]\w*\b").unwrap());
        let count = re.find_iter(source).count();
        return count as f64 / source.len().max(1) as f64 * 100.0;
    };

    let mut parser = tree_sitter::Parser::new();
    if parser.set_language(ts_lang).is_err() {
        return 0.0;
    }
    let Some(tree) = parser.parse(source, None) else { return 0.0 };

    fn count_idents(node: tree_sitter::Node, ident_types: &std::collections::HashSet<&str>) -> usize {
        let mut count = if ident_types.contains(node.kind()) { 1 } else { 0 };
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            count += count_idents(child, ident_types);
        }
        count
    }

    let ident_count = count_idents(tree.root_node(), &lang.ast_ident_node_types);
    ident_count as f64 / source.len().max(1) as f64 * 100.0
}

fn import_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\s*(?:require_once|require_relative|include_once|include|from\s+\S+\s+import\b|import\b|using\b|use\b|extern\s+crate\b|load\b|#\s*include\b|source\b|@(?:import|use|forward)\b|(?:const|let|var)\s+\S+\s*=\s*require\s*\(|require\s*\()",
        )
        .unwrap()
    })
}

fn char_entropy(text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    let mut freq = std::collections::HashMap::new();
    let mut total = 0usize;
    for c in text.chars() {
        *freq.entry(c).or_insert(0usize) += 1;
        total += 1;
    }
    -freq.values().map(|&n| {
        let p = n as f64 / total as f64;
        p * p.log2()
    }).sum::<f64>()
}

pub struct FilterOutcome {
    pub kept: Vec<FIMExample>,
    pub rejected: Vec<FIMExample>,
    pub rejected_by_kind: IndexMap<SpanKind, usize>,
}

/// Applies the six rules in order; any one rejects the example unless its
/// rule is present in `ex.skip_quality_filters`.
pub fn filter_low_quality_examples(examples: Vec<FIMExample>) -> FilterOutcome {
    let mut kept = Vec::new();
    let mut rejected = Vec::new();
    let mut rejected_by_kind: IndexMap<SpanKind, usize> = IndexMap::new();

    'outer: for ex in examples {
        let skip = &ex.skip_quality_filters;

        if !skip.contains(&QualityRule::MinLength) && ex.middle.trim().len() < MIN_MIDDLE_CHARS {
            *rejected_by_kind.entry(ex.span_kind).or_insert(0) += 1;
            rejected.push(ex);
            continue;
        }

        if !skip.contains(&QualityRule::Import) {
            let prefix_tail = ex.prefix.rsplit('\n').next().unwrap_or("");
            let suffix_head = ex.suffix.split('\n').next().unwrap_or("");
            let mid_lines: Vec<&str> = ex.middle.split('\n').collect();
            let last = mid_lines.len().saturating_sub(1);
            let full_lines: Vec<String> = mid_lines
                .iter()
                .enumerate()
                .map(|(i, &l)| {
                    let mut line = l.to_string();
                    if i == 0 {
                        line = format!("{prefix_tail}{line}");
                    }
                    if i == last {
                        line = format!("{line}{suffix_head}");
                    }
                    line
                })
                .collect();
            let non_empty: Vec<&String> = full_lines.iter().filter(|l| !l.trim().is_empty()).collect();
            if !non_empty.is_empty() && non_empty.iter().all(|l| import_line_re().is_match(l)) {
                *rejected_by_kind.entry(ex.span_kind).or_insert(0) += 1;
                rejected.push(ex);
                continue;
            }
        }

        if !skip.contains(&QualityRule::Repetition) {
            let mid_lines: Vec<&str> = ex.middle.split('\n').collect();
            if mid_lines.len() > 2 {
                let non_empty: Vec<&str> = mid_lines.iter().filter(|l| !l.trim().is_empty()).copied().collect();
                let unique: std::collections::HashSet<&str> = non_empty.iter().map(|l| l.trim()).collect();
                if !non_empty.is_empty() && (unique.len() as f64 / non_empty.len() as f64) < 0.5 {
                    *rejected_by_kind.entry(ex.span_kind).or_insert(0) += 1;
                    rejected.push(ex);
                    continue;
                }
            }
        }

        if !skip.contains(&QualityRule::Entropy) && char_entropy(&ex.middle) < 2.0 {
            *rejected_by_kind.entry(ex.span_kind).or_insert(0) += 1;
            rejected.push(ex);
            continue;
        }

        if !skip.contains(&QualityRule::CommentOnly) {
            let mid_lines: Vec<&str> = ex.middle.split('\n').collect();
            if !mid_lines.is_empty() {
                let comment_lines = mid_lines.iter().filter(|l| {
                    let t = l.trim_start();
                    t.starts_with("//") || t.starts_with("/*") || t.starts_with('*') || t.starts_with('#')
                }).count();
                if comment_lines as f64 / mid_lines.len().max(1) as f64 > 0.8 {
                    *rejected_by_kind.entry(ex.span_kind).or_insert(0) += 1;
                    rejected.push(ex);
                    continue;
                }
            }
        }

        if !skip.contains(&QualityRule::LengthRatio) {
            let total_len = ex.prefix.len() + ex.middle.len() + ex.suffix.len();
            if total_len > 0 {
                let ratio = ex.middle.len() as f64 / total_len as f64;
                if !(0.03..=0.80).contains(&ratio) {
                    *rejected_by_kind.entry(ex.span_kind).or_insert(0) += 1;
                    rejected.push(ex);
                    continue 'outer;
                }
            }
        }

        kept.push(ex);
    }

    FilterOutcome { kept, rejected, rejected_by_kind }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::SpanLocator;
    use camino::Utf8PathBuf;

    fn example(middle: &str) -> FIMExample {
        FIMExample {
            filepath: Utf8PathBuf::from("a.rs"),
            span_kind: SpanKind::AstSingleNode,
            span_name: String::new(),
            prefix: "fn f() {\n".to_string(),
            middle: middle.to_string(),
            suffix: "\n}\n".to_string(),
            cross_file_context: String::new(),
            middle_lines: middle.lines().count(),
            total_lines: 3,
            complexity_score: 0.0,
            skip_quality_filters: Default::default(),
            locator_kind: SpanLocator::Byte { start: 0, end: 1 },
        }
    }

    #[test]
    fn rejects_middles_shorter_than_min_length() {
        let out = filter_low_quality_examples(vec![example("short")]);
        assert!(out.kept.is_empty());
        assert_eq!(out.rejected.len(), 1);
    }

    #[test]
    fn keeps_a_realistic_diverse_middle() {
        let middle = "let total = compute_widget_price(item) + shipping_fee(region);\nlog::debug!(\"priced {total}\");";
        let out = filter_low_quality_examples(vec![example(middle)]);
        assert_eq!(out.kept.len(), 1);
    }
}
