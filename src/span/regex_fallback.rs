//! Regex-Fallback Span Generator: used when a language has no tree-sitter
//! grammar registered (`ast_language` is `None`). Parameterized by
//! [`LanguageConfig`]'s `regex_func_pattern`/`regex_array_pattern`/
//! `regex_block_keywords` rather than hardcoded to one language, per the
//! generalization note in SPEC_FULL.md §4 (the Python original,
//! `original_source/python/fim/_spans_regex.py`, hardcodes these to PHP).

use std::sync::OnceLock;

use rand::Rng;
use regex::Regex;

use crate::lang::LanguageConfig;

use super::{CodeSpan, SpanKind, SpanLocator};

fn assignment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"=\s*([^;\n]{4,120});").unwrap())
}

/// Finds the byte offset just past the closing brace matching the `{`
/// nearest at-or-after `from`, or `None` if unbalanced.
fn matching_brace_end(bytes: &[u8], from: usize) -> Option<usize> {
    let open = bytes[from..].iter().position(|&b| b == b'{')? + from;
    let mut depth = 0i32;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

pub fn generate_regex_spans(source: &str, lang: &LanguageConfig, rng: &mut impl Rng) -> Vec<CodeSpan> {
    let bytes = source.as_bytes();
    let target = (bytes.len() / 500).max(4);
    let per_kind = (target / 4).max(1);

    let mut out = Vec::new();
    out.extend(function_body_spans(source, bytes, lang, per_kind, rng));
    out.extend(expression_spans(source, per_kind, rng));
    out.extend(block_spans(source, bytes, lang, per_kind, rng));
    out.extend(line_spans(source, per_kind, rng));
    out
}

fn function_body_spans(source: &str, bytes: &[u8], lang: &LanguageConfig, count: usize, rng: &mut impl Rng) -> Vec<CodeSpan> {
    let Some(re) = &lang.regex_func_pattern else { return Vec::new() };
    let mut candidates = Vec::new();
    for m in re.find_iter(source) {
        if let Some(end) = matching_brace_end(bytes, m.end()) {
            let body_start = bytes[m.end()..end].iter().position(|&b| b == b'{').map(|p| m.end() + p + 1).unwrap_or(m.end());
            let body_end = end.saturating_sub(1);
            if body_end > body_start {
                candidates.push((body_start, body_end));
            }
        }
    }
    sample(candidates, count, rng).into_iter().map(|(s, e)| CodeSpan::new(SpanKind::RegexFunctionBody, SpanLocator::Byte { start: s, end: e })).collect()
}

fn expression_spans(source: &str, count: usize, rng: &mut impl Rng) -> Vec<CodeSpan> {
    let candidates: Vec<(usize, usize)> = assignment_re()
        .captures_iter(source)
        .filter_map(|c| c.get(1))
        .map(|g| (g.start(), g.end()))
        .collect();
    sample(candidates, count, rng).into_iter().map(|(s, e)| CodeSpan::new(SpanKind::RegexExpression, SpanLocator::Byte { start: s, end: e })).collect()
}

fn block_spans(source: &str, bytes: &[u8], lang: &LanguageConfig, count: usize, rng: &mut impl Rng) -> Vec<CodeSpan> {
    if lang.regex_block_keywords.is_empty() {
        return Vec::new();
    }
    let mut candidates = Vec::new();
    for kw in lang.regex_block_keywords {
        let mut search_from = 0usize;
        while let Some(pos) = source[search_from..].find(kw) {
            let abs = search_from + pos;
            if let Some(end) = matching_brace_end(bytes, abs) {
                let open = bytes[abs..end].iter().position(|&b| b == b'{').map(|p| abs + p + 1).unwrap_or(abs);
                if end.saturating_sub(1) > open {
                    candidates.push((open, end - 1));
                }
            }
            search_from = abs + kw.len();
        }
    }
    sample(candidates, count, rng).into_iter().map(|(s, e)| CodeSpan::new(SpanKind::RegexBlock, SpanLocator::Byte { start: s, end: e })).collect()
}

fn line_spans(source: &str, count: usize, rng: &mut impl Rng) -> Vec<CodeSpan> {
    let lines: Vec<&str> = source.split_inclusive('\n').collect();
    if lines.len() < 3 {
        return Vec::new();
    }
    let mut out = Vec::new();
    for _ in 0..count {
        let span_lines = rng.random_range(1..=3.min(lines.len() - 1).max(1));
        if lines.len() <= span_lines {
            continue;
        }
        let start_line = rng.random_range(0..lines.len() - span_lines);
        let end_line = start_line + span_lines;
        out.push(CodeSpan::new(SpanKind::RegexLines, SpanLocator::Line { start: start_line, end: end_line }));
    }
    out
}

fn sample(mut candidates: Vec<(usize, usize)>, count: usize, rng: &mut impl Rng) -> Vec<(usize, usize)> {
    for i in (1..candidates.len()).rev() {
        let j = rng.random_range(0..=i);
        candidates.swap(i, j);
    }
    candidates.truncate(count);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::LanguageRegistry;
    use rand::SeedableRng;

    #[test]
    fn function_body_extracted_between_braces() {
        let registry = LanguageRegistry::with_defaults();
        let go = registry.get("go").unwrap();
        let src = "func add(a, b int) int {\n\treturn a + b\n}\n";
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(5);
        let spans = function_body_spans(src, src.as_bytes(), go, 5, &mut rng);
        assert!(!spans.is_empty());
        for s in spans {
            if let SpanLocator::Byte { start, end } = s.locator {
                assert!(src[start..end].contains("return"));
            }
        }
    }
}
