//! Example Assembler (component H): turns a [`CodeSpan`] plus its source
//! file into a fully materialized `⟨prefix, middle, suffix⟩` record, per
//! spec.md §4.H.

use std::collections::HashSet;

use camino::{Utf8Path, Utf8PathBuf};

use crate::span::{CodeSpan, QualityRule, SpanKind, SpanLocator};

const MAX_MIDDLE_LINES_DEFAULT: usize = 30;
const MIN_MIDDLE_LINES: usize = 1;
const MIN_MIDDLE_WORDS_LINE_SPAN: usize = 3;
const LINE_SPAN_SIDE_CAP: usize = 80;

#[derive(Debug, Clone)]
pub struct FIMExample {
    pub filepath: Utf8PathBuf,
    pub span_kind: SpanKind,
    pub span_name: String,
    pub prefix: String,
    pub middle: String,
    pub suffix: String,
    pub cross_file_context: String,
    pub middle_lines: usize,
    pub total_lines: usize,
    pub complexity_score: f64,
    pub skip_quality_filters: HashSet<QualityRule>,
    /// The locator family the span originated from — retained only so
    /// `apply_context_and_budget` knows which per-side truncation cap
    /// applies; not part of the emitted record.
    pub locator_kind: SpanLocator,
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Assembles one example from `span` against `source`. `max_middle_lines`
/// of `0` means unbounded (matches `--max-middle-lines 0` disabling the cap).
pub fn assemble_example(source: &str, filepath: &Utf8Path, span: &CodeSpan, total_lines: usize, complexity_score: f64, max_middle_lines: usize) -> Option<FIMExample> {
    let max_lines = if max_middle_lines == 0 { MAX_MIDDLE_LINES_DEFAULT } else { max_middle_lines };

    let (prefix, middle, suffix) = match span.locator {
        SpanLocator::Byte { start, end } => {
            if end > source.len() || start >= end {
                return None;
            }
            (source[..start].to_string(), source[start..end].to_string(), source[end..].to_string())
        }
        SpanLocator::Char { start, end } => {
            let chars: Vec<char> = source.chars().collect();
            if end > chars.len() || start >= end {
                return None;
            }
            (chars[..start].iter().collect(), chars[start..end].iter().collect(), chars[end..].iter().collect())
        }
        SpanLocator::Line { start, end } => {
            let lines: Vec<&str> = source.split_inclusive('\n').collect();
            if end > lines.len() || start >= end || end - start > max_lines || end - start < MIN_MIDDLE_LINES {
                return None;
            }
            let mut prefix = lines[..start].concat();
            let middle_lines: Vec<&str> = lines[start..end].to_vec();
            let mut middle = middle_lines.concat();
            let mut suffix = lines[end..].concat();
            if !prefix.is_empty() && !prefix.ends_with('\n') {
                prefix.push('\n');
            }
            if !middle.ends_with('\n') {
                middle.push('\n');
            }
            if !suffix.is_empty() && !suffix.starts_with('\n') {
                suffix.insert(0, '\n');
            }
            (prefix, middle, suffix)
        }
    };

    let min_words = match span.locator {
        SpanLocator::Line { .. } => MIN_MIDDLE_WORDS_LINE_SPAN,
        _ => span.kind.min_middle_words(),
    };
    if middle.trim().is_empty() || word_count(&middle) < min_words {
        return None;
    }

    let middle_line_count = middle.lines().count().max(1);

    Some(FIMExample {
        filepath: filepath.to_owned(),
        span_kind: span.kind,
        span_name: span.name.clone().unwrap_or_default(),
        prefix,
        middle,
        suffix,
        cross_file_context: String::new(),
        middle_lines: middle_line_count,
        total_lines,
        complexity_score,
        skip_quality_filters: span.skip_quality_filters.clone(),
        locator_kind: span.locator,
    })
}

/// Assigns the best-fitting cross-file context string and enforces the
/// total-char budget, truncating prefix/suffix from their outer edges if
/// needed. Returns `false` (example should be dropped) if it still doesn't
/// fit after truncation.
pub fn apply_context_and_budget(example: &mut FIMExample, combined_context: &str, dependency_only_context: &str, max_total_chars: usize) -> bool {
    let fits_combined = example.prefix.len() + example.middle.len() + example.suffix.len() + combined_context.len() <= max_total_chars;
    example.cross_file_context = if fits_combined { combined_context.to_string() } else { dependency_only_context.to_string() };

    let total = example.prefix.len() + example.middle.len() + example.suffix.len() + example.cross_file_context.len();
    if total <= max_total_chars {
        return true;
    }

    match example.locator_kind {
        SpanLocator::Line { .. } => {
            truncate_lines_from_left(&mut example.prefix, LINE_SPAN_SIDE_CAP);
            truncate_lines_from_right(&mut example.suffix, LINE_SPAN_SIDE_CAP);
        }
        _ => {
            let cap = max_total_chars / 3;
            truncate_chars_from_left(&mut example.prefix, cap);
            truncate_chars_from_right(&mut example.suffix, cap);
        }
    }

    let total = example.prefix.len() + example.middle.len() + example.suffix.len() + example.cross_file_context.len();
    total <= max_total_chars
}

fn truncate_chars_from_left(text: &mut String, cap: usize) {
    let char_count = text.chars().count();
    if char_count > cap {
        let skip = char_count - cap;
        *text = text.chars().skip(skip).collect();
    }
}

fn truncate_chars_from_right(text: &mut String, cap: usize) {
    let char_count = text.chars().count();
    if char_count > cap {
        *text = text.chars().take(cap).collect();
    }
}

fn truncate_lines_from_left(text: &mut String, cap: usize) {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    if lines.len() > cap {
        *text = lines[lines.len() - cap..].concat();
    }
}

fn truncate_lines_from_right(text: &mut String, cap: usize) {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    if lines.len() > cap {
        *text = lines[..cap].concat();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::SpanKind;

    #[test]
    fn byte_span_reconstructs_the_source_exactly() {
        let src = "fn main() {\n    let x = compute();\n    println!(\"{x}\");\n}\n";
        let span = CodeSpan::new(SpanKind::AstSingleNode, SpanLocator::Byte { start: 16, end: 34 });
        let ex = assemble_example(src, Utf8Path::new("a.rs"), &span, 4, 1.0, 30).unwrap();
        assert_eq!(format!("{}{}{}", ex.prefix, ex.middle, ex.suffix), src);
    }

    #[test]
    fn rejects_a_too_short_middle() {
        let src = "fn f() { x }\n";
        let span = CodeSpan::new(SpanKind::AstSingleNode, SpanLocator::Byte { start: 9, end: 10 });
        assert!(assemble_example(src, Utf8Path::new("a.rs"), &span, 1, 0.0, 30).is_none());
    }

    #[test]
    fn char_span_reconstructs_multibyte_source_exactly() {
        let src = "// résumé\nfn café() -> i32 { 1 }\n";
        let span = CodeSpan::new(SpanKind::DevDocComment, SpanLocator::Char { start: 3, end: 9 }).skipping([QualityRule::CommentOnly]);
        let ex = assemble_example(src, Utf8Path::new("a.rs"), &span, 2, 0.0, 30).unwrap();
        assert_eq!(format!("{}{}{}", ex.prefix, ex.middle, ex.suffix), src);
    }
}
