//! Shared span data model (spec §3, §9's tagged-union note).

pub mod ast;
pub mod charlevel;
pub mod devbehavior;
pub mod regex_fallback;

use std::collections::HashSet;

/// Which family of generator produced a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanKind {
    AstSingleNode,
    AstAlignedSpan,
    DevIncompleteLine,
    DevBracketContent,
    DevPostComment,
    DevDocComment,
    CharRandom,
    RegexFunctionBody,
    RegexExpression,
    RegexBlock,
    RegexLines,
}

impl SpanKind {
    /// The string written to `span_kind` in emitted JSONL records, matching
    /// spec.md §3's kind vocabulary exactly.
    pub fn as_str(self) -> &'static str {
        match self {
            SpanKind::AstSingleNode => "ast_single_node",
            SpanKind::AstAlignedSpan => "ast_aligned_span",
            SpanKind::DevIncompleteLine => "dev_incomplete_line",
            SpanKind::DevBracketContent => "dev_bracket_content",
            SpanKind::DevPostComment => "dev_post_comment",
            SpanKind::DevDocComment => "dev_doc_comment",
            SpanKind::CharRandom => "char_random",
            SpanKind::RegexFunctionBody => "function_body",
            SpanKind::RegexExpression => "expression",
            SpanKind::RegexBlock => "block",
            SpanKind::RegexLines => "lines",
        }
    }

    /// Rebalancer category (spec.md §4.J): `ast`, `dev`, or `char`.
    pub fn category(self) -> &'static str {
        match self {
            SpanKind::AstSingleNode | SpanKind::AstAlignedSpan => "ast",
            SpanKind::DevIncompleteLine | SpanKind::DevBracketContent | SpanKind::DevPostComment | SpanKind::DevDocComment => "dev",
            SpanKind::CharRandom
            | SpanKind::RegexFunctionBody
            | SpanKind::RegexExpression
            | SpanKind::RegexBlock
            | SpanKind::RegexLines => "char",
        }
    }

    /// Minimum middle word count (spec.md §4.H): 1 for dev_* kinds, 3 otherwise.
    pub fn min_middle_words(self) -> usize {
        match self.category() {
            "dev" => 1,
            _ => 3,
        }
    }
}

/// One of the six quality rules (spec.md §4.I), used for per-span opt-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualityRule {
    MinLength,
    Import,
    Repetition,
    Entropy,
    CommentOnly,
    LengthRatio,
}

/// Tagged-union span locator (spec.md §9) — replaces sentinel `-1` fields
/// with a statically-enforced byte/line/char distinction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanLocator {
    Byte { start: usize, end: usize },
    Line { start: usize, end: usize },
    Char { start: usize, end: usize },
}

/// A candidate masked region of one source file (spec.md §3).
#[derive(Debug, Clone)]
pub struct CodeSpan {
    pub kind: SpanKind,
    pub locator: SpanLocator,
    pub name: Option<String>,
    pub skip_quality_filters: HashSet<QualityRule>,
}

impl CodeSpan {
    pub fn new(kind: SpanKind, locator: SpanLocator) -> Self {
        Self { kind, locator, name: None, skip_quality_filters: HashSet::new() }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn skipping(mut self, rules: impl IntoIterator<Item = QualityRule>) -> Self {
        self.skip_quality_filters.extend(rules);
        self
    }
}
