//! Developer-Behavior Span Generator (component D): four sub-generators
//! that imitate real IDE completion moments, per spec.md §4.D. Grounded on
//! `original_source/python/generate/_spans_devbehavior.py`.

use std::collections::HashSet;

use rand::Rng;
use tree_sitter::{Node, Parser, Tree};

use crate::lang::LanguageConfig;

use super::{CodeSpan, QualityRule, SpanKind, SpanLocator};

fn target_count(line_count: usize, denom: usize) -> usize {
    line_count.div_ceil(denom).max(1)
}

fn byte_to_char(source: &str, byte_offset: usize) -> usize {
    source.get(..byte_offset).map(|s| s.chars().count()).unwrap_or(0)
}

fn parse_tree(source: &str, lang: &LanguageConfig) -> Option<Tree> {
    let ts_lang = lang.ts_language.as_ref()?;
    let mut parser = Parser::new();
    parser.set_language(ts_lang).ok()?;
    parser.parse(source, None)
}

fn deepest_containing<'a>(node: Node<'a>, byte: usize) -> Node<'a> {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.start_byte() <= byte && byte < child.end_byte() {
            return deepest_containing(child, byte);
        }
    }
    node
}

/// Incomplete-line generator: random intra-line cuts plus trigger-token cuts.
pub fn generate_incomplete_line_spans(source: &str, lang: &LanguageConfig, rng: &mut impl Rng) -> Vec<CodeSpan> {
    let lines: Vec<&str> = source.split_inclusive('\n').collect();
    let line_count = lines.len().max(1);
    let target = target_count(line_count, 30);

    let mut line_starts = Vec::with_capacity(lines.len());
    let mut offset = 0usize;
    for l in &lines {
        line_starts.push(offset);
        offset += l.len();
    }

    let mut out = Vec::new();
    out.extend(random_intra_line_spans(&lines, &line_starts, target, rng));

    let tree = parse_tree(source, lang);
    out.extend(trigger_driven_spans(&lines, &line_starts, lang, tree.as_ref(), target, rng));
    out
}

fn random_intra_line_spans(lines: &[&str], line_starts: &[usize], target: usize, rng: &mut impl Rng) -> Vec<CodeSpan> {
    let candidate_idxs: Vec<usize> = (0..lines.len())
        .filter(|&i| {
            let trimmed = lines[i].trim();
            !trimmed.is_empty() && !trimmed.starts_with("//") && !trimmed.starts_with('#') && trimmed.len() >= 10
        })
        .collect();
    if candidate_idxs.is_empty() {
        return Vec::new();
    }

    let mut chosen = candidate_idxs;
    shuffle(&mut chosen, rng);
    chosen.truncate(target);

    let mut out = Vec::new();
    for idx in chosen {
        let line = lines[idx];
        let trimmed_start = line.len() - line.trim_start().len();
        let trimmed = line.trim_end_matches(['\n', '\r']);
        let trimmed_len = trimmed.len() - trimmed_start;
        if trimmed_len < 4 {
            continue;
        }
        let cut_in_trimmed = rng.random_range(3..trimmed_len.max(4) - 1 + 1).min(trimmed_len - 1);
        let mut cut = trimmed_start + cut_in_trimmed;
        while cut > trimmed_start && !trimmed.is_char_boundary(cut) {
            cut -= 1;
        }
        let abs_cut = line_starts[idx] + cut;
        let abs_end = line_starts[idx] + trimmed.len();
        if abs_end <= abs_cut || abs_end - abs_cut < 3 {
            continue;
        }
        out.push(CodeSpan::new(SpanKind::DevIncompleteLine, SpanLocator::Byte { start: abs_cut, end: abs_end }));
    }
    out
}

fn trigger_driven_spans(
    lines: &[&str],
    line_starts: &[usize],
    lang: &LanguageConfig,
    tree: Option<&Tree>,
    target: usize,
    rng: &mut impl Rng,
) -> Vec<CodeSpan> {
    let mut candidates = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        let Some((tok_pos, tok_len)) = lang
            .trigger_tokens
            .iter()
            .filter_map(|tok| line.find(tok).map(|p| (p, tok.len())))
            .min_by_key(|&(p, _)| p)
        else {
            continue;
        };
        candidates.push((idx, tok_pos + tok_len));
    }
    shuffle(&mut candidates, rng);
    candidates.truncate(target);

    let mut out = Vec::new();
    for (idx, cut_in_line) in candidates {
        let line = lines[idx];
        let abs_cut = line_starts[idx] + cut_in_line;
        let line_end = line_starts[idx] + line.trim_end_matches(['\n', '\r']).len();
        let end = if let Some(tree) = tree {
            let node = deepest_containing(tree.root_node(), abs_cut);
            node.end_byte().max(abs_cut).max(line_end)
        } else {
            line_end
        };
        if end <= abs_cut {
            continue;
        }
        out.push(CodeSpan::new(SpanKind::DevIncompleteLine, SpanLocator::Byte { start: abs_cut, end }));
    }
    out
}

/// Bracket-content generator: interiors of `ast_bracket_types` nodes.
pub fn generate_bracket_content_spans(source: &str, lang: &LanguageConfig, rng: &mut impl Rng) -> Vec<CodeSpan> {
    let Some(tree) = parse_tree(source, lang) else {
        return Vec::new();
    };
    let line_count = source.lines().count().max(1);
    let target = target_count(line_count, 60);

    let mut candidates = Vec::new();
    collect_bracket_nodes(tree.root_node(), lang, &mut candidates);
    shuffle(&mut candidates, rng);
    candidates.truncate(target);

    candidates
        .into_iter()
        .filter_map(|node| {
            let mut cursor = node.walk();
            let children: Vec<Node> = node.children(&mut cursor).collect();
            let first = children.first()?;
            let last = children.last()?;
            let start = first.end_byte();
            let end = last.start_byte();
            if end <= start {
                return None;
            }
            Some(CodeSpan::new(SpanKind::DevBracketContent, SpanLocator::Byte { start, end }))
        })
        .collect()
}

fn collect_bracket_nodes<'a>(node: Node<'a>, lang: &LanguageConfig, out: &mut Vec<Node<'a>>) {
    if lang.ast_bracket_types.contains(node.kind()) {
        let width = node.end_byte() - node.start_byte();
        if node.child_count() >= 2 && width > 3 && width < 2000 {
            out.push(node);
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_bracket_nodes(child, lang, out);
    }
}

/// Post-comment generator: statement immediately following a line/block comment.
pub fn generate_post_comment_spans(source: &str, lang: &LanguageConfig) -> Vec<CodeSpan> {
    let Some(tree) = parse_tree(source, lang) else {
        return Vec::new();
    };
    let bytes = source.as_bytes();
    let mut out = Vec::new();
    collect_post_comment(tree.root_node(), bytes, &mut out);
    out
}

fn collect_post_comment(node: Node, bytes: &[u8], out: &mut Vec<CodeSpan>) {
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    for i in 0..children.len() {
        let child = children[i];
        if child.kind().contains("comment") {
            let text = child.utf8_text(bytes).unwrap_or("");
            if text.starts_with("//") || text.starts_with("/*") {
                if let Some(next) = children.get(i + 1) {
                    if !next.kind().contains("comment") && (next.end_byte() - next.start_byte()) > 5 {
                        out.push(CodeSpan::new(SpanKind::DevPostComment, SpanLocator::Byte { start: next.start_byte(), end: next.end_byte() }));
                    }
                }
            }
        }
    }
    for child in children {
        collect_post_comment(child, bytes, out);
    }
}

/// Doc-comment generator: new-doc (Case A) and update-doc (Case B) spans
/// preceding a function-type node. Offsets are stored as **char** offsets
/// because the assembler indexes these against the decoded string.
pub fn generate_doc_comment_spans(source: &str, lang: &LanguageConfig, rng: &mut impl Rng) -> Vec<CodeSpan> {
    let Some(tree) = parse_tree(source, lang) else {
        return Vec::new();
    };
    let bytes = source.as_bytes();
    let mut out = Vec::new();
    collect_doc_comments(tree.root_node(), bytes, lang, &lang.ast_function_types, rng, &mut out, source);
    out
}

#[allow(clippy::too_many_arguments)]
fn collect_doc_comments(
    node: Node,
    bytes: &[u8],
    lang: &LanguageConfig,
    function_types: &HashSet<&str>,
    rng: &mut impl Rng,
    out: &mut Vec<CodeSpan>,
    source: &str,
) {
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    for i in 0..children.len() {
        let child = children[i];
        if !child.kind().contains("comment") {
            continue;
        }
        let text = child.utf8_text(bytes).unwrap_or("");
        let is_doc = lang.doc_comment_openers.iter().any(|op| text.starts_with(op));
        if !is_doc {
            continue;
        }
        let Some(next) = children.get(i + 1) else { continue };
        if !function_types.contains(next.kind()) {
            continue;
        }

        let comment_start = child.start_byte();
        let comment_end = child.end_byte();
        let comment_lines: Vec<&str> = text.split('\n').collect();

        let mut start_byte = comment_start + comment_lines.first().map(|l| l.len() + 1).unwrap_or(0);
        start_byte = start_byte.min(comment_end);

        let tag_lines: Vec<usize> = (1..comment_lines.len()).filter(|&idx| comment_lines[idx].contains('@')).collect();
        if !tag_lines.is_empty() && rng.random_bool(0.4) {
            let chosen = tag_lines[rng.random_range(0..tag_lines.len())];
            let prefix_len: usize = comment_lines[..chosen].iter().map(|l| l.len() + 1).sum();
            start_byte = (comment_start + prefix_len).min(comment_end);
        }

        if start_byte < comment_end {
            let start_char = byte_to_char(source, start_byte);
            let end_char = byte_to_char(source, comment_end);
            if end_char > start_char {
                out.push(
                    CodeSpan::new(SpanKind::DevDocComment, SpanLocator::Char { start: start_char, end: end_char })
                        .skipping([QualityRule::CommentOnly]),
                );
            }
        }
    }
    for child in children {
        collect_doc_comments(child, bytes, lang, function_types, rng, out, source);
    }
}

fn shuffle<T>(items: &mut [T], rng: &mut impl Rng) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::LanguageRegistry;
    use rand::SeedableRng;

    fn rng() -> rand_chacha::ChaCha8Rng {
        rand_chacha::ChaCha8Rng::seed_from_u64(1)
    }

    #[test]
    fn bracket_content_extracts_interior_only() {
        let registry = LanguageRegistry::with_defaults();
        let rust = registry.get("rust").unwrap();
        let src = "fn f(aaa: i32, bbb: i32) -> i32 { aaa + bbb }\n";
        let spans = generate_bracket_content_spans(src, rust, &mut rng());
        assert!(spans.iter().any(|s| matches!(s.locator, SpanLocator::Byte { start, end } if &src[start..end] == "aaa: i32, bbb: i32")));
    }

    #[test]
    fn doc_comment_spans_are_char_located_and_skip_comment_only() {
        let registry = LanguageRegistry::with_defaults();
        let rust = registry.get("rust").unwrap();
        let src = "/// Computes the résumé score.\npub fn résumé() -> i32 { 1 }\n";
        let spans = generate_doc_comment_spans(src, rust, &mut rng());
        assert!(!spans.is_empty());
        for s in &spans {
            assert!(matches!(s.locator, SpanLocator::Char { .. }));
            assert!(s.skip_quality_filters.contains(&QualityRule::CommentOnly));
        }
    }
}
