//! Char-Level Random Span Generator (component E): last-resort generator
//! producing uniformly random character windows, per spec.md §4.E. Grounded
//! on `original_source/python/generate/_spans_charlevel.py`.

use rand::Rng;

use super::{CodeSpan, SpanKind, SpanLocator};

const MIN_WIDTH_CHARS: usize = 10;
const MAX_WIDTH_CHARS: usize = 500;

/// Produces `⌈lines/100⌉` spans at uniformly random character offsets.
pub fn generate_char_spans(source: &str, rng: &mut impl Rng) -> Vec<CodeSpan> {
    let char_count = source.chars().count();
    if char_count < MIN_WIDTH_CHARS * 3 {
        return Vec::new();
    }

    let line_count = source.lines().count().max(1);
    let target = line_count.div_ceil(100).max(1);

    let max_width = MAX_WIDTH_CHARS.min(char_count / 2).max(MIN_WIDTH_CHARS);

    let mut out = Vec::with_capacity(target);
    for _ in 0..target {
        let width = rng.random_range(MIN_WIDTH_CHARS..=max_width);
        if char_count <= width + 1 {
            continue;
        }
        let start = rng.random_range(0..char_count - width);
        let end = start + width;
        out.push(CodeSpan::new(SpanKind::CharRandom, SpanLocator::Char { start, end }));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn produces_roughly_lines_over_100_spans() {
        let src = "x\n".repeat(350);
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(3);
        let spans = generate_char_spans(&src, &mut rng);
        assert_eq!(spans.len(), 4);
        for span in spans {
            if let SpanLocator::Char { start, end } = span.locator {
                assert!(end > start);
                assert!(end <= src.chars().count());
            }
        }
    }

    #[test]
    fn tiny_file_yields_no_spans() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(3);
        assert!(generate_char_spans("short", &mut rng).is_empty());
    }
}
