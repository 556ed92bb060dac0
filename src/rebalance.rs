//! Rebalancer & Curriculum (component J), grounded on spec.md §4.J and
//! `original_source/python/generate/_cli.py::apply_postprocessing`.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::assemble::FIMExample;

const TARGET_RATIOS: [(&str, f64); 3] = [("ast", 0.66), ("dev", 0.22), ("char", 0.12)];

/// Downsample-only rebalancing to the target category ratios. Categories
/// under target are kept in full; their shortfall is redistributed to
/// over-target categories in proportion to those categories' target ratios,
/// which are then downsampled uniformly at random without replacement.
pub fn rebalance(examples: Vec<FIMExample>, rng: &mut impl Rng) -> Vec<FIMExample> {
    let total = examples.len();
    if total == 0 {
        return examples;
    }

    let mut by_category: HashMap<&'static str, Vec<FIMExample>> = HashMap::new();
    for ex in examples {
        let cat = ex.span_kind.category();
        by_category.entry(cat).or_default().push(ex);
    }

    let raw_targets: HashMap<&str, usize> = TARGET_RATIOS.iter().map(|&(cat, r)| (cat, (total as f64 * r).floor() as usize)).collect();

    let mut shortfall = 0usize;
    let mut over_target: Vec<&str> = Vec::new();
    for &(cat, _) in &TARGET_RATIOS {
        let have = by_category.get(cat).map(|v| v.len()).unwrap_or(0);
        let target = raw_targets[cat];
        if have < target {
            shortfall += target - have;
        } else if have >= target {
            over_target.push(cat);
        }
    }

    let over_ratio_sum: f64 = TARGET_RATIOS.iter().filter(|(cat, _)| over_target.contains(cat)).map(|(_, r)| r).sum();

    let mut adjusted_targets = raw_targets.clone();
    if shortfall > 0 && over_ratio_sum > 0.0 {
        for &(cat, ratio) in &TARGET_RATIOS {
            if over_target.contains(&cat) {
                let bonus = (shortfall as f64 * (ratio / over_ratio_sum)).round() as usize;
                *adjusted_targets.get_mut(cat).unwrap() += bonus;
            }
        }
    }

    let mut out = Vec::with_capacity(total);
    for (cat, mut items) in by_category {
        let target = *adjusted_targets.get(cat).unwrap_or(&items.len());
        if items.len() > target {
            items.shuffle(rng);
            items.truncate(target);
        }
        out.extend(items);
    }
    out
}

/// Sorts by `complexity_score` descending, then (if `top_pct < 100`) keeps
/// only that leading fraction.
pub fn apply_curriculum(mut examples: Vec<FIMExample>, top_pct: u8) -> Vec<FIMExample> {
    examples.sort_by(|a, b| b.complexity_score.partial_cmp(&a.complexity_score).unwrap());
    if top_pct < 100 {
        let keep = (examples.len() as f64 * top_pct as f64 / 100.0).ceil() as usize;
        examples.truncate(keep);
    }
    examples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::{SpanKind, SpanLocator};
    use camino::Utf8PathBuf;
    use rand::SeedableRng;

    fn example(kind: SpanKind, complexity: f64) -> FIMExample {
        FIMExample {
            filepath: Utf8PathBuf::from("a.rs"),
            span_kind: kind,
            span_name: String::new(),
            prefix: String::new(),
            middle: "x".repeat(50),
            suffix: String::new(),
            cross_file_context: String::new(),
            middle_lines: 1,
            total_lines: 10,
            complexity_score: complexity,
            skip_quality_filters: Default::default(),
            locator_kind: SpanLocator::Byte { start: 0, end: 1 },
        }
    }

    #[test]
    fn downsamples_an_over_target_category() {
        let mut examples = Vec::new();
        for _ in 0..90 {
            examples.push(example(SpanKind::AstSingleNode, 1.0));
        }
        for _ in 0..5 {
            examples.push(example(SpanKind::DevIncompleteLine, 1.0));
        }
        for _ in 0..5 {
            examples.push(example(SpanKind::CharRandom, 1.0));
        }
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(1);
        let out = rebalance(examples, &mut rng);
        let ast_count = out.iter().filter(|e| e.span_kind.category() == "ast").count();
        assert!(ast_count < 90);
    }

    #[test]
    fn curriculum_keeps_only_the_top_fraction_by_complexity() {
        let examples = vec![example(SpanKind::AstSingleNode, 3.0), example(SpanKind::AstSingleNode, 1.0), example(SpanKind::AstSingleNode, 2.0), example(SpanKind::AstSingleNode, 0.5)];
        let out = apply_curriculum(examples, 50);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].complexity_score, 3.0);
    }
}
