//! Pipeline orchestrator (ambient component K), tying File Discovery through
//! Rebalancing together. Grounded on
//! `original_source/python/generate/_cli.py::generate_fim_examples` /
//! `generate_all_examples` / `write_output`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, warn};

use crate::assemble::{apply_context_and_budget, assemble_example, FIMExample};
use crate::cli::{AppContext, GenerateArgs};
use crate::context::bm25::{retrieve_bm25_context, BM25Index};
use crate::context::crossfile::build_cross_file_context;
use crate::discovery::discover_files;
use crate::fim_format::{format_psm, BaseModel};
use crate::infra::io::read_file_smart;
use crate::lang::{LanguageConfig, LanguageRegistry};
use crate::quality::{compute_complexity_score, filter_low_quality_examples};
use crate::rebalance::{apply_curriculum, rebalance};
use crate::span::{ast, charlevel, devbehavior, regex_fallback, SpanKind};

const BM25_QUERY_CHARS: usize = 2000;

/// One JSONL record of the emitted dataset, per spec.md §6.
#[derive(Serialize)]
struct OutputRecord<'a> {
    text: String,
    prefix: &'a str,
    middle: &'a str,
    suffix: &'a str,
    filepath: &'a str,
    span_kind: &'static str,
    span_name: &'a str,
    middle_lines: usize,
    complexity_score: f64,
}

pub fn run_generate(args: GenerateArgs, ctx: &AppContext) -> Result<()> {
    let registry = LanguageRegistry::with_defaults();
    let lang = registry.get(&args.language)?;
    let base_model = BaseModel::parse(args.base_model.as_str())?;

    let discovered = discover_files(&args.project_root, lang, args.tested_only);
    let mut source_files = discovered.source_files;
    if !args.include_path.is_empty() {
        source_files.retain(|f| args.include_path.iter().any(|p| f.starts_with(&args.project_root.join(p))));
    }
    if source_files.is_empty() {
        warn!("no source files discovered under {}", args.project_root.display());
    }

    let bm25_index = if args.bm25_context { BM25Index::build(&source_files, &args.project_root) } else { None };

    let progress = if ctx.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(source_files.len() as u64);
        pb.set_style(ProgressStyle::with_template("{bar:40} {pos}/{len} files").unwrap());
        pb
    };

    let mut all_examples = Vec::new();
    for (index, filepath) in source_files.iter().enumerate() {
        progress.inc(1);
        let mut rng = ChaCha8Rng::seed_from_u64(args.seed.wrapping_add(index as u64));

        match process_file(filepath, &args.project_root, lang, &source_files, bm25_index.as_ref(), &args, &mut rng) {
            Ok(mut examples) => all_examples.append(&mut examples),
            Err(err) => debug!(file = %filepath.display(), error = %err, "skipping file"),
        }
    }
    progress.finish_and_clear();

    let (kept, rejected_by_kind) = if args.quality_filter {
        let outcome = filter_low_quality_examples(all_examples);
        (outcome.kept, outcome.rejected_by_kind)
    } else {
        (all_examples, IndexMap::new())
    };

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut examples = rebalance(kept, &mut rng);
    if args.curriculum {
        examples = apply_curriculum(examples, args.curriculum_top_pct);
    }

    if let Some(n) = args.preview {
        for ex in examples.iter().take(n) {
            let text = format_psm(base_model, &ex.cross_file_context, &ex.prefix, &ex.suffix, &ex.middle);
            println!("--- {} [{}] complexity={:.2} ---", ex.filepath, ex.span_kind.as_str(), ex.complexity_score);
            println!("{text}\n");
        }
        return Ok(());
    }

    write_output(&args, base_model, examples, rejected_by_kind)
}

#[allow(clippy::too_many_arguments)]
fn process_file(filepath: &Path, root: &Path, lang: &LanguageConfig, all_files: &[PathBuf], bm25_index: Option<&BM25Index>, args: &GenerateArgs, rng: &mut ChaCha8Rng) -> Result<Vec<FIMExample>> {
    let content = read_file_smart(filepath).with_context(|| format!("reading {}", filepath.display()))?;
    let source: &str = content.as_ref();

    let rel_path = filepath.strip_prefix(root).unwrap_or(filepath);
    let rel_utf8 = Utf8Path::from_path(rel_path).map(|p| p.to_owned()).unwrap_or_else(|| Utf8PathBuf::from(rel_path.to_string_lossy().into_owned()));

    let total_lines = source.lines().count().max(1);
    let complexity_score = compute_complexity_score(source, lang);

    let mut spans = Vec::new();
    if args.ast_fim_enabled() && lang.ts_language.is_some() {
        spans.extend(ast::generate_ast_spans(source, lang, args.max_middle_lines, rng));
    } else {
        spans.extend(regex_fallback::generate_regex_spans(source, lang, rng));
    }
    spans.extend(devbehavior::generate_incomplete_line_spans(source, lang, rng));
    spans.extend(devbehavior::generate_bracket_content_spans(source, lang, rng));
    spans.extend(devbehavior::generate_post_comment_spans(source, lang));
    spans.extend(devbehavior::generate_doc_comment_spans(source, lang, rng));
    spans.extend(charlevel::generate_char_spans(source, rng));

    let dependency_ctx = if args.cross_file_context {
        build_cross_file_context(filepath, all_files, source, 1024, lang, false).value
    } else {
        String::new()
    };
    let bm25_ctx = match bm25_index {
        Some(index) => {
            let query: String = source.chars().take(BM25_QUERY_CHARS).collect();
            retrieve_bm25_context(&query, "", index, &rel_utf8.to_string(), 1024, 5, false).value
        }
        None => String::new(),
    };
    let combined_ctx = format!("{dependency_ctx}{bm25_ctx}");

    let mut examples = Vec::new();
    for span in &spans {
        if let Some(mut ex) = assemble_example(source, &rel_utf8, span, total_lines, complexity_score, args.max_middle_lines) {
            if apply_context_and_budget(&mut ex, &combined_ctx, &dependency_ctx, args.max_total_chars) {
                examples.push(ex);
            }
        }
    }
    Ok(examples)
}

fn write_output(args: &GenerateArgs, base_model: BaseModel, examples: Vec<FIMExample>, rejected_by_kind: IndexMap<SpanKind, usize>) -> Result<()> {
    std::fs::create_dir_all(&args.output).context("creating output directory")?;

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed.wrapping_add(0xA5));
    let mut indices: Vec<usize> = (0..examples.len()).collect();
    use rand::seq::SliceRandom;
    indices.shuffle(&mut rng);
    let val_count = ((examples.len() as f64) * args.val_split).round() as usize;
    let (val_idx, train_idx) = indices.split_at(val_count.min(indices.len()));

    let train_path = args.output.join("train.jsonl");
    let val_path = args.output.join("val.jsonl");
    write_jsonl(&train_path, train_idx.iter().map(|&i| &examples[i]), base_model)?;
    write_jsonl(&val_path, val_idx.iter().map(|&i| &examples[i]), base_model)?;

    let mut histogram: IndexMap<&'static str, usize> = IndexMap::new();
    for ex in &examples {
        *histogram.entry(ex.span_kind.as_str()).or_insert(0) += 1;
    }
    let complexity_scores: Vec<f64> = examples.iter().map(|e| e.complexity_score).filter(|&s| s > 0.0).collect();
    let complexity_stats = if complexity_scores.is_empty() {
        serde_json::json!({"min": 0, "max": 0, "mean": 0})
    } else {
        let min = complexity_scores.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = complexity_scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let mean = complexity_scores.iter().sum::<f64>() / complexity_scores.len() as f64;
        serde_json::json!({"min": min, "max": max, "mean": mean})
    };

    let rejected_histogram: IndexMap<&'static str, usize> = rejected_by_kind.into_iter().map(|(k, v)| (k.as_str(), v)).collect();

    let metadata = serde_json::json!({
        "project_root": args.project_root,
        "language": args.language,
        "base_model": args.base_model.as_str(),
        "seed": args.seed,
        "total_examples": examples.len(),
        "train_count": train_idx.len(),
        "val_count": val_idx.len(),
        "span_kind_histogram": histogram,
        "rejected_by_kind": rejected_histogram,
        "complexity_score_stats": complexity_stats,
    });
    std::fs::write(args.output.join("metadata.json"), serde_json::to_string_pretty(&metadata)?).context("writing metadata.json")?;

    Ok(())
}

fn write_jsonl<'a>(path: &Path, examples: impl Iterator<Item = &'a FIMExample>, base_model: BaseModel) -> Result<()> {
    use std::io::Write;
    let mut writer = std::io::BufWriter::new(std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?);
    for ex in examples {
        let text = format_psm(base_model, &ex.cross_file_context, &ex.prefix, &ex.suffix, &ex.middle);
        let record = OutputRecord {
            text,
            prefix: &ex.prefix,
            middle: &ex.middle,
            suffix: &ex.suffix,
            filepath: ex.filepath.as_str(),
            span_kind: ex.span_kind.as_str(),
            span_name: &ex.span_name,
            middle_lines: ex.middle_lines,
            complexity_score: ex.complexity_score,
        };
        writeln!(writer, "{}", serde_json::to_string(&record)?)?;
    }
    Ok(())
}
