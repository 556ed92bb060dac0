//! BM25 Index & Retrieval (component G), hand-rolled Okapi BM25 — grounded
//! on `original_source/python/fim/bm25.py`. No BM25 crate exists in the
//! teacher's or pack's dependency stack, so this is genuine core logic
//! rather than a thin wrapper, per SPEC_FULL.md §4.G.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde_json::json;

use super::Outcome;

const K1: f64 = 1.5;
const B: f64 = 0.75;
const EPSILON: f64 = 0.25;
const MIN_CHUNK_LEN: usize = 20;
const MAX_CHUNK_LINES: usize = 20;

fn token_splitter() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9_]+").unwrap())
}

/// Lowercased, non-alphanumeric-split tokens longer than one character.
pub fn tokenize_code(text: &str) -> Vec<String> {
    token_splitter().split(text).filter(|t| t.len() > 1).map(|t| t.to_lowercase()).collect()
}

pub struct BM25Index {
    chunks: Vec<String>,
    chunk_files: Vec<String>,
    doc_freqs: Vec<HashMap<String, usize>>,
    doc_len: Vec<usize>,
    avgdl: f64,
    idf: HashMap<String, f64>,
}

impl BM25Index {
    /// Chunk every file in `all_files` on blank lines (cap 20 lines/chunk,
    /// drop chunks <20 chars after trim), then build an Okapi BM25 index.
    pub fn build(all_files: &[PathBuf], root: &Path) -> Option<Self> {
        let mut chunks = Vec::new();
        let mut chunk_files = Vec::new();

        for filepath in all_files {
            let Ok(source) = std::fs::read_to_string(filepath) else { continue };
            let rel_path = filepath.strip_prefix(root).unwrap_or(filepath).to_string_lossy().to_string();

            let mut current: Vec<&str> = Vec::new();
            let flush = |current: &mut Vec<&str>, chunks: &mut Vec<String>, chunk_files: &mut Vec<String>| {
                if current.is_empty() {
                    return;
                }
                let text = current.join("\n");
                if text.trim().len() > MIN_CHUNK_LEN {
                    chunks.push(text);
                    chunk_files.push(rel_path.clone());
                }
                current.clear();
            };

            for line in source.split('\n') {
                if line.trim().is_empty() && !current.is_empty() {
                    flush(&mut current, &mut chunks, &mut chunk_files);
                } else {
                    current.push(line);
                    if current.len() >= MAX_CHUNK_LINES {
                        flush(&mut current, &mut chunks, &mut chunk_files);
                    }
                }
            }
            flush(&mut current, &mut chunks, &mut chunk_files);
        }

        if chunks.is_empty() {
            return None;
        }

        let tokenized: Vec<Vec<String>> = chunks.iter().map(|c| tokenize_code(c)).collect();
        Some(Self::from_tokenized(chunks, chunk_files, tokenized))
    }

    fn from_tokenized(chunks: Vec<String>, chunk_files: Vec<String>, tokenized: Vec<Vec<String>>) -> Self {
        let corpus_size = tokenized.len();
        let doc_len: Vec<usize> = tokenized.iter().map(|d| d.len()).collect();
        let avgdl = doc_len.iter().sum::<usize>() as f64 / corpus_size.max(1) as f64;

        let mut doc_freqs = Vec::with_capacity(corpus_size);
        let mut doc_containing: HashMap<String, usize> = HashMap::new();
        for doc in &tokenized {
            let mut freq: HashMap<String, usize> = HashMap::new();
            for term in doc {
                *freq.entry(term.clone()).or_insert(0) += 1;
            }
            for term in freq.keys() {
                *doc_containing.entry(term.clone()).or_insert(0) += 1;
            }
            doc_freqs.push(freq);
        }

        let mut idf = HashMap::with_capacity(doc_containing.len());
        let mut idf_sum = 0.0;
        let mut negative = Vec::new();
        for (term, n) in &doc_containing {
            let val = ((corpus_size as f64 - *n as f64 + 0.5) / (*n as f64 + 0.5) + 1.0).ln();
            idf.insert(term.clone(), val);
            idf_sum += val;
            if val < 0.0 {
                negative.push(term.clone());
            }
        }
        let average_idf = if idf.is_empty() { 0.0 } else { idf_sum / idf.len() as f64 };
        let eps = EPSILON * average_idf;
        for term in negative {
            idf.insert(term, eps);
        }

        Self { chunks, chunk_files, doc_freqs, doc_len, avgdl, idf }
    }

    fn get_scores(&self, query: &[String]) -> Vec<f64> {
        let mut scores = vec![0.0; self.doc_freqs.len()];
        for q in query {
            let Some(&term_idf) = self.idf.get(q) else { continue };
            for (i, freq_map) in self.doc_freqs.iter().enumerate() {
                let freq = *freq_map.get(q).unwrap_or(&0) as f64;
                let doc_len = self.doc_len[i] as f64;
                let denom = freq + K1 * (1.0 - B + B * doc_len / self.avgdl.max(1e-9));
                if denom > 0.0 {
                    scores[i] += term_idf * (freq * (K1 + 1.0)) / denom;
                }
            }
        }
        scores
    }
}

/// Query = span text + surrounding lines. Excludes chunks from `filepath`'s
/// own file, deduplicates by file (best chunk per file), concatenates up to
/// `max_tokens * 4` chars.
pub fn retrieve_bm25_context(span_text: &str, adjacent_context: &str, index: &BM25Index, filepath: &str, max_tokens: usize, top_k: usize, debug: bool) -> Outcome<String> {
    let query = tokenize_code(&format!("{span_text} {adjacent_context}"));
    let char_budget = max_tokens * 4;
    if query.is_empty() {
        return if debug {
            Outcome::with_debug(String::new(), json!({"query_tokens": [], "scored_chunks": [], "budget": {"used_chars": 0, "max_chars": char_budget}}))
        } else {
            Outcome::plain(String::new())
        };
    }

    let scores = index.get_scores(&query);
    let mut scored: Vec<(usize, f64)> = scores
        .iter()
        .enumerate()
        .filter(|&(i, &s)| index.chunk_files[i] != filepath && s > 0.0)
        .map(|(i, &s)| (i, s))
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());

    let mut seen_files = std::collections::HashSet::new();
    let mut selected = Vec::new();
    for &(i, score) in scored.iter().take(top_k * 2) {
        let f = &index.chunk_files[i];
        if seen_files.contains(f) {
            continue;
        }
        seen_files.insert(f.clone());
        selected.push((i, score));
        if selected.len() >= top_k {
            break;
        }
    }

    if selected.is_empty() {
        return if debug {
            Outcome::with_debug(String::new(), json!({"query_tokens": query, "scored_chunks": [], "budget": {"used_chars": 0, "max_chars": char_budget}}))
        } else {
            Outcome::plain(String::new())
        };
    }

    let mut parts = Vec::new();
    let mut total = 0usize;
    let mut chunk_details = Vec::new();
    for (i, score) in selected {
        let chunk = format!("// --- {} ---\n{}", index.chunk_files[i], index.chunks[i]);
        if total + chunk.len() > char_budget {
            if debug {
                chunk_details.push(json!({"file": index.chunk_files[i], "score": (score * 100.0).round() / 100.0, "selected": false, "length": chunk.len()}));
            }
            break;
        }
        total += chunk.len();
        if debug {
            chunk_details.push(json!({"file": index.chunk_files[i], "score": (score * 100.0).round() / 100.0, "selected": true, "length": chunk.len()}));
        }
        parts.push(chunk);
    }

    if parts.is_empty() {
        return if debug {
            Outcome::with_debug(String::new(), json!({"query_tokens": query, "scored_chunks": chunk_details, "budget": {"used_chars": 0, "max_chars": char_budget}}))
        } else {
            Outcome::plain(String::new())
        };
    }

    let result = format!("{}\n\n", parts.join("\n\n"));
    if debug {
        Outcome::with_debug(result, json!({"query_tokens": query, "scored_chunks": chunk_details, "budget": {"used_chars": total, "max_chars": char_budget}}))
    } else {
        Outcome::plain(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn indexes_and_retrieves_the_matching_chunk() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.rs"), "fn compute_widget_total(items: &[Widget]) -> i32 {\n    items.iter().map(|w| w.price).sum()\n}\n").unwrap();
        fs::write(dir.path().join("b.rs"), "struct Unrelated;\nimpl Unrelated {\n    fn noop(&self) {}\n}\n").unwrap();

        let files = vec![dir.path().join("a.rs"), dir.path().join("b.rs")];
        let index = BM25Index::build(&files, dir.path()).expect("non-empty corpus");

        let outcome = retrieve_bm25_context("compute_widget_total", "", &index, "b.rs", 1024, 5, false);
        assert!(outcome.value.contains("compute_widget_total"));
        assert!(!outcome.value.contains("b.rs"));
    }

    #[test]
    fn empty_query_yields_empty_context() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.rs"), "fn f() { let x = 1; println!(\"{}\", x); }\n").unwrap();
        let files = vec![dir.path().join("a.rs")];
        let index = BM25Index::build(&files, dir.path()).unwrap();
        let outcome = retrieve_bm25_context("!!!", "", &index, "other.rs", 1024, 5, false);
        assert_eq!(outcome.value, "");
    }
}
