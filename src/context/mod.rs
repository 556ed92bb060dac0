//! Cross-file context assembly (components F and G).

pub mod bm25;
pub mod crossfile;

/// Debug-duality wrapper (spec.md §9): the Python original overloads its
/// return type between `str` and `(str, dict)` depending on a `debug` flag.
/// Rust has no such overload, so both call sites always return an
/// `Outcome<String>`; `debug` is `Some` only when the caller asked for it.
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    pub value: T,
    pub debug: Option<serde_json::Value>,
}

impl<T> Outcome<T> {
    pub fn plain(value: T) -> Self {
        Self { value, debug: None }
    }

    pub fn with_debug(value: T, debug: serde_json::Value) -> Self {
        Self { value, debug: Some(debug) }
    }
}
