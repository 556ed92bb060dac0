//! Fatal, config-time error types. Everything else flows through
//! `anyhow::Result` with `.context(...)` at the call site, matching the
//! rest of the crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LangError {
    #[error("unknown language: {0:?} (registered: {1:?})")]
    UnknownLanguage(String, Vec<String>),

    #[error("unknown base model: {0:?} (expected one of qwen2.5-coder, granite-code, codellama, starcoder)")]
    UnknownBaseModel(String),
}
