//! **fimforge** - builds fill-in-the-middle training datasets from a source
//! tree for code-completion fine-tuning.
//!
//! Mines a repository for AST-aware, developer-behavior, and char-level
//! spans, assembles them into `⟨prefix, middle, suffix⟩` examples with
//! optional cross-file context, filters and rebalances the result, and
//! emits model-specific PSM-formatted JSONL.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Fatal, config-time error types
pub mod error;

/// Per-language configuration and tree-sitter/regex hooks
pub mod lang;

/// Gitignore-aware source file discovery
pub mod discovery;

/// Span generators: AST, developer-behavior, char-level, regex-fallback
pub mod span;

/// Cross-file context assembly: import-graph signatures and BM25 retrieval
pub mod context;

/// Turns a span into a materialized prefix/middle/suffix example
pub mod assemble;

/// Six-rule low-quality example rejection and complexity scoring
pub mod quality;

/// Category rebalancing and complexity-sorted curriculum ordering
pub mod rebalance;

/// Model-specific FIM special-token formatting (PSM ordering)
pub mod fim_format;

/// End-to-end orchestration: discovery through JSONL emission
pub mod pipeline;

/// Infrastructure - configuration, I/O, and utilities
pub mod infra {
    /// Configuration management with TOML support
    pub mod config;
    pub use config::{RunConfig, init as config_init, load_config};

    /// Memory-mapped file I/O for large files (>1MiB threshold)
    pub mod io;
    pub use io::{FileContent, read_file_smart};

    /// Gitignore-aware directory walking
    pub mod walk;
    pub use walk::FileWalker;
}

pub use cli::{AppContext, Cli, Commands};
pub use error::LangError;
pub use infra::{FileWalker, RunConfig, load_config};
pub use lang::{LanguageConfig, LanguageRegistry};
