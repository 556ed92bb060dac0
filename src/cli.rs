use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::infra::config::RunConfig;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
    pub dry_run: bool,  // global --dry-run
}

#[derive(Parser)]
#[command(name = "fimforge")]
#[command(about = "Builds fill-in-the-middle training datasets from a source-code repository")]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress progress bars and non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Show what would be done without executing
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a FIM training dataset from a project root
    Generate(GenerateArgs),

    /// Initialize a fimforge.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BaseModelArg {
    #[value(name = "qwen2.5-coder")]
    Qwen25Coder,
    #[value(name = "granite-code")]
    GraniteCode,
    Codellama,
    Starcoder,
}

impl BaseModelArg {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Qwen25Coder => "qwen2.5-coder",
            Self::GraniteCode => "granite-code",
            Self::Codellama => "codellama",
            Self::Starcoder => "starcoder",
        }
    }
}

#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Root directory of the repository to mine for examples
    pub project_root: PathBuf,

    /// Output directory for train.jsonl/val.jsonl/metadata.json
    #[arg(long, default_value = "dataset")]
    pub output: PathBuf,

    /// Source language to mine (rust, python, javascript, typescript, go, cpp)
    #[arg(long, default_value = "rust")]
    pub language: String,

    /// Target base model's FIM special-token family
    #[arg(long, value_enum, default_value = "qwen2.5-coder")]
    pub base_model: BaseModelArg,

    /// Prepend dependency-signature cross-file context
    #[arg(long)]
    pub cross_file_context: bool,

    /// Restrict discovery to these repo-relative paths (repeatable)
    #[arg(long = "include-path")]
    pub include_path: Vec<PathBuf>,

    /// Keep only files with a corresponding test file
    #[arg(long)]
    pub tested_only: bool,

    /// Maximum middle-span line count (0 disables the cap)
    #[arg(long, default_value_t = 30)]
    pub max_middle_lines: usize,

    /// Maximum total characters per assembled example
    #[arg(long, default_value_t = 8192)]
    pub max_total_chars: usize,

    /// Fraction of examples held out for val.jsonl
    #[arg(long, default_value_t = 0.1)]
    pub val_split: f64,

    /// Seed for reproducible span sampling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Print the first N assembled examples instead of writing output
    #[arg(long)]
    pub preview: Option<usize>,

    /// Enable the AST span generator (on by default)
    #[arg(long, default_value_t = true, action = clap::ArgAction::SetTrue)]
    pub ast_fim: bool,

    /// Disable the AST span generator, falling back to regex-based spans
    #[arg(long = "no-ast-fim", action = clap::ArgAction::SetTrue, overrides_with = "ast_fim")]
    pub no_ast_fim: bool,

    /// Prepend BM25-retrieved cross-file context
    #[arg(long)]
    pub bm25_context: bool,

    /// Sort output by descending complexity score
    #[arg(long)]
    pub curriculum: bool,

    /// Percentage of curriculum-sorted examples to retain
    #[arg(long, default_value_t = 100)]
    pub curriculum_top_pct: u8,

    /// Apply the six-rule quality filter
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub quality_filter: bool,

    /// Process files across a rayon thread pool instead of sequentially
    #[arg(long)]
    pub parallel: bool,
}

impl GenerateArgs {
    /// Resolves `--ast-fim`/`--no-ast-fim` to a single effective flag.
    pub fn ast_fim_enabled(&self) -> bool {
        self.ast_fim && !self.no_ast_fim
    }

    /// Applies `cfg` to every field the user did not pass explicitly on the
    /// command line, so the precedence is CLI flag > `fimforge.toml`/env >
    /// built-in default.
    pub fn layer_config(&mut self, cfg: &RunConfig, matches: &clap::ArgMatches) {
        use clap::parser::ValueSource;

        let explicit = |id: &str| matches.value_source(id) == Some(ValueSource::CommandLine);

        if !explicit("output") {
            self.output = PathBuf::from(&cfg.output);
        }
        if !explicit("language") {
            self.language = cfg.language.clone();
        }
        if !explicit("base_model") {
            if let Ok(bm) = <BaseModelArg as ValueEnum>::from_str(&cfg.base_model, true) {
                self.base_model = bm;
            }
        }
        if !explicit("cross_file_context") {
            self.cross_file_context = cfg.cross_file_context;
        }
        if !explicit("tested_only") {
            self.tested_only = cfg.tested_only;
        }
        if !explicit("max_middle_lines") {
            self.max_middle_lines = cfg.max_middle_lines;
        }
        if !explicit("max_total_chars") {
            self.max_total_chars = cfg.max_total_chars;
        }
        if !explicit("val_split") {
            self.val_split = cfg.val_split;
        }
        if !explicit("seed") {
            self.seed = cfg.seed;
        }
        if !explicit("ast_fim") && !explicit("no_ast_fim") {
            self.ast_fim = cfg.ast_fim;
        }
        if !explicit("bm25_context") {
            self.bm25_context = cfg.bm25_context;
        }
        if !explicit("curriculum") {
            self.curriculum = cfg.curriculum;
        }
        if !explicit("curriculum_top_pct") {
            self.curriculum_top_pct = cfg.curriculum_top_pct;
        }
        if !explicit("quality_filter") {
            self.quality_filter = cfg.quality_filter;
        }
        if !explicit("parallel") {
            self.parallel = cfg.parallel;
        }
    }
}

#[derive(Parser)]
pub struct InitArgs {
    /// Directory to initialize config in
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Parser)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,

    /// Output directory; if omitted and --stdout not set, prints error
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print completion script to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
}
