use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs};

/// Defaults for `fimforge generate`, layered under the CLI flags the same
/// way the rest of this crate's config surface works: file first, then env.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub output: String,
    pub language: String,
    pub base_model: String,
    pub cross_file_context: bool,
    pub tested_only: bool,
    pub max_middle_lines: usize,
    pub max_total_chars: usize,
    pub val_split: f64,
    pub seed: u64,
    pub ast_fim: bool,
    pub bm25_context: bool,
    pub curriculum: bool,
    pub curriculum_top_pct: u8,
    pub quality_filter: bool,
    pub parallel: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output: "dataset".to_string(),
            language: "rust".to_string(),
            base_model: "qwen2.5-coder".to_string(),
            cross_file_context: false,
            tested_only: false,
            max_middle_lines: 30,
            max_total_chars: 8192,
            val_split: 0.1,
            seed: 42,
            ast_fim: true,
            bm25_context: false,
            curriculum: false,
            curriculum_top_pct: 100,
            quality_filter: true,
            parallel: false,
        }
    }
}

pub fn load_config() -> Result<RunConfig> {
    let mut builder = config::Config::builder();

    let config_paths = ["fimforge.toml", "fimforge.yaml", "fimforge.json", ".fimforge.toml"];
    for path in &config_paths {
        if Path::new(path).exists() {
            builder = builder.add_source(config::File::with_name(path));
            break;
        }
    }

    builder = builder.add_source(config::Environment::with_prefix("FIMFORGE").separator("_"));

    let cfg = builder.build().context("Failed to load configuration")?;
    let parsed: RunConfig = cfg.try_deserialize().context("Failed to parse configuration")?;

    Ok(parsed)
}

pub fn init(args: InitArgs, ctx: &AppContext) -> Result<()> {
    let config_path = args.path.join("fimforge.toml");

    if config_path.exists() && !args.force {
        anyhow::bail!("Config file already exists at {}. Use --force to overwrite.", config_path.display());
    }

    let config = RunConfig::default();
    let toml_string = toml::to_string_pretty(&config).context("Failed to serialize default config")?;

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}
