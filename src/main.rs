use anyhow::Result;
use clap::{CommandFactory, FromArgMatches};
use fimforge::cli::{AppContext, Cli, Commands};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .init();

    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let ctx = AppContext { quiet: cli.quiet, no_color: cli.no_color, dry_run: cli.dry_run };

    match cli.command {
        Commands::Generate(mut args) => {
            match fimforge::infra::config::load_config() {
                Ok(cfg) => {
                    if let Some(sub_matches) = matches.subcommand_matches("generate") {
                        args.layer_config(&cfg, sub_matches);
                    }
                }
                Err(err) => tracing::warn!(error = %err, "ignoring malformed fimforge.toml"),
            }
            fimforge::pipeline::run_generate(args, &ctx)
        }
        Commands::Init(args) => fimforge::infra::config::init(args, &ctx),
        Commands::Completions(args) => fimforge::completion::run(args, &ctx),
    }
}
