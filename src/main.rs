use anyhow::Result;
use clap::Parser;
use strictimports::cli::{AppContext, Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Build a context once, pass everywhere
    let ctx = AppContext {
        quiet: cli.quiet,
        no_color: cli.no_color || std::env::var_os("NO_COLOR").is_some(),
        dry_run: cli.dry_run,
    };

    let code = match cli.command {
        Commands::Check(args) => strictimports::check_run(args, &ctx)?,
        Commands::Fix(args) => strictimports::fix_run(args, &ctx)?,
        Commands::Init(args) => {
            strictimports::infra::config::init(args, &ctx)?;
            0
        }
        Commands::Completions(args) => {
            strictimports::completion::run(args)?;
            0
        }
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
