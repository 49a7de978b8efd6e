use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
    pub dry_run: bool,  // global --dry-run
}

#[derive(Parser)]
#[command(name = "strictimports")]
#[command(about = "A strict, fast checker and fixer for grouped Go import ordering")]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Show what would be done without executing
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report files whose import block deviates from the canonical order
    Check(CheckArgs),

    /// Rewrite deviating files in place with the canonical form
    Fix(FixArgs),

    /// Initialize a strictimports.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// File-selection and ordering flags shared by `check` and `fix`
#[derive(Args, Debug, Clone)]
pub struct SelectArgs {
    /// Files or directories to process
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Put imports beginning with these prefixes after third-party packages
    /// (comma-separated list)
    #[arg(long, value_name = "PREFIXES")]
    pub local: Option<String>,

    /// File names to exclude; wildcards welcome (comma-separated list)
    #[arg(long, value_name = "PATTERNS", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Directory names to exclude; wildcards welcome (comma-separated list)
    #[arg(long = "exclude-dir", value_name = "PATTERNS", value_delimiter = ',')]
    pub exclude_dir: Vec<String>,

    /// Don't recursively check paths
    #[arg(short = 'n', long)]
    pub no_recurse: bool,

    /// Canonical-ordering backend
    #[arg(long, value_enum)]
    pub oracle: Option<OracleKind>,
}

/// Which canonical-ordering oracle backs the check
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OracleKind {
    /// Embedded grouping/sorting implementation
    Builtin,
    /// External `goimports` subprocess
    Goimports,
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub select: SelectArgs,

    /// Emit findings as JSON lines instead of human text
    #[arg(long)]
    pub json: bool,

    /// Show a unified diff of the proposed rewrite for each finding
    #[arg(long)]
    pub diff: bool,
}

#[derive(Parser, Debug)]
pub struct FixArgs {
    #[command(flatten)]
    pub select: SelectArgs,
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
