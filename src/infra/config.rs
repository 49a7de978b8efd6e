use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs, OracleKind};

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Comma-separated import-path prefixes sorted into their own
    /// trailing group (same meaning as `goimports -local`)
    pub local: String,

    /// File-name wildcard patterns to exclude
    pub exclude: Vec<String>,

    /// Directory-name wildcard patterns to exclude
    pub exclude_dirs: Vec<String>,

    /// Canonical-ordering backend
    pub oracle: OracleKind,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            local: String::new(),
            exclude: Vec::new(),
            exclude_dirs: Vec::new(),
            oracle: OracleKind::Builtin,
        }
    }
}

pub fn load_config() -> Result<Config> {
    let mut builder = config::Config::builder();

    // Load from config files in priority order
    let config_paths = ["strictimports.toml", ".strictimports.toml"];

    for path in &config_paths {
        if Path::new(path).exists() {
            builder = builder.add_source(config::File::with_name(path));
            break;
        }
    }

    // Add environment variables with STRICTIMPORTS_ prefix
    builder = builder.add_source(config::Environment::with_prefix("STRICTIMPORTS"));

    let cfg = builder.build().context("Failed to load configuration")?;
    let parsed: Config = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

pub fn init(args: InitArgs, ctx: &AppContext) -> Result<()> {
    let config_path = args.path.join("strictimports.toml");

    if config_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::default();
    let toml_string =
        toml::to_string_pretty(&config).context("Failed to serialize default config")?;

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let rendered = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();

        assert_eq!(parsed.local, "");
        assert!(parsed.exclude.is_empty());
        assert_eq!(parsed.oracle, OracleKind::Builtin);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let parsed: Config = toml::from_str(r#"local = "github.com/acme""#).unwrap();

        assert_eq!(parsed.local, "github.com/acme");
        assert_eq!(parsed.oracle, OracleKind::Builtin);
    }
}
