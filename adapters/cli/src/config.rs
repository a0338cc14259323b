//! Loads the game configuration from TOML.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use crawl_core::GameConfig;

/// Reads and validates the configuration, falling back to defaults without a path.
pub(crate) fn load(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return validated(GameConfig::default());
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse(&text).with_context(|| format!("invalid config file {}", path.display()))
}

/// Parses a TOML document; omitted keys keep their defaults.
pub(crate) fn parse(text: &str) -> Result<GameConfig> {
    let config: GameConfig = toml::from_str(text).context("failed to parse TOML")?;
    validated(config)
}

fn validated(config: GameConfig) -> Result<GameConfig> {
    config
        .validate()
        .context("configuration cannot generate a level")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_yields_defaults() {
        let config = load(None).expect("defaults are valid");
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn parse_overrides_selected_keys() {
        let config = parse("[board]\ncolumns = 14\nrows = 9\n").expect("valid document");
        assert_eq!(config.board.columns, 14);
        assert_eq!(config.board.rows, 9);
        assert_eq!(config.player, GameConfig::default().player);
    }

    #[test]
    fn parse_reports_validation_failures_with_context() {
        let error = parse("[board]\ncolumns = 2\n").expect_err("board is too small");
        let chain = format!("{error:#}");
        assert!(chain.contains("configuration cannot generate a level"));
        assert!(chain.contains("3x3"));
    }

    #[test]
    fn unreadable_file_names_the_path() {
        let error = load(Some(Path::new("/definitely/not/here.toml"))).expect_err("missing file");
        assert!(format!("{error:#}").contains("/definitely/not/here.toml"));
    }
}
