//! Configuration file format for `peel --config`.
//!
//! # Example
//!
//! ```toml
//! [parser]
//! max_depth = 64
//! max_input_len = 65536
//! ```

use std::path::Path;

use peel_core::ParserConfig;
use serde::{Deserialize, Serialize};

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// `[parser]` section: limits applied to every parse.
    #[serde(default)]
    pub parser: ParserConfig,
}

/// Read and parse a config TOML file from `path`.
///
/// Returns a human-readable error string on failure.
pub fn read_config(path: &Path) -> Result<CliConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;

    toml::from_str(&content).map_err(|e| format!("could not parse '{}': {}", path.display(), e))
}

/// The effective parser limits: the config file (if any) with flag overrides on top.
pub fn resolve_parser_config(
    path: Option<&Path>,
    max_depth: Option<usize>,
    max_input_len: Option<usize>,
) -> Result<ParserConfig, String> {
    let mut config = match path {
        Some(p) => read_config(p)?.parser,
        None => ParserConfig::default(),
    };
    if max_depth.is_some() {
        config.max_depth = max_depth;
    }
    if max_input_len.is_some() {
        config.max_input_len = max_input_len;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parser_table_maps_onto_parser_config() {
        let config: CliConfig = toml::from_str("[parser]\nmax_depth = 8\n").unwrap();
        assert_eq!(config.parser.max_depth, Some(8));
        assert_eq!(config.parser.max_input_len, None);
    }

    #[test]
    fn empty_file_means_unbounded() {
        let config: CliConfig = toml::from_str("").unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<CliConfig>("[parser]\nmax_dept = 8\n").is_err());
        assert!(toml::from_str::<CliConfig>("[lexer]\n").is_err());
    }

    #[test]
    fn flags_override_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[parser]\nmax_depth = 8\nmax_input_len = 100").unwrap();

        let config = resolve_parser_config(Some(file.path()), Some(3), None).unwrap();
        assert_eq!(config.max_depth, Some(3));
        assert_eq!(config.max_input_len, Some(100));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = resolve_parser_config(Some(Path::new("/nonexistent/peel.toml")), None, None)
            .unwrap_err();
        assert!(err.starts_with("could not read '/nonexistent/peel.toml'"), "{}", err);
    }
}
