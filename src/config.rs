//! Configuration for building a translator from `afdialect.toml`.
//!
//! ```toml
//! dialect = "mysql"
//!
//! [engine]
//! database = "shop"
//! charset = "utf8mb4"
//! text_policy = { fixed_width = 64 }
//! guid_storage = "text"
//! max_rewrite_depth = 32
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::{GuidStorage, TextPolicy};
use crate::dialect::Dialect;
use crate::error::{DialectError, DialectResult};
use crate::translator::{DialectTranslator, TranslatorOptions};

pub const CONFIG_FILE: &str = "afdialect.toml";

/// Dialect selection plus engine options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub dialect: Dialect,
    pub engine: EngineOptions,
}

/// Engine options. Unset values fall back to the dialect's own defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    pub charset: Option<String>,
    pub collation: Option<String>,
    pub database: Option<String>,
    pub text_policy: TextPolicy,
    pub guid_storage: Option<GuidStorage>,
    pub max_rewrite_depth: Option<usize>,
}

impl TranslatorConfig {
    pub fn for_dialect(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    pub fn parse(text: &str) -> DialectResult<Self> {
        toml::from_str(text).map_err(|e| DialectError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> DialectResult<Self> {
        let text = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)
            .map_err(|e| DialectError::Config(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), dialect = %config.dialect, "loaded translator config");
        Ok(config)
    }

    /// Candidate files, in lookup order.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("afdialect").join("config.toml"));
        }
        paths
    }

    /// Load `explicit` if given, else the first existing search path, else defaults.
    pub fn discover(explicit: Option<&Path>) -> DialectResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::search_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load(&path),
            None => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn options(&self) -> TranslatorOptions {
        let mut options = TranslatorOptions::for_dialect(self.dialect);
        let engine = &self.engine;
        if let Some(charset) = &engine.charset {
            options.identity.charset = charset.clone();
        }
        if let Some(collation) = &engine.collation {
            options.identity.collation = collation.clone();
        }
        if let Some(database) = &engine.database {
            options.identity.database = database.clone();
        }
        if let Some(storage) = engine.guid_storage {
            options.codec.guid_storage = storage;
        }
        if let Some(depth) = engine.max_rewrite_depth {
            options.max_rewrite_depth = depth;
        }
        options.codec.text_policy = engine.text_policy;
        options
    }

    pub fn build(&self) -> DialectTranslator {
        DialectTranslator::with_options(self.dialect, self.options())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_config_is_default() {
        let config = TranslatorConfig::parse("").unwrap();
        assert_eq!(config, TranslatorConfig::default());
        assert_eq!(config.dialect, Dialect::Postgres);
    }

    #[test]
    fn test_parse_engine_section() {
        let config = TranslatorConfig::parse(
            r#"
            dialect = "mysql"

            [engine]
            database = "shop"
            text_policy = { fixed_width = 64 }
            guid_storage = "text"
            max_rewrite_depth = 32
            "#,
        )
        .unwrap();
        assert_eq!(config.dialect, Dialect::MySql);
        assert_eq!(config.engine.text_policy, TextPolicy::FixedWidth(64));

        let options = config.options();
        assert_eq!(options.identity.database, "shop");
        assert_eq!(options.identity.charset, "utf8mb4");
        assert_eq!(options.codec.guid_storage, GuidStorage::Text);
        assert_eq!(options.max_rewrite_depth, 32);
    }

    #[test]
    fn test_unset_options_keep_dialect_defaults() {
        let options = TranslatorConfig::for_dialect(Dialect::SqlServer).options();
        assert_eq!(options.codec.guid_storage, GuidStorage::MixedEndianBytes);
        assert_eq!(options.identity.collation, "SQL_Latin1_General_CP1_CI_AS");
        assert_eq!(options.codec.text_policy, TextPolicy::Unbounded);
    }

    #[test]
    fn test_build_applies_identity() {
        let config = TranslatorConfig::parse(
            r#"
            dialect = "postgres"
            [engine]
            database = "analytics"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.build().template(CommandKind::CreateDatabase).unwrap(),
            "CREATE DATABASE analytics ENCODING 'UTF8'"
        );
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let err = TranslatorConfig::parse("dialect = \"oracle\"").unwrap_err();
        assert!(matches!(err, DialectError::Config(_)));
        let err = TranslatorConfig::parse("[engine]\ntext_policy = 5").unwrap_err();
        assert!(matches!(err, DialectError::Config(_)));
    }

    #[test]
    fn test_load_reports_path_once() {
        let path = std::env::temp_dir().join(format!("afdialect-bad-{}.toml", std::process::id()));
        fs::write(&path, "dialect = \"oracle\"").unwrap();
        let err = TranslatorConfig::load(&path).unwrap_err();
        fs::remove_file(&path).unwrap();

        let message = err.to_string();
        assert!(message.starts_with(&format!("Configuration error: {}: ", path.display())), "{message}");
        assert_eq!(message.matches("Configuration error").count(), 1, "{message}");
    }

    #[test]
    fn test_missing_explicit_file_is_io_error() {
        let err = TranslatorConfig::discover(Some(Path::new("/nonexistent/afdialect.toml"))).unwrap_err();
        assert!(matches!(err, DialectError::Io(_)));
    }
}
