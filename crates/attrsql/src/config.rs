//! Source configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{OrmError, OrmResult};

/// How entity metadata is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapperStrategy {
    /// Introspect the live database catalog once at startup.
    Catalog,
    /// Parse declarative per-entity schema files on demand.
    Schema,
}

impl FromStr for MapperStrategy {
    type Err = OrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "catalog" => Ok(Self::Catalog),
            "schema" => Ok(Self::Schema),
            other => Err(OrmError::mapper_factory(format!(
                "unknown mapper strategy '{other}' (expected 'catalog' or 'schema')"
            ))),
        }
    }
}

/// Configuration for building an entity source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub strategy: MapperStrategy,
    /// Directory holding `<Entity>.toml` files; required by the schema
    /// strategy, ignored by the catalog strategy.
    #[serde(default)]
    pub schema_dir: Option<PathBuf>,
}

impl SourceConfig {
    /// Parse a configuration snippet like
    /// `strategy = "schema"\nschema_dir = "schemas"`.
    pub fn from_toml(text: &str) -> OrmResult<Self> {
        toml::from_str(text).map_err(|e| OrmError::Config(e.to_string()))
    }

    pub fn catalog() -> Self {
        Self {
            strategy: MapperStrategy::Catalog,
            schema_dir: None,
        }
    }

    pub fn schema(dir: impl Into<PathBuf>) -> Self {
        Self {
            strategy: MapperStrategy::Schema,
            schema_dir: Some(dir.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_parses_from_str() {
        assert_eq!(
            "catalog".parse::<MapperStrategy>().unwrap(),
            MapperStrategy::Catalog
        );
        assert_eq!(
            "schema".parse::<MapperStrategy>().unwrap(),
            MapperStrategy::Schema
        );
        assert!("reflection".parse::<MapperStrategy>().is_err());
    }

    #[test]
    fn config_deserializes_from_toml() {
        let config =
            SourceConfig::from_toml("strategy = \"schema\"\nschema_dir = \"schemas\"\n").unwrap();
        assert_eq!(config.strategy, MapperStrategy::Schema);
        assert_eq!(config.schema_dir.as_deref(), Some(std::path::Path::new("schemas")));

        let err = SourceConfig::from_toml("strategy = \"reflection\"").unwrap_err();
        assert!(matches!(err, OrmError::Config(_)));
    }
}
