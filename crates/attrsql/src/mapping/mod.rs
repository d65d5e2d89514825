//! Entity metadata resolution.
//!
//! Statements address data by entity and attribute names; this module owns
//! the translation to tables and columns. Two strategies exist: the catalog
//! strategy introspects the live database once at startup, the schema
//! strategy reads declarative per-entity files on demand. Both produce the
//! same [`EntityMapping`] shape behind the [`AttributeMapper`] trait.

mod catalog;
mod schema;

pub use catalog::CatalogMapper;
pub use schema::SchemaMapper;

use heck::{ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use std::sync::Arc;

use crate::config::{MapperStrategy, SourceConfig};
use crate::driver::SqlDriver;
use crate::error::{OrmError, OrmResult};

/// Resolved metadata for one entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityMapping {
    table: String,
    /// `(attribute, column)` in declaration order.
    columns: Vec<(String, String)>,
    /// Primary-key attributes.
    primary_keys: Vec<String>,
    /// `(column, attribute)` for auto-generated columns.
    auto_generated: Vec<(String, String)>,
}

impl EntityMapping {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            primary_keys: Vec::new(),
            auto_generated: Vec::new(),
        }
    }

    pub fn push_column(
        &mut self,
        attribute: impl Into<String>,
        column: impl Into<String>,
        primary: bool,
        auto: bool,
    ) {
        let attribute = attribute.into();
        let column = column.into();
        if primary {
            self.primary_keys.push(attribute.clone());
        }
        if auto {
            self.auto_generated.push((column.clone(), attribute.clone()));
        }
        self.columns.push((attribute, column));
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// `(attribute, column)` pairs in declaration order.
    pub fn columns(&self) -> &[(String, String)] {
        &self.columns
    }

    pub fn column_for(&self, attribute: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(a, _)| a == attribute)
            .map(|(_, c)| c.as_str())
    }

    pub fn primary_keys(&self) -> &[String] {
        &self.primary_keys
    }

    /// `(column, attribute)` pairs for auto-generated columns.
    pub fn auto_generated(&self) -> &[(String, String)] {
        &self.auto_generated
    }

    pub fn is_primary(&self, attribute: &str) -> bool {
        self.primary_keys.iter().any(|a| a == attribute)
    }

    pub fn is_auto_attribute(&self, attribute: &str) -> bool {
        self.auto_generated.iter().any(|(_, a)| a == attribute)
    }

    pub fn is_auto_column(&self, column: &str) -> bool {
        self.auto_generated.iter().any(|(c, _)| c == column)
    }

    /// Every primary-key attribute and auto-generated column must be a
    /// mapped column.
    pub fn validate(&self, entity: &str) -> OrmResult<()> {
        for key in &self.primary_keys {
            if self.column_for(key).is_none() {
                return Err(OrmError::mapping(format!(
                    "entity '{entity}': primary key attribute '{key}' is not a mapped column"
                )));
            }
        }
        for (column, attribute) in &self.auto_generated {
            let mapped = self
                .columns
                .iter()
                .any(|(a, c)| a == attribute && c == column);
            if !mapped {
                return Err(OrmError::mapping(format!(
                    "entity '{entity}': auto-generated column '{column}' is not a mapped column"
                )));
            }
        }
        Ok(())
    }
}

/// Resolves entity names to their table/column metadata.
pub trait AttributeMapper: Send + Sync {
    fn resolve(&self, entity: &str) -> OrmResult<Arc<EntityMapping>>;
}

/// `Order` → `order`, `UserAccount` → `user_account`.
pub(crate) fn table_for_entity(entity: &str) -> String {
    entity.to_snake_case()
}

/// `user_account` → `UserAccount`.
pub(crate) fn entity_for_table(table: &str) -> String {
    table.to_upper_camel_case()
}

/// Derive an attribute name from a column: the `<table>_` prefix is
/// stripped, then the remainder is lowerCamelCased.
/// `user_account.user_account_first_name` → `firstName`.
pub(crate) fn attribute_for_column(table: &str, column: &str) -> String {
    let prefix = format!("{table}_");
    let stripped = column.strip_prefix(&prefix).unwrap_or(column);
    stripped.to_lower_camel_case()
}

/// Build the configured mapper strategy, failing before any statement runs
/// if the configuration is unusable.
pub async fn build_mapper<D: SqlDriver>(
    driver: &D,
    config: &SourceConfig,
) -> OrmResult<Arc<dyn AttributeMapper>> {
    match config.strategy {
        MapperStrategy::Catalog => Ok(Arc::new(CatalogMapper::load(driver).await?)),
        MapperStrategy::Schema => {
            let dir = config.schema_dir.clone().ok_or_else(|| {
                OrmError::mapper_factory("schema strategy requires a schema_dir")
            })?;
            if !dir.is_dir() {
                return Err(OrmError::mapper_factory(format!(
                    "schema directory '{}' is not a directory",
                    dir.display()
                )));
            }
            Ok(Arc::new(SchemaMapper::new(dir)))
        }
    }
}
