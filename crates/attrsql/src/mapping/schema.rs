//! Declarative metadata strategy.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::error::{OrmError, OrmResult};

use super::{attribute_for_column, table_for_entity, AttributeMapper, EntityMapping};

/// On-disk shape of `<Entity>.toml`.
///
/// `table` defaults to snake_case of the entity name; each attribute's
/// `name` defaults to the same derivation the catalog strategy uses
/// (table prefix stripped from the column, then lowerCamelCase).
#[derive(Debug, Deserialize)]
struct SchemaFile {
    table: Option<String>,
    #[serde(default, rename = "attribute")]
    attributes: Vec<SchemaAttribute>,
}

#[derive(Debug, Deserialize)]
struct SchemaAttribute {
    name: Option<String>,
    column: String,
    #[serde(default)]
    primary: bool,
    #[serde(default)]
    auto: bool,
}

/// Metadata resolver backed by per-entity schema files.
///
/// Files are parsed the first time an entity is requested and memoized for
/// the mapper's lifetime.
pub struct SchemaMapper {
    dir: PathBuf,
    cache: RwLock<HashMap<String, Arc<EntityMapping>>>,
}

impl SchemaMapper {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn load(&self, entity: &str) -> OrmResult<Arc<EntityMapping>> {
        if entity.is_empty() || !entity.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(OrmError::mapping(format!(
                "invalid entity name '{entity}'"
            )));
        }

        let path = self.dir.join(format!("{entity}.toml"));
        let text = std::fs::read_to_string(&path).map_err(|e| {
            OrmError::mapping(format!(
                "no schema description for entity '{entity}' at '{}': {e}",
                path.display()
            ))
        })?;
        let file: SchemaFile = toml::from_str(&text).map_err(|e| {
            OrmError::mapping(format!("invalid schema file '{}': {e}", path.display()))
        })?;

        let table = file.table.unwrap_or_else(|| table_for_entity(entity));
        let mut mapping = EntityMapping::new(&table);
        for attr in file.attributes {
            let name = attr
                .name
                .unwrap_or_else(|| attribute_for_column(&table, &attr.column));
            mapping.push_column(name, attr.column, attr.primary, attr.auto);
        }
        mapping.validate(entity)?;
        tracing::debug!(entity, table = %table, "schema file loaded");
        Ok(Arc::new(mapping))
    }
}

impl AttributeMapper for SchemaMapper {
    fn resolve(&self, entity: &str) -> OrmResult<Arc<EntityMapping>> {
        if let Some(mapping) = self.cache.read().unwrap().get(entity) {
            return Ok(mapping.clone());
        }
        let mapping = self.load(entity)?;
        let mut cache = self.cache.write().unwrap();
        // A concurrent resolver may have won the race; keep its result.
        Ok(cache
            .entry(entity.to_string())
            .or_insert(mapping)
            .clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema_dir(name: &str, files: &[(&str, &str)]) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("attrsql-schema-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for (file, text) in files {
            std::fs::write(dir.join(file), text).unwrap();
        }
        dir
    }

    const ORDER_TOML: &str = r#"
table = "order"

[[attribute]]
name = "id"
column = "order_id"
primary = true
auto = true

[[attribute]]
column = "order_customer_id"

[[attribute]]
column = "order_total"
"#;

    #[test]
    fn parses_a_schema_file() {
        let dir = schema_dir("parse", &[("Order.toml", ORDER_TOML)]);
        let mapper = SchemaMapper::new(dir);

        let order = mapper.resolve("Order").unwrap();
        assert_eq!(order.table(), "order");
        assert_eq!(order.primary_keys(), ["id"]);
        // Unnamed attributes fall back to the column-derived name.
        assert_eq!(order.column_for("customerId"), Some("order_customer_id"));
        assert_eq!(order.column_for("total"), Some("order_total"));
    }

    #[test]
    fn table_defaults_to_snake_case_of_the_entity() {
        let toml = "[[attribute]]\ncolumn = \"user_account_first_name\"\n";
        let dir = schema_dir("default-table", &[("UserAccount.toml", toml)]);
        let mapper = SchemaMapper::new(dir);

        let mapping = mapper.resolve("UserAccount").unwrap();
        assert_eq!(mapping.table(), "user_account");
        assert_eq!(
            mapping.column_for("firstName"),
            Some("user_account_first_name")
        );
    }

    #[test]
    fn resolve_memoizes_per_entity() {
        let dir = schema_dir("memo", &[("Order.toml", ORDER_TOML)]);
        let mapper = SchemaMapper::new(dir.clone());
        let first = mapper.resolve("Order").unwrap();
        // Removing the file no longer matters once the entity is cached.
        std::fs::remove_file(dir.join("Order.toml")).unwrap();
        let second = mapper.resolve("Order").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn missing_file_is_a_mapping_error() {
        let dir = schema_dir("missing", &[]);
        let mapper = SchemaMapper::new(dir);
        assert!(mapper.resolve("Ghost").unwrap_err().is_mapping());
    }

    #[test]
    fn entity_names_cannot_escape_the_schema_dir() {
        let dir = schema_dir("escape", &[]);
        let mapper = SchemaMapper::new(dir);
        assert!(mapper.resolve("../Order").is_err());
    }
}
