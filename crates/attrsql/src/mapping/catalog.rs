//! Live-schema metadata strategy.

use std::collections::HashMap;
use std::sync::Arc;

use crate::driver::SqlDriver;
use crate::error::{OrmError, OrmResult};
use crate::value::Value;

use super::{attribute_for_column, entity_for_table, AttributeMapper, EntityMapping};

/// One pass over the information views: every column of every table in the
/// `public` schema of the current database, with primary-key and
/// auto-generated flags, in ordinal order.
const CATALOG_SQL: &str = "\
SELECT
    c.table_name,
    c.column_name,
    EXISTS (
        SELECT 1
        FROM information_schema.table_constraints tc
        JOIN information_schema.key_column_usage kcu
          ON kcu.constraint_name = tc.constraint_name
         AND kcu.table_schema = tc.table_schema
        WHERE tc.constraint_type = 'PRIMARY KEY'
          AND tc.table_schema = c.table_schema
          AND tc.table_name = c.table_name
          AND kcu.column_name = c.column_name
    ) AS is_primary,
    (c.is_identity = 'YES'
        OR COALESCE(c.column_default LIKE 'nextval(%', false)) AS is_auto
FROM information_schema.columns c
WHERE c.table_catalog = ?
  AND c.table_schema = 'public'
ORDER BY c.table_name, c.ordinal_position";

/// Metadata resolver backed by the live database catalog.
///
/// Fully populated at construction; resolution afterwards is a plain map
/// lookup with no locking.
pub struct CatalogMapper {
    mappings: HashMap<String, Arc<EntityMapping>>,
}

impl CatalogMapper {
    /// Introspect the catalog through `driver`. Fails if the catalog query
    /// fails or yields a mapping violating the metadata invariants.
    pub async fn load(driver: &impl SqlDriver) -> OrmResult<Self> {
        let database = driver.current_database().await?;
        let rows = driver
            .execute_select(CATALOG_SQL, &[Value::Text(database)])
            .await?;

        let mut tables: Vec<(String, EntityMapping)> = Vec::new();
        for row in &rows {
            let table = row.try_text("table_name")?;
            let column = row.try_text("column_name")?;
            let primary = row.try_bool("is_primary")?;
            let auto = row.try_bool("is_auto")?;

            // Rows arrive ordered by table, so the current table is always
            // the last one started.
            if tables.last().map(|(t, _)| t.as_str()) != Some(table) {
                tables.push((table.to_string(), EntityMapping::new(table)));
            }
            let (_, mapping) = tables.last_mut().unwrap();
            mapping.push_column(attribute_for_column(table, column), column, primary, auto);
        }

        let mut mappings = HashMap::with_capacity(tables.len());
        for (table, mapping) in tables {
            let entity = entity_for_table(&table);
            mapping.validate(&entity)?;
            mappings.insert(entity, Arc::new(mapping));
        }
        tracing::debug!(entities = mappings.len(), "catalog mapper loaded");
        Ok(Self { mappings })
    }
}

impl AttributeMapper for CatalogMapper {
    fn resolve(&self, entity: &str) -> OrmResult<Arc<EntityMapping>> {
        self.mappings
            .get(entity)
            .cloned()
            .ok_or_else(|| OrmError::mapping(format!("unknown entity '{entity}'")))
    }
}
