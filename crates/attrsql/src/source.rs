//! Entity-source facade.
//!
//! [`EntitySource`] owns the driver and the metadata resolver and is the
//! entry point for both levels of the API: the raw statement builders
//! (`select`, `insert_into`, `update`, `delete_from`) and the whole-entity
//! CRUD verbs (`insert_one`, `select_one`, `update_one`, `delete_one`).

use std::sync::Arc;

use crate::config::SourceConfig;
use crate::driver::SqlDriver;
use crate::entity::Entity;
use crate::error::OrmResult;
use crate::mapping::{build_mapper, AttributeMapper};
use crate::query::{DeleteQuery, InsertQuery, SelectQuery, UpdateQuery, ValueArg};
use crate::value::Value;

pub struct EntitySource<D: SqlDriver> {
    driver: D,
    mapper: Arc<dyn AttributeMapper>,
}

impl<D: SqlDriver> EntitySource<D> {
    /// Build the configured mapper strategy over `driver`. Strategy problems
    /// surface here, before any statement runs.
    pub async fn connect(driver: D, config: &SourceConfig) -> OrmResult<Self> {
        let mapper = build_mapper(&driver, config).await?;
        Ok(Self { driver, mapper })
    }

    pub fn with_mapper(driver: D, mapper: Arc<dyn AttributeMapper>) -> Self {
        Self { driver, mapper }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// A SELECT over all attributes (`*`).
    pub fn select_all(&self) -> SelectQuery<'_, D> {
        SelectQuery::new(&self.driver, self.mapper.as_ref(), Vec::<String>::new())
    }

    pub fn select(
        &self,
        attributes: impl IntoIterator<Item = impl Into<String>>,
    ) -> SelectQuery<'_, D> {
        SelectQuery::new(&self.driver, self.mapper.as_ref(), attributes)
    }

    pub fn insert_into(
        &self,
        class: &str,
        attributes: impl IntoIterator<Item = impl Into<String>>,
    ) -> OrmResult<InsertQuery<'_, D>> {
        InsertQuery::new(&self.driver, self.mapper.as_ref(), class, attributes)
    }

    pub fn update(&self, class: &str) -> UpdateQuery<'_, D> {
        UpdateQuery::new(&self.driver, self.mapper.as_ref(), class)
    }

    pub fn delete_from(&self, class: &str) -> DeleteQuery<'_, D> {
        DeleteQuery::new(&self.driver, self.mapper.as_ref(), class)
    }

    /// Insert one entity: every non-auto-generated attribute is bound, and
    /// generated keys are read back into the entity afterwards. Returns the
    /// affected-row count.
    pub async fn insert_one<E: Entity>(&self, entity: &mut E) -> OrmResult<u64> {
        let mapping = self.mapper.resolve(E::NAME)?;

        let mut attrs = Vec::new();
        let mut values = Vec::new();
        for (attr, _) in mapping.columns() {
            if mapping.is_auto_attribute(attr) {
                continue;
            }
            attrs.push(attr.as_str());
            values.push(ValueArg::Plain(entity.get(attr)?));
        }
        let affected = self.insert_into(E::NAME, attrs)?.values(values).exec().await?;

        for (column, attr) in mapping.auto_generated() {
            let id = self
                .driver
                .last_insert_id(&format!("{}.{column}", mapping.table()))
                .await?;
            entity.set(attr, Value::Int(id))?;
        }
        Ok(affected)
    }

    /// Load one entity by its primary key attributes, filling every mapped
    /// attribute from the returned row. Zero or several matches fail with a
    /// bad-count error.
    pub async fn select_one<E: Entity>(&self, entity: &mut E) -> OrmResult<()> {
        let mapping = self.mapper.resolve(E::NAME)?;

        let mut query = self.select_all().from(E::NAME);
        for key in mapping.primary_keys() {
            let value = entity.get(key)?;
            query = query.and_where(&format!("{key} = ?"), value);
        }

        let row = query.get_one_result().await?;
        for (attr, value) in row.iter() {
            entity.set(attr, value.clone())?;
        }
        Ok(())
    }

    /// Write every non-key attribute of one entity, filtered on its primary
    /// keys. Returns the affected-row count.
    pub async fn update_one<E: Entity>(&self, entity: &E) -> OrmResult<u64> {
        let mapping = self.mapper.resolve(E::NAME)?;

        let mut query = self.update(E::NAME);
        for (attr, _) in mapping.columns() {
            if mapping.is_primary(attr) {
                continue;
            }
            query = query.set(attr, entity.get(attr)?);
        }
        for key in mapping.primary_keys() {
            query = query.and_where(&format!("{key} = ?"), entity.get(key)?);
        }
        query.exec().await
    }

    /// Delete one entity by its primary keys. Returns the affected-row
    /// count.
    pub async fn delete_one<E: Entity>(&self, entity: &E) -> OrmResult<u64> {
        let mapping = self.mapper.resolve(E::NAME)?;

        let mut query = self.delete_from(E::NAME);
        for key in mapping.primary_keys() {
            query = query.and_where(&format!("{key} = ?"), entity.get(key)?);
        }
        query.exec().await
    }
}
