//! Entity boundary.
//!
//! Application types opt into the engine by naming themselves and exposing
//! attribute access as data. The facade and the object-returning select
//! terminals only ever touch entities through this trait.

use crate::error::{OrmError, OrmResult};
use crate::row::Row;
use crate::value::Value;

/// An application type mapped to a table.
///
/// `NAME` is the UpperCamelCase entity name resolved by the attribute
/// mapper. `get`/`set` address fields by attribute name; both fail with a
/// mapping error for attributes the type does not carry.
pub trait Entity {
    const NAME: &'static str;

    fn get(&self, attribute: &str) -> OrmResult<Value>;

    fn set(&mut self, attribute: &str, value: Value) -> OrmResult<()>;
}

/// Standard error for an attribute an entity does not carry.
pub fn unknown_attribute(entity: &str, attribute: &str) -> OrmError {
    OrmError::mapping(format!("entity '{entity}' has no attribute '{attribute}'"))
}

/// Reconstruct an entity from an attribute-keyed result row.
pub(crate) fn from_row<T: Entity + Default>(row: &Row) -> OrmResult<T> {
    let mut entity = T::default();
    for (attribute, value) in row.iter() {
        entity.set(attribute, value.clone())?;
    }
    Ok(entity)
}
