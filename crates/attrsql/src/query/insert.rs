//! INSERT statement builder.

use std::fmt;
use std::sync::Arc;

use crate::driver::SqlDriver;
use crate::error::{OrmError, OrmResult};
use crate::mapping::{AttributeMapper, EntityMapping};
use crate::value::Value;

use super::clause::ValuesClause;
use super::context::QueryContext;
use super::ValueArg;

/// Builds and executes `INSERT INTO table (columns) VALUES ...`.
///
/// The column list is the caller's attribute subset; when none is given it
/// is every mapped column minus the auto-generated ones.
pub struct InsertQuery<'a, D: SqlDriver> {
    driver: &'a D,
    mapper: &'a dyn AttributeMapper,
    class: String,
    mapping: Arc<EntityMapping>,
    attrs: Vec<String>,
    values: ValuesClause,
}

impl<'a, D: SqlDriver> InsertQuery<'a, D> {
    /// The target class resolves at construction; an unknown entity fails
    /// here rather than at generation time.
    pub(crate) fn new(
        driver: &'a D,
        mapper: &'a dyn AttributeMapper,
        class: &str,
        attributes: impl IntoIterator<Item = impl Into<String>>,
    ) -> OrmResult<Self> {
        let mapping = mapper.resolve(class)?;
        Ok(Self {
            driver,
            mapper,
            class: class.to_string(),
            mapping,
            attrs: attributes.into_iter().map(Into::into).collect(),
            values: ValuesClause::default(),
        })
    }

    /// Append one VALUES group; one call renders one parenthesized group.
    pub fn values<I, V>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ValueArg>,
    {
        self.values
            .push_group(items.into_iter().map(Into::into).collect());
        self
    }

    pub fn generate(&self) -> OrmResult<(String, Vec<Value>)> {
        if self.values.is_empty() {
            return Err(OrmError::validation(
                "INSERT requires at least one VALUES group",
            ));
        }

        let columns = if self.attrs.is_empty() {
            let columns: Vec<&str> = self
                .mapping
                .columns()
                .iter()
                .map(|(_, c)| c.as_str())
                .filter(|c| !self.mapping.is_auto_column(c))
                .collect();
            columns.join(", ")
        } else {
            let mut ctx = QueryContext::new(self.mapper);
            ctx.add_class(&self.class)?;
            ctx.resolve_attrs(&self.attrs.join(", "))
        };

        let sql = format!(
            "INSERT INTO {} ({columns}){}",
            self.mapping.table(),
            self.values.generate()
        );
        Ok((sql, self.values.args().to_vec()))
    }

    /// Execute and return the affected-row count.
    pub async fn exec(&self) -> OrmResult<u64> {
        let (sql, args) = self.generate()?;
        self.driver.execute_insert(&sql, &args).await
    }
}

impl<D: SqlDriver> fmt::Display for InsertQuery<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.generate() {
            Ok((sql, args)) if args.is_empty() => write!(f, "{sql}"),
            Ok((sql, args)) => {
                let args: Vec<String> = args.iter().map(ToString::to_string).collect();
                write!(f, "{sql} [ {} ]", args.join(", "))
            }
            Err(e) => write!(f, "<invalid statement: {e}>"),
        }
    }
}
