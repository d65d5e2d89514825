//! DELETE statement builder.

use std::fmt;

use crate::driver::SqlDriver;
use crate::error::{OrmError, OrmResult};
use crate::mapping::AttributeMapper;
use crate::value::Value;

use super::clause::{FromClause, LimitClause, OrderByClause, WhereClause};
use super::context::QueryContext;
use super::Args;

/// Builds and executes `DELETE FROM targets WHERE ... ORDER BY ...
/// LIMIT ...`.
pub struct DeleteQuery<'a, D: SqlDriver> {
    driver: &'a D,
    mapper: &'a dyn AttributeMapper,
    from: FromClause,
    filter: WhereClause,
    order: OrderByClause,
    limit: LimitClause,
}

impl<'a, D: SqlDriver> DeleteQuery<'a, D> {
    pub(crate) fn new(driver: &'a D, mapper: &'a dyn AttributeMapper, class: &str) -> Self {
        let mut from = FromClause::default();
        from.push(class);
        Self {
            driver,
            mapper,
            from,
            filter: WhereClause::default(),
            order: OrderByClause::default(),
            limit: LimitClause::default(),
        }
    }

    /// Add another delete target.
    pub fn from(mut self, class: &str) -> Self {
        self.from.push(class);
        self
    }

    pub fn where_cond(mut self, cond: &str, args: impl Into<Args>) -> Self {
        self.filter.push("", cond, args.into().0);
        self
    }

    pub fn and_where(mut self, cond: &str, args: impl Into<Args>) -> Self {
        self.filter.push(" AND ", cond, args.into().0);
        self
    }

    pub fn or_where(mut self, cond: &str, args: impl Into<Args>) -> Self {
        self.filter.push(" OR ", cond, args.into().0);
        self
    }

    pub fn order_by_asc(mut self, attribute: &str) -> Self {
        self.order.push(attribute, "ASC");
        self
    }

    pub fn order_by_desc(mut self, attribute: &str) -> Self {
        self.order.push(attribute, "DESC");
        self
    }

    pub fn limit(mut self, count: i64) -> Self {
        self.limit.set(count, 0);
        self
    }

    pub fn limit_at(mut self, count: i64, start: i64) -> Self {
        self.limit.set(count, start);
        self
    }

    pub fn generate(&self) -> OrmResult<(String, Vec<Value>)> {
        if self.from.is_empty() {
            return Err(OrmError::validation("DELETE requires a target"));
        }
        let mut ctx = QueryContext::new(self.mapper);
        let targets = self.from.targets(&mut ctx)?;

        let mut sql = format!("DELETE FROM {targets}");
        if let Some(filter) = self.filter.generate(&ctx) {
            sql.push_str(&filter);
        }
        if let Some(order) = self.order.generate(&ctx) {
            sql.push_str(&order);
        }
        if let Some(limit) = self.limit.generate() {
            sql.push_str(&limit);
        }
        Ok((sql, self.filter.args().to_vec()))
    }

    /// Execute and return the affected-row count.
    pub async fn exec(&self) -> OrmResult<u64> {
        let (sql, args) = self.generate()?;
        self.driver.execute_delete(&sql, &args).await
    }
}

impl<D: SqlDriver> fmt::Display for DeleteQuery<'_, D> {
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
