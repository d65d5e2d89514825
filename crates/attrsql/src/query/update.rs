//! UPDATE statement builder.

use std::fmt;

use crate::driver::SqlDriver;
use crate::error::{OrmError, OrmResult};
use crate::mapping::AttributeMapper;
use crate::value::Value;

use super::clause::{FromClause, LimitClause, OrderByClause, SetClause, WhereClause};
use super::context::QueryContext;
use super::Args;

/// Builds and executes `UPDATE targets SET ... WHERE ... ORDER BY ...
/// LIMIT ...`.
pub struct UpdateQuery<'a, D: SqlDriver> {
    driver: &'a D,
    mapper: &'a dyn AttributeMapper,
    tables: FromClause,
    set: SetClause,
    filter: WhereClause,
    order: OrderByClause,
    limit: LimitClause,
}

impl<'a, D: SqlDriver> UpdateQuery<'a, D> {
    pub(crate) fn new(driver: &'a D, mapper: &'a dyn AttributeMapper, class: &str) -> Self {
        let mut tables = FromClause::default();
        tables.push(class);
        Self {
            driver,
            mapper,
            tables,
            set: SetClause::default(),
            filter: WhereClause::default(),
            order: OrderByClause::default(),
            limit: LimitClause::default(),
        }
    }

    /// Add another update target.
    pub fn table(mut self, class: &str) -> Self {
        self.tables.push(class);
        self
    }

    /// `attribute = ?`, binding `value`.
    pub fn set(self, attribute: &str, value: impl Into<Value>) -> Self {
        self.set_rule(attribute, value, "?")
    }

    /// `attribute = rule`, still binding `value` against the rule's own
    /// placeholder, e.g. `set_rule("total", 2, "total * ?")`.
    pub fn set_rule(mut self, attribute: &str, value: impl Into<Value>, rule: &str) -> Self {
        self.set.push(attribute, rule, value.into());
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
        if self.set.is_empty() {
            return Err(OrmError::validation(
                "UPDATE requires at least one SET assignment",
            ));
        }
        let mut ctx = QueryContext::new(self.mapper);
        let targets = self.tables.targets(&mut ctx)?;

        let mut sql = format!("UPDATE {targets}");
        if let Some(set) = self.set.generate(&ctx) {
            sql.push_str(&set);
        }
        if let Some(filter) = self.filter.generate(&ctx) {
            sql.push_str(&filter);
        }
        if let Some(order) = self.order.generate(&ctx) {
            sql.push_str(&order);
        }
        if let Some(limit) = self.limit.generate() {
            sql.push_str(&limit);
        }

        // SET placeholders come before WHERE placeholders in the rendered
        // text, so their arguments do too.
        let mut args = self.set.args().to_vec();
        args.extend_from_slice(self.filter.args());
        Ok((sql, args))
    }

    /// Execute and return the affected-row count.
    pub async fn exec(&self) -> OrmResult<u64> {
        let (sql, args) = self.generate()?;
        self.driver.execute_update(&sql, &args).await
    }
}

impl<D: SqlDriver> fmt::Display for UpdateQuery<'_, D> {
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
