//! SELECT statement builder.

use std::collections::HashMap;
use std::fmt;

use crate::driver::SqlDriver;
use crate::entity::{self, Entity};
use crate::error::{OrmError, OrmResult};
use crate::mapping::AttributeMapper;
use crate::row::Row;
use crate::value::Value;

use super::clause::{FromClause, JoinClause, LimitClause, OrderByClause, WhereClause};
use super::context::QueryContext;
use super::Args;

/// Builds and executes `SELECT list FROM ... JOIN ... WHERE ... ORDER BY ...
/// LIMIT ...`.
///
/// Select-list items are attributes, `expr AS alias` pairs, or items
/// containing `*` (expanded to the full aliased column list of every
/// resolved class). An empty list means `*`.
pub struct SelectQuery<'a, D: SqlDriver> {
    driver: &'a D,
    mapper: &'a dyn AttributeMapper,
    attrs: Vec<String>,
    from: FromClause,
    join: JoinClause,
    filter: WhereClause,
    order: OrderByClause,
    limit: LimitClause,
}

impl<'a, D: SqlDriver> SelectQuery<'a, D> {
    pub(crate) fn new(
        driver: &'a D,
        mapper: &'a dyn AttributeMapper,
        attributes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            driver,
            mapper,
            attrs: attributes.into_iter().map(Into::into).collect(),
            from: FromClause::default(),
            join: JoinClause::default(),
            filter: WhereClause::default(),
            order: OrderByClause::default(),
            limit: LimitClause::default(),
        }
    }

    /// Add a FROM target: `"Class"` or `"Class AS alias"`.
    pub fn from(mut self, class: &str) -> Self {
        self.from.push(class);
        self
    }

    fn push_join(mut self, keyword: &'static str, class: &str) -> Self {
        self.join.push_join(keyword, class);
        self
    }

    pub fn join(self, class: &str) -> Self {
        self.push_join("JOIN", class)
    }

    pub fn inner_join(self, class: &str) -> Self {
        self.push_join("INNER JOIN", class)
    }

    pub fn left_join(self, class: &str) -> Self {
        self.push_join("LEFT JOIN", class)
    }

    pub fn left_outer_join(self, class: &str) -> Self {
        self.push_join("LEFT OUTER JOIN", class)
    }

    pub fn right_join(self, class: &str) -> Self {
        self.push_join("RIGHT JOIN", class)
    }

    pub fn right_outer_join(self, class: &str) -> Self {
        self.push_join("RIGHT OUTER JOIN", class)
    }

    pub fn cross_join(self, class: &str) -> Self {
        self.push_join("CROSS JOIN", class)
    }

    pub fn straight_join(self, class: &str) -> Self {
        self.push_join("STRAIGHT_JOIN", class)
    }

    pub fn natural_left_join(self, class: &str) -> Self {
        self.push_join("NATURAL LEFT JOIN", class)
    }

    pub fn natural_left_outer_join(self, class: &str) -> Self {
        self.push_join("NATURAL LEFT OUTER JOIN", class)
    }

    pub fn natural_right_join(self, class: &str) -> Self {
        self.push_join("NATURAL RIGHT JOIN", class)
    }

    pub fn natural_right_outer_join(self, class: &str) -> Self {
        self.push_join("NATURAL RIGHT OUTER JOIN", class)
    }

    /// Join condition for the most recent join.
    pub fn on(mut self, cond: &str, args: impl Into<Args>) -> Self {
        self.join.push_cond(" ON ", cond, args.into().0);
        self
    }

    pub fn and_on(mut self, cond: &str, args: impl Into<Args>) -> Self {
        self.join.push_cond(" AND ", cond, args.into().0);
        self
    }

    pub fn or_on(mut self, cond: &str, args: impl Into<Args>) -> Self {
        self.join.push_cond(" OR ", cond, args.into().0);
        self
    }

    /// `USING (attrs)` for the most recent join.
    pub fn using_cols(mut self, columns: &str) -> Self {
        self.join.push_using(columns);
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

    fn select_list(&self, ctx: &QueryContext<'_>) -> String {
        let star = "*".to_string();
        let attrs: &[String] = if self.attrs.is_empty() {
            std::slice::from_ref(&star)
        } else {
            &self.attrs
        };

        let mut items = Vec::with_capacity(attrs.len());
        for attr in attrs {
            let item = attr.trim();
            if let Some((expr, alias)) = item.split_once(" AS ") {
                items.push(format!(
                    "{} AS \"{}\"",
                    ctx.resolve_attrs(expr.trim()),
                    alias.trim()
                ));
            } else if let Some(column) = ctx.field_for(item) {
                items.push(format!("{column} AS \"{item}\""));
            } else if item.contains('*') {
                items.push(item.replace('*', &ctx.expand_star()));
            } else {
                items.push(ctx.resolve_attrs(item));
            }
        }
        items.join(", ")
    }

    /// Render the statement and its arguments. Idempotent: the builder's
    /// accumulated state is re-rendered on every call.
    pub fn generate(&self) -> OrmResult<(String, Vec<Value>)> {
        if self.from.is_empty() {
            return Err(OrmError::validation("SELECT requires a FROM target"));
        }
        let mut ctx = QueryContext::new(self.mapper);
        // Targets resolve before the select list so `*` sees every class.
        let from = self.from.targets(&mut ctx)?;
        let join = self.join.generate(&mut ctx)?;
        let list = self.select_list(&ctx);

        let mut sql = format!("SELECT {list} FROM {from}{join}");
        if let Some(filter) = self.filter.generate(&ctx) {
            sql.push_str(&filter);
        }
        if let Some(order) = self.order.generate(&ctx) {
            sql.push_str(&order);
        }
        if let Some(limit) = self.limit.generate() {
            sql.push_str(&limit);
        }

        let mut args = self.join.args().to_vec();
        args.extend_from_slice(self.filter.args());
        Ok((sql, args))
    }

    /// Execute and return the decoded rows.
    pub async fn exec(&self) -> OrmResult<Vec<Row>> {
        let (sql, args) = self.generate()?;
        self.driver.execute_select(&sql, &args).await
    }

    /// Execute and require exactly one row.
    pub async fn get_one_result(&self) -> OrmResult<Row> {
        let mut rows = self.exec().await?;
        match rows.len() {
            1 => Ok(rows.remove(0)),
            n => Err(OrmError::bad_count(1, n)),
        }
    }

    /// Execute and reconstruct one entity per row.
    pub async fn get_objects<T: Entity + Default>(&self) -> OrmResult<Vec<T>> {
        let rows = self.exec().await?;
        rows.iter().map(entity::from_row).collect()
    }

    /// Execute and key the reconstructed entities by the text rendering of
    /// `index` in each row.
    pub async fn get_objects_by<T: Entity + Default>(
        &self,
        index: &str,
    ) -> OrmResult<HashMap<String, T>> {
        let rows = self.exec().await?;
        let mut objects = HashMap::with_capacity(rows.len());
        for row in &rows {
            let key = row.try_get(index)?.to_string();
            objects.insert(key, entity::from_row(row)?);
        }
        Ok(objects)
    }

    /// Execute, require exactly one row, reconstruct it.
    pub async fn get_one_object<T: Entity + Default>(&self) -> OrmResult<T> {
        let row = self.get_one_result().await?;
        entity::from_row(&row)
    }
}

impl<D: SqlDriver> fmt::Display for SelectQuery<'_, D> {
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
