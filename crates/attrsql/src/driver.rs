//! Storage driver boundary.
//!
//! Statement builders emit portable SQL with `?` placeholders; the driver
//! owns everything backend-specific: placeholder numbering, row decoding and
//! error classification. [`PgClient`] is the PostgreSQL implementation over
//! `tokio_postgres`.

use crate::error::{OrmError, OrmResult};
use crate::row::Row;
use crate::value::Value;
use tokio_postgres::types::ToSql;

/// Executes generated statements against a storage backend.
///
/// Each verb validates that the statement really is of the expected kind
/// before dispatching it, so a builder bug cannot smuggle a mutation through
/// a read path.
pub trait SqlDriver: Send + Sync {
    fn execute_select(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<Vec<Row>>> + Send;

    fn execute_insert(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<u64>> + Send;

    fn execute_update(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<u64>> + Send;

    fn execute_delete(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<u64>> + Send;

    /// The key generated for the most recent insert on this connection.
    ///
    /// `target` is `table.column` for drivers that track generated keys per
    /// sequence; drivers with a single session-level counter may ignore it.
    fn last_insert_id(
        &self,
        target: &str,
    ) -> impl std::future::Future<Output = OrmResult<i64>> + Send;

    /// Name of the database this connection is bound to.
    fn current_database(&self) -> impl std::future::Future<Output = OrmResult<String>> + Send;
}

/// Reject a statement whose leading keyword does not match the verb it was
/// handed to.
pub(crate) fn check_statement_kind(sql: &str, keyword: &str) -> OrmResult<()> {
    let head = sql.trim_start();
    match head.get(..keyword.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(keyword) => Ok(()),
        _ => Err(OrmError::validation(format!(
            "expected a {keyword} statement, got: {sql}"
        ))),
    }
}

/// Rewrite `?` placeholders to `$1..$n`, leaving quoted text alone.
pub(crate) fn number_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut n = 0usize;
    let mut in_string = false;
    let mut in_ident = false;
    for ch in sql.chars() {
        match ch {
            '\'' if !in_ident => in_string = !in_string,
            '"' if !in_string => in_ident = !in_ident,
            '?' if !in_string && !in_ident => {
                n += 1;
                out.push('$');
                out.push_str(&n.to_string());
                continue;
            }
            _ => {}
        }
        out.push(ch);
    }
    out
}

fn bind_params(args: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    args.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

/// PostgreSQL driver over a `tokio_postgres` connection.
pub struct PgClient {
    client: tokio_postgres::Client,
}

impl PgClient {
    pub fn new(client: tokio_postgres::Client) -> Self {
        Self { client }
    }

    /// Connect with a `tokio_postgres` config string and spawn the
    /// connection task.
    pub async fn connect(config: &str) -> OrmResult<Self> {
        let (client, connection) = tokio_postgres::connect(config, tokio_postgres::NoTls)
            .await
            .map_err(|e| OrmError::Connection(e.to_string()))?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "database connection closed");
            }
        });
        Ok(Self { client })
    }

    async fn run_dml(&self, sql: &str, args: &[Value], keyword: &str) -> OrmResult<u64> {
        check_statement_kind(sql, keyword)?;
        let sql = number_placeholders(sql);
        tracing::debug!(sql = %sql, args = args.len(), "executing statement");
        self.client
            .execute(&sql, &bind_params(args))
            .await
            .map_err(|e| {
                tracing::error!(sql = %sql, error = %e, "statement failed");
                OrmError::Query(e)
            })
    }
}

impl SqlDriver for PgClient {
    async fn execute_select(&self, sql: &str, args: &[Value]) -> OrmResult<Vec<Row>> {
        check_statement_kind(sql, "SELECT")?;
        let sql = number_placeholders(sql);
        tracing::debug!(sql = %sql, args = args.len(), "executing statement");
        let rows = self
            .client
            .query(&sql, &bind_params(args))
            .await
            .map_err(|e| {
                tracing::error!(sql = %sql, error = %e, "statement failed");
                OrmError::Query(e)
            })?;
        rows.iter().map(Row::from_pg).collect()
    }

    async fn execute_insert(&self, sql: &str, args: &[Value]) -> OrmResult<u64> {
        self.run_dml(sql, args, "INSERT").await
    }

    async fn execute_update(&self, sql: &str, args: &[Value]) -> OrmResult<u64> {
        self.run_dml(sql, args, "UPDATE").await
    }

    async fn execute_delete(&self, sql: &str, args: &[Value]) -> OrmResult<u64> {
        self.run_dml(sql, args, "DELETE").await
    }

    async fn last_insert_id(&self, target: &str) -> OrmResult<i64> {
        let row = match target.split_once('.') {
            Some((table, column)) => {
                self.client
                    .query_one(
                        "SELECT currval(pg_get_serial_sequence($1, $2))",
                        &[&table, &column],
                    )
                    .await?
            }
            None => self.client.query_one("SELECT lastval()", &[]).await?,
        };
        Ok(row.try_get(0)?)
    }

    async fn current_database(&self) -> OrmResult<String> {
        let row = self.client.query_one("SELECT current_database()", &[]).await?;
        Ok(row.try_get(0)?)
    }
}


#[cfg(test)]
mod tests {
    use super::{check_statement_kind, number_placeholders};

    #[test]
    fn placeholders_are_numbered_left_to_right() {
        assert_eq!(
            number_placeholders("SELECT a FROM t WHERE b = ? AND c = ?"),
            "SELECT a FROM t WHERE b = $1 AND c = $2"
        );
    }

    #[test]
    fn quoted_question_marks_survive() {
        assert_eq!(
            number_placeholders("SELECT '?' AS q, \"weird?col\" FROM t WHERE a = ?"),
            "SELECT '?' AS q, \"weird?col\" FROM t WHERE a = $1"
        );
    }

    #[test]
    fn statement_kind_is_enforced() {
        assert!(check_statement_kind("  select 1", "SELECT").is_ok());
        assert!(check_statement_kind("DELETE FROM t", "SELECT").is_err());
        assert!(check_statement_kind("", "INSERT").is_err());
    }

    #[test]
    fn multibyte_statement_heads_fail_validation_cleanly() {
        // The keyword-length cut may fall inside a multibyte character;
        // that must be a validation error, not a panic.
        assert!(check_statement_kind("🙂🙂 WHERE 1", "SELECT").is_err());
        assert!(check_statement_kind("sélect 1", "SELECT").is_err());
    }
}
