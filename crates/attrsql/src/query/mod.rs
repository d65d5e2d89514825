//! Statement builders.
//!
//! Four cooperating builders translate attribute-oriented operations into
//! parameterized SQL: [`SelectQuery`], [`InsertQuery`], [`UpdateQuery`] and
//! [`DeleteQuery`]. Each is an owned value chained by move, generating its
//! SQL with `?` placeholders and the matching argument list; the driver owns
//! placeholder numbering and execution.

mod clause;
mod context;
mod delete;
mod insert;
mod select;
mod update;

pub use delete::DeleteQuery;
pub use insert::InsertQuery;
pub use select::SelectQuery;
pub use update::UpdateQuery;

use crate::value::Value;

/// Bound arguments for a condition: none, one, or several.
pub struct Args(pub(crate) Vec<Value>);

impl From<()> for Args {
    fn from(_: ()) -> Self {
        Self(Vec::new())
    }
}

impl From<Value> for Args {
    fn from(v: Value) -> Self {
        Self(vec![v])
    }
}

impl From<Vec<Value>> for Args {
    fn from(v: Vec<Value>) -> Self {
        Self(v)
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Args {
    fn from(v: [T; N]) -> Self {
        Self(v.into_iter().map(Into::into).collect())
    }
}

impl From<bool> for Args {
    fn from(v: bool) -> Self {
        Self(vec![v.into()])
    }
}

impl From<i32> for Args {
    fn from(v: i32) -> Self {
        Self(vec![v.into()])
    }
}

impl From<i64> for Args {
    fn from(v: i64) -> Self {
        Self(vec![v.into()])
    }
}

impl From<f64> for Args {
    fn from(v: f64) -> Self {
        Self(vec![v.into()])
    }
}

impl From<&str> for Args {
    fn from(v: &str) -> Self {
        Self(vec![v.into()])
    }
}

impl From<String> for Args {
    fn from(v: String) -> Self {
        Self(vec![v.into()])
    }
}

/// One VALUES cell: a plain bound value, or a literal SQL expression that
/// still binds its value.
pub enum ValueArg {
    Plain(Value),
    Expr(String, Value),
}

impl<T: Into<Value>> From<T> for ValueArg {
    fn from(v: T) -> Self {
        Self::Plain(v.into())
    }
}

/// A VALUES cell rendering `rule` in place of the placeholder while still
/// binding `value`, e.g. `expr("LOWER(?)", "ABC")`.
pub fn expr(rule: impl Into<String>, value: impl Into<Value>) -> ValueArg {
    ValueArg::Expr(rule.into(), value.into())
}

#[cfg(test)]
mod tests;
