//! Dynamic scalar values.
//!
//! `Value` is the one currency the engine trades in: bound arguments travel
//! from entities into statements as `Value`s, and decoded result cells travel
//! back out the same way. It covers the scalar set the mapped schemas use;
//! anything outside it surfaces as a decode error rather than being guessed
//! at.

use crate::error::{OrmError, OrmResult};
use bytes::BytesMut;
use std::fmt;
use tokio_postgres::types::{IsNull, ToSql, Type};

/// A dynamically typed scalar used for bound arguments and decoded cells.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Decode one cell of a driver row.
    ///
    /// NULL decodes to [`Value::Null`] regardless of column type; temporal
    /// types decode to their canonical text rendering.
    pub(crate) fn from_pg(row: &tokio_postgres::Row, idx: usize) -> OrmResult<Self> {
        let column = &row.columns()[idx];
        let name = column.name();
        let ty = column.type_();

        fn cell<'a, T>(
            row: &'a tokio_postgres::Row,
            idx: usize,
            name: &str,
        ) -> OrmResult<Option<T>>
        where
            T: tokio_postgres::types::FromSql<'a>,
        {
            row.try_get::<_, Option<T>>(idx)
                .map_err(|e| OrmError::decode(name, e.to_string()))
        }

        let value = if *ty == Type::BOOL {
            cell::<bool>(row, idx, name)?.map(Value::Bool)
        } else if *ty == Type::INT2 {
            cell::<i16>(row, idx, name)?.map(|v| Value::Int(v.into()))
        } else if *ty == Type::INT4 {
            cell::<i32>(row, idx, name)?.map(|v| Value::Int(v.into()))
        } else if *ty == Type::INT8 {
            cell::<i64>(row, idx, name)?.map(Value::Int)
        } else if *ty == Type::OID {
            cell::<u32>(row, idx, name)?.map(|v| Value::Int(v.into()))
        } else if *ty == Type::FLOAT4 {
            cell::<f32>(row, idx, name)?.map(|v| Value::Float(v.into()))
        } else if *ty == Type::FLOAT8 {
            cell::<f64>(row, idx, name)?.map(Value::Float)
        } else if *ty == Type::TEXT || *ty == Type::VARCHAR || *ty == Type::BPCHAR || *ty == Type::NAME {
            cell::<String>(row, idx, name)?.map(Value::Text)
        } else if *ty == Type::BYTEA {
            cell::<Vec<u8>>(row, idx, name)?.map(Value::Bytes)
        } else if *ty == Type::DATE {
            cell::<chrono::NaiveDate>(row, idx, name)?.map(|v| Value::Text(v.to_string()))
        } else if *ty == Type::TIME {
            cell::<chrono::NaiveTime>(row, idx, name)?.map(|v| Value::Text(v.to_string()))
        } else if *ty == Type::TIMESTAMP {
            cell::<chrono::NaiveDateTime>(row, idx, name)?.map(|v| Value::Text(v.to_string()))
        } else if *ty == Type::TIMESTAMPTZ {
            cell::<chrono::DateTime<chrono::Utc>>(row, idx, name)?
                .map(|v| Value::Text(v.to_rfc3339()))
        } else {
            return Err(OrmError::decode(
                name,
                format!("unsupported column type '{ty}'"),
            ));
        };

        Ok(value.unwrap_or(Value::Null))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
            Self::Bytes(v) => write!(f, "<{} bytes>", v.len()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Self::Int(v.into())
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self {
            Self::Null => Ok(IsNull::Yes),
            Self::Bool(v) => v.to_sql(ty, out),
            Self::Int(v) => {
                // Narrow to the column's integer width when the backend asks
                // for one; the statement text carries no type information.
                if *ty == Type::INT2 {
                    (*v as i16).to_sql(ty, out)
                } else if *ty == Type::INT4 {
                    (*v as i32).to_sql(ty, out)
                } else if *ty == Type::FLOAT4 {
                    (*v as f32).to_sql(ty, out)
                } else if *ty == Type::FLOAT8 {
                    (*v as f64).to_sql(ty, out)
                } else {
                    v.to_sql(ty, out)
                }
            }
            Self::Float(v) => {
                if *ty == Type::FLOAT4 {
                    (*v as f32).to_sql(ty, out)
                } else {
                    v.to_sql(ty, out)
                }
            }
            Self::Text(v) => v.to_sql(ty, out),
            Self::Bytes(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        // The value is dynamically typed; mismatches surface as driver
        // errors at bind time rather than being rejected up front.
        true
    }

    tokio_postgres::types::to_sql_checked!();
}
