//! Attribute-oriented statement engine for PostgreSQL.
//!
//! Applications talk in entity and attribute names (`Order`, `customerId`);
//! the engine resolves them to tables and columns through a configurable
//! metadata strategy (live catalog introspection or declarative schema
//! files) and turns chained builder calls into parameterized SQL executed
//! over `tokio_postgres`.
//!
//! ```no_run
//! use attrsql::{EntitySource, PgClient, SourceConfig};
//!
//! # async fn demo() -> attrsql::OrmResult<()> {
//! let client = PgClient::connect("host=localhost user=app dbname=shop").await?;
//! let source = EntitySource::connect(client, &SourceConfig::catalog()).await?;
//!
//! let rows = source
//!     .select_all()
//!     .from("Order")
//!     .where_cond("total > ?", 100.0)
//!     .order_by_desc("total")
//!     .limit(10)
//!     .exec()
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod driver;
pub mod entity;
pub mod error;
pub mod mapping;
pub mod query;
pub mod row;
pub mod source;
pub mod value;

pub use config::{MapperStrategy, SourceConfig};
pub use driver::{PgClient, SqlDriver};
pub use entity::{unknown_attribute, Entity};
pub use error::{OrmError, OrmResult};
pub use mapping::{build_mapper, AttributeMapper, CatalogMapper, EntityMapping, SchemaMapper};
pub use query::{expr, Args, DeleteQuery, InsertQuery, SelectQuery, UpdateQuery, ValueArg};
pub use row::Row;
pub use source::EntitySource;
pub use value::Value;
