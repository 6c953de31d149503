//! Storage layer
//!
//! The catalogue lives in a SQLite database. It is read in one go into a
//! [`Library`](crate::library::Library) snapshot; all resolution and
//! formatting then runs against the snapshot.

pub mod catalogue;
pub mod error;
pub mod schema;

pub use catalogue::SqliteCatalogue;
pub use error::{StorageError, StorageResult};
pub use schema::{init_schema, needs_init, SCHEMA_VERSION};
