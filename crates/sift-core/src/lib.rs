//! Schema index introspection.
//!
//! Reads index metadata table by table from a [`MetadataSource`], assembles
//! multi-column [`Index`] values, and tags each one with the primary key,
//! foreign key and unique constraints it backs.

pub mod associator;
pub mod collector;
pub mod config;
pub mod error;
pub mod schema;
pub mod snapshot;
pub mod source;

pub use associator::associate_indexes_with_constraints;
pub use collector::{
    GENERATED_INDEX_PREFIX, IndexCollector, MAX_INDEX_KEY_COLUMNS, collect_indexes_for_table,
};
pub use config::{ConfigError, SiftConfig};
pub use error::IntrospectError;
pub use schema::{
    ForeignKey, Index, IndexAssociation, PrimaryKey, Table, TableRef, UniqueConstraint,
};
pub use snapshot::{DatabaseInfo, Snapshot, capture_snapshot, read_indexes};
pub use source::{IndexRow, IndexType, MetadataSource, SourceCapabilities, SourceError};
