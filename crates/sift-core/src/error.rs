//! Error types for snapshot capture.

use thiserror::Error;

use crate::schema::TableRef;
use crate::source::SourceError;

/// Errors that can occur while introspecting a schema.
#[derive(Debug, Error)]
pub enum IntrospectError {
    /// The metadata source failed to answer for one table.
    #[error("failed to read index metadata for {table}: {source}")]
    MetadataAccess {
        table: TableRef,
        #[source]
        source: SourceError,
    },

    /// The metadata source failed a schema-wide catalog query.
    #[error("failed to read {what} for schema {schema}: {source}")]
    CatalogQuery {
        what: &'static str,
        schema: String,
        #[source]
        source: SourceError,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntrospectError {
    pub fn metadata_access(table: TableRef, source: SourceError) -> Self {
        IntrospectError::MetadataAccess { table, source }
    }

    pub fn catalog_query(what: &'static str, schema: &str, source: SourceError) -> Self {
        IntrospectError::CatalogQuery {
            what,
            schema: schema.to_string(),
            source,
        }
    }
}
