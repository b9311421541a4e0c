//! Schema snapshots: everything discovered about one schema at one point in
//! time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::associator::associate_indexes_with_constraints;
use crate::collector::collect_indexes_for_table;
use crate::config::IntrospectionConfig;
use crate::error::IntrospectError;
use crate::schema::{ForeignKey, Index, PrimaryKey, Table, TableRef, UniqueConstraint};
use crate::source::MetadataSource;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub captured_at: DateTime<Utc>,
    pub database: DatabaseInfo,
    pub schema: String,
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub primary_keys: Vec<PrimaryKey>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
    #[serde(default)]
    pub unique_constraints: Vec<UniqueConstraint>,
    #[serde(default)]
    pub indexes: Vec<Index>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    pub kind: String,
    pub version: String,
}

impl Snapshot {
    pub fn new(schema: impl Into<String>, database: DatabaseInfo) -> Self {
        Self {
            captured_at: Utc::now(),
            database,
            schema: schema.into(),
            tables: Vec::new(),
            primary_keys: Vec::new(),
            foreign_keys: Vec::new(),
            unique_constraints: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Indexes owned by `table` (case-insensitive on the name).
    pub fn indexes_for<'a>(&'a self, table: &'a TableRef) -> impl Iterator<Item = &'a Index> + 'a {
        self.indexes.iter().filter(move |i| i.table.same_name(table))
    }

    /// Indexes that back no constraint.
    pub fn standalone_indexes(&self) -> impl Iterator<Item = &Index> {
        self.indexes.iter().filter(|i| !i.is_associated())
    }

    pub fn find_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Re-run constraint association over every index in the snapshot.
    pub fn associate_indexes(&mut self) {
        associate_indexes_with_constraints(
            &mut self.indexes,
            &self.primary_keys,
            &self.foreign_keys,
            &self.unique_constraints,
        );
    }

    pub fn to_json(&self) -> Result<serde_json::Value, IntrospectError> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Read the indexes of every table in `snapshot`, in table order, then tag
/// them with the constraints already present in the snapshot.
///
/// Fails on the first table whose metadata cannot be read.
pub async fn read_indexes<S>(snapshot: &mut Snapshot, source: &S) -> Result<(), IntrospectError>
where
    S: MetadataSource + ?Sized,
{
    tracing::info!(
        engine = source.engine(),
        schema = %snapshot.schema,
        tables = snapshot.tables.len(),
        "Reading indexes"
    );

    for table in &snapshot.tables {
        let indexes = collect_indexes_for_table(table, &snapshot.schema, source).await?;
        tracing::debug!(table = %table.name, count = indexes.len(), "Collected indexes");
        snapshot.indexes.extend(indexes);
    }

    snapshot.associate_indexes();
    Ok(())
}

/// Capture a complete snapshot of `config.schema` from `source`.
pub async fn capture_snapshot<S>(
    source: &S,
    config: &IntrospectionConfig,
) -> Result<Snapshot, IntrospectError>
where
    S: MetadataSource + ?Sized,
{
    let schema = config.schema.as_str();

    let version = source
        .version()
        .await
        .map_err(|e| IntrospectError::catalog_query("version", schema, e))?;

    let mut snapshot = Snapshot::new(
        schema,
        DatabaseInfo {
            kind: source.engine().to_string(),
            version,
        },
    );

    let tables = source
        .tables(schema)
        .await
        .map_err(|e| IntrospectError::catalog_query("tables", schema, e))?;
    snapshot.tables = tables
        .into_iter()
        .filter(|t| !config.is_table_excluded(&t.name))
        .collect();

    let included = |table: &TableRef| !config.is_table_excluded(&table.name);

    snapshot.primary_keys = source
        .primary_keys(schema)
        .await
        .map_err(|e| IntrospectError::catalog_query("primary keys", schema, e))?
        .into_iter()
        .filter(|pk| included(&pk.table))
        .collect();

    snapshot.foreign_keys = source
        .foreign_keys(schema)
        .await
        .map_err(|e| IntrospectError::catalog_query("foreign keys", schema, e))?
        .into_iter()
        .filter(|fk| included(&fk.table))
        .collect();

    snapshot.unique_constraints = source
        .unique_constraints(schema)
        .await
        .map_err(|e| IntrospectError::catalog_query("unique constraints", schema, e))?
        .into_iter()
        .filter(|uc| included(&uc.table))
        .collect();

    read_indexes(&mut snapshot, source).await?;

    tracing::info!(
        tables = snapshot.tables.len(),
        indexes = snapshot.indexes.len(),
        standalone = snapshot.standalone_indexes().count(),
        "Captured schema snapshot"
    );

    Ok(snapshot)
}
