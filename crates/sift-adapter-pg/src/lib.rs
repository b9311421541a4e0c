//! Postgres [`MetadataSource`] backed by a `sqlx` connection pool.

use async_trait::async_trait;
use futures::TryStreamExt;
use sift_core::config::UpstreamConfig;
use sift_core::{
    ForeignKey, IndexRow, IndexType, MetadataSource, PrimaryKey, SourceCapabilities, SourceError,
    Table, TableRef, UniqueConstraint,
};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;

pub mod introspect;
mod queries;

use queries::{ConstraintColumn, group_constraint_columns};

/// Schemas that never hold user tables.
pub const SYSTEM_SCHEMAS: &[&str] = &["pg_catalog", "information_schema", "pg_toast"];

#[derive(Debug, Clone, Copy)]
pub struct PostgresSourceOptions {
    pub capabilities: SourceCapabilities,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl PostgresSourceOptions {
    /// Default quirks for Postgres: index rows are read straight from
    /// `pg_index`, which reports correct ordinals and named indexes.
    pub fn default_capabilities() -> SourceCapabilities {
        SourceCapabilities {
            direct_index_query: true,
            zero_ordinal_bug: false,
            blank_prefixed_generated_names: false,
        }
    }

    pub fn from_upstream(upstream: &UpstreamConfig) -> Self {
        Self {
            max_connections: upstream.pool.max_connections,
            acquire_timeout: Duration::from_secs(upstream.pool.acquire_timeout_seconds),
            ..Self::default()
        }
    }
}

impl Default for PostgresSourceOptions {
    fn default() -> Self {
        Self {
            capabilities: Self::default_capabilities(),
            max_connections: 2,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

pub struct PostgresSource {
    pool: PgPool,
    capabilities: SourceCapabilities,
}

impl PostgresSource {
    pub async fn connect(database_url: &str, options: PostgresSourceOptions) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(options.max_connections)
            .acquire_timeout(options.acquire_timeout)
            .connect(database_url)
            .await?;
        Ok(Self::from_pool(pool, options.capabilities))
    }

    pub fn from_pool(pool: PgPool, capabilities: SourceCapabilities) -> Self {
        Self { pool, capabilities }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn constraint_columns(
        &self,
        sql: &str,
        schema: &str,
    ) -> Result<Vec<ConstraintColumn>, SourceError> {
        let rows = sqlx::query(sql).bind(schema).fetch_all(&self.pool).await?;
        rows.iter()
            .map(|r| -> Result<ConstraintColumn, SourceError> {
                Ok(ConstraintColumn {
                    table_name: r.try_get("table_name")?,
                    constraint_name: r.try_get("constraint_name")?,
                    column_name: r.try_get("column_name")?,
                })
            })
            .collect()
    }
}

fn decode_index_row(row: &PgRow) -> Result<IndexRow, SourceError> {
    // The statistics row carries no index name.
    let index_name: Option<String> = row.try_get("index_name")?;
    let index_type: i16 = row.try_get("index_type")?;
    Ok(IndexRow {
        index_name: index_name.unwrap_or_default(),
        index_type: IndexType::from_code(index_type),
        column_name: row.try_get("column_name")?,
        ordinal_position: row.try_get("ordinal_position")?,
        non_unique: row.try_get("non_unique")?,
        filter_condition: row.try_get("filter_condition")?,
    })
}

#[async_trait]
impl MetadataSource for PostgresSource {
    fn engine(&self) -> &str {
        "postgres"
    }

    fn capabilities(&self) -> SourceCapabilities {
        self.capabilities
    }

    async fn version(&self) -> Result<String, SourceError> {
        let (version,): (String,) = sqlx::query_as("select version()")
            .fetch_one(&self.pool)
            .await?;
        Ok(version)
    }

    async fn tables(&self, schema: &str) -> Result<Vec<Table>, SourceError> {
        if SYSTEM_SCHEMAS.contains(&schema) {
            tracing::warn!(schema, "Refusing to introspect a system schema");
            return Ok(Vec::new());
        }

        let rows = sqlx::query(queries::TABLES)
            .bind(schema)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|r| -> Result<Table, SourceError> {
                let table_catalog: String = r.try_get("table_catalog")?;
                let table_schema: String = r.try_get("table_schema")?;
                let table_name: String = r.try_get("table_name")?;
                Ok(Table {
                    catalog: Some(table_catalog),
                    schema: Some(table_schema),
                    name: table_name,
                })
            })
            .collect()
    }

    async fn primary_keys(&self, schema: &str) -> Result<Vec<PrimaryKey>, SourceError> {
        let columns = self.constraint_columns(queries::PRIMARY_KEYS, schema).await?;
        Ok(group_constraint_columns(columns)
            .into_iter()
            .map(|(table_name, constraint_name, columns)| PrimaryKey {
                name: Some(constraint_name),
                table: TableRef::new(Some(schema), table_name),
                columns,
            })
            .collect())
    }

    async fn foreign_keys(&self, schema: &str) -> Result<Vec<ForeignKey>, SourceError> {
        let rows = sqlx::query(queries::FOREIGN_KEYS)
            .bind(schema)
            .fetch_all(&self.pool)
            .await?;

        let mut foreign_keys: Vec<ForeignKey> = Vec::new();
        for r in rows {
            let table_name: String = r.try_get("table_name")?;
            let constraint_name: String = r.try_get("constraint_name")?;
            let column_name: String = r.try_get("column_name")?;
            let foreign_table_schema: String = r.try_get("foreign_table_schema")?;
            let foreign_table_name: String = r.try_get("foreign_table_name")?;
            let foreign_column_name: String = r.try_get("foreign_column_name")?;

            // Rows arrive grouped by table and constraint, in column order.
            if let Some(fk) = foreign_keys
                .last_mut()
                .filter(|fk| fk.name == constraint_name && fk.table.name == table_name)
            {
                fk.columns.push(column_name);
                fk.referenced_columns.push(foreign_column_name);
                continue;
            }

            foreign_keys.push(ForeignKey {
                name: constraint_name,
                table: TableRef::new(Some(schema), table_name),
                columns: vec![column_name],
                references: TableRef::new(Some(&foreign_table_schema), foreign_table_name),
                referenced_columns: vec![foreign_column_name],
            });
        }
        Ok(foreign_keys)
    }

    async fn unique_constraints(&self, schema: &str) -> Result<Vec<UniqueConstraint>, SourceError> {
        let columns = self
            .constraint_columns(queries::UNIQUE_CONSTRAINTS, schema)
            .await?;
        Ok(group_constraint_columns(columns)
            .into_iter()
            .map(|(table_name, constraint_name, columns)| UniqueConstraint {
                name: constraint_name,
                table: TableRef::new(Some(schema), table_name),
                columns,
            })
            .collect())
    }

    async fn index_rows(&self, table: &Table, schema: &str) -> Result<Vec<IndexRow>, SourceError> {
        let sql = if self.capabilities.direct_index_query {
            queries::INDEX_COLUMNS_DIRECT
        } else {
            queries::INDEX_INFO
        };

        // Connection and cursor are both dropped on every return path below.
        let mut conn = self.pool.acquire().await?;
        let mut stream = sqlx::query(sql)
            .bind(schema)
            .bind(&table.name)
            .fetch(&mut *conn);

        let mut rows = Vec::new();
        while let Some(row) = stream.try_next().await? {
            rows.push(decode_index_row(&row)?);
        }

        tracing::trace!(table = %table.name, rows = rows.len(), "Fetched index rows");
        Ok(rows)
    }
}
