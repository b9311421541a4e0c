use sift_core::config::IntrospectionConfig;
use sift_core::{Snapshot, capture_snapshot};

use crate::{PostgresSource, PostgresSourceOptions};

/// Introspect one Postgres schema into a [`Snapshot`].
///
/// Capability overrides from `config` are applied on top of the Postgres
/// defaults before any index is read.
pub async fn introspect_schema(
    database_url: &str,
    config: &IntrospectionConfig,
    mut options: PostgresSourceOptions,
) -> anyhow::Result<Snapshot> {
    options.capabilities = config.capabilities.apply(options.capabilities);
    let source = PostgresSource::connect(database_url, options).await?;

    let snapshot = capture_snapshot(&source, config).await?;
    source.pool().close().await;
    Ok(snapshot)
}
