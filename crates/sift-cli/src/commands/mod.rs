//! CLI command implementations.

pub mod indexes;
pub mod init;
pub mod snapshot;

use sift_adapter_pg::PostgresSourceOptions;
use sift_core::{SiftConfig, Snapshot};

/// Capture a snapshot using the configured upstream, or `database_url` when
/// given on the command line.
pub(crate) async fn capture(
    config: &SiftConfig,
    database_url: Option<&str>,
) -> anyhow::Result<Snapshot> {
    let url = match database_url {
        Some(url) => url.to_string(),
        None => config.upstream.resolve_url()?,
    };

    tracing::info!(
        schema = %config.introspection.schema,
        url_from_env = database_url.is_none() && config.upstream.url_from_env(),
        "Connecting to upstream database"
    );

    let options = PostgresSourceOptions::from_upstream(&config.upstream);
    sift_adapter_pg::introspect::introspect_schema(&url, &config.introspection, options).await
}
