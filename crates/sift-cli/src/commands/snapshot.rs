//! `sift snapshot` - capture a schema snapshot as JSON.

use sift_core::SiftConfig;
use std::fs;
use std::path::Path;

pub async fn run(
    config: &SiftConfig,
    database_url: Option<&str>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let snapshot = super::capture(config, database_url).await?;
    let json = serde_json::to_vec_pretty(&snapshot.to_json()?)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, json)?;
            println!("Wrote schema snapshot: {}", path.display());
        }
        None => println!("{}", String::from_utf8(json)?),
    }

    Ok(())
}
