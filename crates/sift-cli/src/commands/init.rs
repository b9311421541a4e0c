//! `sift init` - write a default configuration file.

use sift_core::SiftConfig;
use std::fs;
use std::path::Path;

const HEADER: &str = "\
# sift configuration
#
# Do not store credentials here. Set upstream.database_url_env to the name of
# an environment variable holding the connection URL instead.
";

pub fn run(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        return Err(anyhow::anyhow!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        ));
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let mut config = SiftConfig::default();
    config.upstream.database_url_env = Some("DATABASE_URL".to_string());

    fs::write(path, format!("{}{}", HEADER, config.to_yaml()?))?;
    println!("Wrote config: {}", path.display());
    Ok(())
}
