//! Command-line interface module.

mod args;

pub use args::{Cli, Commands};

use anyhow::Result;
use std::fs;

use crate::config::IconConfig;
use crate::log;

/// Delete everything this tool caches: the hash record, the normalized-icon
/// cache and the scratch directory. Outputs are left alone; the next build
/// regenerates everything.
pub fn clean_caches(config: &IconConfig) -> Result<()> {
    let record = config.paths.cache_dir.join(crate::cache::CACHE_FILE);
    if record.exists() {
        fs::remove_file(&record)?;
    }
    for dir in [config.normalized_dir(), config.scratch_dir()] {
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
    }
    log!("clean"; "cache cleared: {}", config.paths.cache_dir.display());
    Ok(())
}
