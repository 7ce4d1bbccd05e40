pub mod diagnose;
pub mod score;

use std::path::PathBuf;

use anyhow::Result;
use gerryscore::{BoundaryDataProvider, DiskProvider};

use crate::cli::SourceArgs;

/// Data directory named on the command line, or the working directory.
pub fn data_dir(source: &SourceArgs) -> PathBuf {
    source.data.clone().unwrap_or(".".into())
}

/// Local datasets, with an HTTP fallback when a base URL is given.
pub fn provider(source: &SourceArgs) -> Result<Box<dyn BoundaryDataProvider>> {
    let disk = DiskProvider::new(data_dir(source));

    #[cfg(feature = "download")]
    if let Some(base_url) = &source.base_url {
        let http = gerryscore::HttpProvider::new(base_url.as_str())?;
        return Ok(Box::new(gerryscore::FallbackProvider::new(disk, http)));
    }

    Ok(Box::new(disk))
}
