use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;

use crate::district::FeatureCollection;

use super::{decode_dataset, BoundaryDataProvider};

/// Datasets fetched from a web server, e.g. the site's own static assets.
pub struct HttpProvider {
    base_url: String,
    client: Client,
}

impl HttpProvider {
    /// `base_url` is joined with the dataset path, e.g. "https://example.org".
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("gerryscore/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { base_url: base_url.into().trim_end_matches('/').to_string(), client })
    }

    /// Full URL of a dataset path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl BoundaryDataProvider for HttpProvider {
    fn load_dataset(&self, path: &str) -> Result<FeatureCollection> {
        let url = self.url(path);
        let response = self.client.get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .with_context(|| format!("GET {url}"))?;

        let status = response.status();
        if !status.is_success() {
            bail!("HTTP {status} fetching {url}");
        }

        let bytes = response.bytes().with_context(|| format!("read body {url}"))?;
        decode_dataset(path, &bytes)
    }
}
