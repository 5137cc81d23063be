//! ERDDAP griddap queries: one URL per day selecting a single time instant
//! and a subsampled lon/lat box, saved as returned by the server.

use crate::adapters::http::{build_client, check_status};
use crate::adapters::storage::LocalStorage;
use crate::config::{GeoBounds, GriddapSource, Strides};
use crate::domain::model::RetrievalRequest;
use crate::domain::ports::{Fetcher, Storage};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use std::path::PathBuf;

pub struct GriddapFetcher {
    client: Client,
    source: GriddapSource,
    bounds: GeoBounds,
    strides: Strides,
}

impl GriddapFetcher {
    pub fn new(source: GriddapSource, bounds: GeoBounds, strides: Strides) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            source,
            bounds,
            strides,
        })
    }

    /// Query URL for `date`. Brackets are sent percent-encoded.
    pub fn build_url(&self, date: NaiveDate) -> String {
        let instant = format!("{}T{}Z", date.format("%Y-%m-%d"), self.source.time_of_day);
        let b = &self.bounds;

        let mut url = format!("{}?{}", self.source.base_url, self.source.variable);
        url += &format!("%5B({instant}):1:({instant})%5D");
        url += &format!("%5B({}):{}:({})%5D", b.lat_min, self.strides.lat, b.lat_max);
        url += &format!("%5B({}):{}:({})%5D", b.lon_min, self.strides.lon, b.lon_max);
        url
    }
}

#[async_trait]
impl Fetcher for GriddapFetcher {
    fn name(&self) -> &str {
        "griddap"
    }

    async fn fetch(&self, request: &RetrievalRequest) -> Result<PathBuf> {
        let url = self.build_url(request.date);
        tracing::debug!("Requesting {}", url);

        let response = check_status(self.client.get(&url).send().await?)?;
        let body = response.bytes().await?;
        tracing::debug!("Received {} bytes", body.len());

        let storage = LocalStorage::new(&request.output_dir);
        let destination = storage
            .write_file(&request.output_file_name(), &body)
            .await?;

        println!("  URL : {}", url);
        println!("  SAVE: {}", destination.display());
        Ok(destination)
    }
}
