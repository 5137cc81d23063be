//! Managed marine data service (Copernicus Marine).
//!
//! A dataset is located through the service's STAC metadata: the product
//! collection links to one item per dataset version, and the item's `native`
//! asset points at the object-store folder holding the original files
//! (`https://host/bucket/native/PRODUCT/DATASET_VERSION`). Files for a date
//! are found by listing that folder and matching the keys, relative to
//! `native/PRODUCT/`, against a glob filter.

use crate::adapters::http::{build_client, check_status};
use crate::adapters::storage::LocalStorage;
use crate::config::{Credentials, MarineSource};
use crate::domain::model::{format_date, RetrievalRequest};
use crate::domain::ports::{Fetcher, Storage};
use crate::utils::error::{FetchError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use globset::Glob;
use regex::Regex;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;
use tokio::sync::OnceCell;
use url::Url;

static LISTING_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<Key>([^<]+)</Key>").expect("static pattern"));
static LISTING_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<NextContinuationToken>([^<]+)</NextContinuationToken>").expect("static pattern")
});

#[derive(Debug, Deserialize)]
struct StacCollection {
    #[serde(default)]
    links: Vec<StacLink>,
}

#[derive(Debug, Deserialize)]
struct StacLink {
    rel: String,
    href: String,
}

#[derive(Debug, Deserialize)]
struct StacItem {
    #[serde(default)]
    assets: HashMap<String, StacAsset>,
}

#[derive(Debug, Deserialize)]
struct StacAsset {
    href: String,
}

/// Where a dataset version's original files live in the object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeLocation {
    pub endpoint: String,
    pub bucket: String,
    /// `native/PRODUCT/`
    pub product_root: String,
    /// `DATASET_VERSION`
    pub dataset_dir: String,
}

impl NativeLocation {
    pub fn from_href(href: &str) -> Result<Self> {
        let catalog_error = |message: String| FetchError::CatalogError { message };

        let url = Url::parse(href).map_err(|e| catalog_error(format!("bad href {href}: {e}")))?;
        let mut segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|p| !p.is_empty()).collect())
            .unwrap_or_default();

        if segments.len() < 3 {
            return Err(catalog_error(format!(
                "native href {href} does not look like bucket/.../dataset"
            )));
        }
        let bucket = segments.remove(0).to_string();
        let dataset_dir = segments.pop().unwrap_or_default().to_string();

        Ok(Self {
            endpoint: url.origin().ascii_serialization(),
            bucket,
            product_root: format!("{}/", segments.join("/")),
            dataset_dir,
        })
    }

    pub fn dataset_prefix(&self) -> String {
        format!("{}{}/", self.product_root, self.dataset_dir)
    }

    pub fn list_url(&self) -> String {
        format!("{}/{}", self.endpoint, self.bucket)
    }

    pub fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key)
    }
}

/// Fills `{yyyy}`, `{mm}`, `{dd}` and `{date}` in a filter template.
pub fn render_filter(template: &str, date: NaiveDate) -> String {
    template
        .replace("{yyyy}", &date.format("%Y").to_string())
        .replace("{mm}", &date.format("%m").to_string())
        .replace("{dd}", &date.format("%d").to_string())
        .replace("{date}", &format_date(date))
}

/// Literal directories of a `*/...` filter below the dataset folder, used to
/// narrow the listing. `*/2024/01/*_20240101_*.nc` gives `2024/01/`.
pub fn listing_subdir(filter: &str) -> &str {
    let Some(rest) = filter.strip_prefix("*/") else {
        return "";
    };
    let literal_end = rest
        .find(['*', '?', '[', '{'])
        .unwrap_or(rest.len());
    match rest[..literal_end].rfind('/') {
        Some(idx) => &rest[..=idx],
        None => "",
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub keys: Vec<String>,
    pub next_token: Option<String>,
}

fn unescape_xml(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Pulls keys and the continuation token out of a `ListObjectsV2` response.
pub fn parse_listing(body: &str) -> ListingPage {
    ListingPage {
        keys: LISTING_KEY
            .captures_iter(body)
            .map(|c| unescape_xml(&c[1]))
            .collect(),
        next_token: LISTING_TOKEN
            .captures(body)
            .map(|c| unescape_xml(&c[1])),
    }
}

pub struct MarineServiceFetcher {
    client: Client,
    source: MarineSource,
    credentials: Credentials,
    location: OnceCell<NativeLocation>,
}

impl MarineServiceFetcher {
    pub fn new(source: MarineSource, credentials: Credentials) -> Result<Self> {
        if credentials.is_empty() {
            tracing::warn!("No marine service credentials configured; requests are anonymous");
        }
        Ok(Self {
            client: build_client()?,
            source,
            credentials,
            location: OnceCell::new(),
        })
    }

    /// Object-store requests stay unsigned; the user is only identified.
    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.credentials.username {
            Some(user) => builder.header("x-cop-user", user),
            None => builder,
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T> {
        tracing::debug!("Fetching metadata {}", url);
        let response = check_status(self.client.get(url).send().await?)?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn resolve_location(&self) -> Result<NativeLocation> {
        let product_url = format!(
            "{}/{}/product.stac.json",
            self.source.stac_url.trim_end_matches('/'),
            self.source.product_id
        );
        let product: StacCollection = self.get_json(&product_url).await?;

        let wanted = format!("{}_", self.source.dataset_id);
        let item_href = product
            .links
            .iter()
            .filter(|link| link.rel == "item")
            .filter_map(|link| {
                let dir = link.href.split('/').next()?;
                let version = dir.strip_prefix(&wanted)?;
                let is_version = !version.is_empty() && version.bytes().all(|b| b.is_ascii_digit());
                is_version.then_some((version, &link.href))
            })
            .max_by(|a, b| a.0.cmp(b.0))
            .map(|(_, href)| href.clone())
            .ok_or_else(|| FetchError::CatalogError {
                message: format!(
                    "dataset {} not found in product {}",
                    self.source.dataset_id, self.source.product_id
                ),
            })?;

        let item_url = Url::parse(&product_url)
            .and_then(|base| base.join(&item_href))
            .map_err(|e| FetchError::CatalogError {
                message: format!("bad item link {item_href}: {e}"),
            })?;
        let item: StacItem = self.get_json(item_url.as_str()).await?;

        let native = item.assets.get("native").ok_or_else(|| FetchError::CatalogError {
            message: format!("dataset {} has no native files", self.source.dataset_id),
        })?;
        let location = NativeLocation::from_href(&native.href)?;
        tracing::info!(
            "📡 {} resolved to {}/{}",
            self.source.dataset_id,
            location.list_url(),
            location.dataset_prefix()
        );
        Ok(location)
    }

    async fn list_keys(&self, location: &NativeLocation, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let mut query = vec![("list-type", "2".to_string()), ("prefix", prefix.to_string())];
            if let Some(token) = &token {
                query.push(("continuation-token", token.clone()));
            }

            let request = self.client.get(location.list_url()).query(&query);
            let response = check_status(self.authorized(request).send().await?)?;
            let page = parse_listing(&response.text().await?);
            keys.extend(page.keys);

            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        tracing::debug!("{} objects under {}", keys.len(), prefix);
        Ok(keys)
    }
}

#[async_trait]
impl Fetcher for MarineServiceFetcher {
    fn name(&self) -> &str {
        "marine"
    }

    async fn fetch(&self, request: &RetrievalRequest) -> Result<PathBuf> {
        let location = self
            .location
            .get_or_try_init(|| self.resolve_location())
            .await?;

        let filter = render_filter(&self.source.filter, request.date);
        let matcher = Glob::new(&filter)?.compile_matcher();
        let prefix = format!("{}{}", location.dataset_prefix(), listing_subdir(&filter));

        let keys = self.list_keys(location, &prefix).await?;
        let mut matches: Vec<&String> = keys
            .iter()
            .filter(|key| {
                key.strip_prefix(&location.product_root)
                    .is_some_and(|relative| matcher.is_match(relative))
            })
            .collect();
        matches.sort();

        let key = matches.first().ok_or_else(|| FetchError::NoMatchingFile {
            dataset_id: self.source.dataset_id.clone(),
            filter: filter.clone(),
        })?;
        if matches.len() > 1 {
            tracing::warn!("{} files match {}; using {}", matches.len(), filter, key);
        }

        let url = location.object_url(key);
        tracing::info!("⬇️  Downloading {}", url);
        let response = check_status(self.authorized(self.client.get(&url)).send().await?)?;
        let body = response.bytes().await?;

        let storage = LocalStorage::new(&request.output_dir);
        let original_name = key.rsplit('/').next().unwrap_or(key.as_str());
        let downloaded = storage.write_file(original_name, &body).await?;
        storage
            .rename_into(&downloaded, &request.output_file_name())
            .await
    }
}
