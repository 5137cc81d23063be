#[cfg(feature = "cli")]
pub mod cli;
pub mod products;
pub mod toml_config;

use crate::domain::model::Cadence;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub use products::Product;

pub const USERNAME_ENV: &str = "COPERNICUSMARINE_SERVICE_USERNAME";
pub const PASSWORD_ENV: &str = "COPERNICUSMARINE_SERVICE_PASSWORD";

/// Login for the managed marine service. Never logged in clear.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    pub fn from_env() -> Self {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            username: read(USERNAME_ENV),
            password: read(PASSWORD_ENV),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_none()
    }

    /// Fields set in `other` win.
    pub fn merge(&mut self, other: Credentials) {
        if other.username.is_some() {
            self.username = other.username;
        }
        if other.password.is_some() {
            self.password = other.password;
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Longitude/latitude limits in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl GeoBounds {
    pub const GLOBAL: GeoBounds = GeoBounds {
        lon_min: -179.99,
        lon_max: 180.00,
        lat_min: -89.99,
        lat_max: 89.99,
    };
}

impl Default for GeoBounds {
    fn default() -> Self {
        Self::GLOBAL
    }
}

/// Grid subsampling for gridded queries: every n-th point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strides {
    pub lon: usize,
    pub lat: usize,
}

impl Default for Strides {
    fn default() -> Self {
        Self { lon: 1, lat: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarineSource {
    pub stac_url: String,
    pub product_id: String,
    pub dataset_id: String,
    /// Glob over `DATASET_VERSION/...` paths; `{yyyy}`, `{mm}`, `{dd}` and
    /// `{date}` are replaced per request.
    pub filter: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GriddapSource {
    pub base_url: String,
    pub variable: String,
    /// `HH:MM:SS` of the daily analysis instant.
    pub time_of_day: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FtpGribSource {
    /// Directory holding the `nsst.{yyyymmdd}` folders, with trailing slash.
    pub base_url: String,
    pub file_name: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceSpec {
    Marine(MarineSource),
    Griddap(GriddapSource),
    FtpGrib(FtpGribSource),
}

impl SourceSpec {
    /// Identifier shown in logs and carried in each request.
    pub fn identifier(&self) -> &str {
        match self {
            SourceSpec::Marine(m) => &m.dataset_id,
            SourceSpec::Griddap(g) => &g.base_url,
            SourceSpec::FtpGrib(f) => &f.file_name,
        }
    }
}

/// Everything one run needs, passed explicitly instead of living in globals.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchConfig {
    pub prefix: String,
    pub output_dir: PathBuf,
    pub cadence: Cadence,
    /// Largest number of positional date arguments accepted.
    pub max_args: usize,
    pub credentials: Credentials,
    pub source: SourceSpec,
    pub bounds: Option<GeoBounds>,
    pub strides: Strides,
}

impl FetchConfig {
    pub fn bounds_or_global(&self) -> GeoBounds {
        self.bounds.unwrap_or(GeoBounds::GLOBAL)
    }
}

impl Validate for FetchConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_prefix("prefix", &self.prefix)?;
        validation::validate_path("output_dir", &self.output_dir.to_string_lossy())?;
        validation::validate_positive_number("max_args", self.max_args, 1)?;

        match &self.source {
            SourceSpec::Marine(m) => {
                validation::validate_url("source.stac_url", &m.stac_url, &["http", "https"])?;
                validation::validate_non_empty_string("source.product_id", &m.product_id)?;
                validation::validate_non_empty_string("source.dataset_id", &m.dataset_id)?;
                validation::validate_non_empty_string("source.filter", &m.filter)?;
            }
            SourceSpec::Griddap(g) => {
                validation::validate_url("source.base_url", &g.base_url, &["http", "https"])?;
                validation::validate_non_empty_string("source.variable", &g.variable)?;
                let bounds = self.bounds_or_global();
                validation::validate_range("region.lon_min", bounds.lon_min, -180.0, 360.0)?;
                validation::validate_range("region.lon_max", bounds.lon_max, -180.0, 360.0)?;
                validation::validate_range("region.lat_min", bounds.lat_min, -90.0, 90.0)?;
                validation::validate_range("region.lat_max", bounds.lat_max, -90.0, 90.0)?;
                validation::validate_ordered("region.lon", bounds.lon_min, bounds.lon_max)?;
                validation::validate_ordered("region.lat", bounds.lat_min, bounds.lat_max)?;
                validation::validate_positive_number("region.lon_stride", self.strides.lon, 1)?;
                validation::validate_positive_number("region.lat_stride", self.strides.lat, 1)?;
            }
            SourceSpec::FtpGrib(f) => {
                validation::validate_url("source.base_url", &f.base_url, &["ftp"])?;
                validation::validate_non_empty_string("source.file_name", &f.file_name)?;
            }
        }
        Ok(())
    }
}
