use super::{Credentials, FetchConfig, GeoBounds, SourceSpec};
use crate::domain::model::Cadence;
use crate::utils::error::{FetchError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]+)\}").expect("static pattern")
});

/// Optional overrides loaded from a TOML file. Every section and field may
/// be omitted; omitted values keep the product preset.
///
/// ```toml
/// [output]
/// directory = "/data/ssh"
///
/// [credentials]
/// username = "${COPERNICUSMARINE_SERVICE_USERNAME}"
/// password = "${COPERNICUSMARINE_SERVICE_PASSWORD}"
///
/// [region]
/// lon_min = -77.97
/// lon_max = -56.85
/// lat_min = 31.84
/// lat_max = 46.15
/// lon_stride = 10
/// lat_stride = 10
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    pub output: Option<OutputSection>,
    pub credentials: Option<Credentials>,
    pub source: Option<SourceSection>,
    pub region: Option<RegionSection>,
    pub logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSection {
    pub directory: Option<PathBuf>,
    pub prefix: Option<String>,
    pub cadence: Option<Cadence>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceSection {
    /// STAC root (marine), griddap dataset URL or FTP directory.
    pub url: Option<String>,
    pub product_id: Option<String>,
    pub dataset_id: Option<String>,
    pub filter: Option<String>,
    pub variable: Option<String>,
    pub time_of_day: Option<String>,
    pub file_name: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegionSection {
    pub lon_min: Option<f64>,
    pub lon_max: Option<f64>,
    pub lat_min: Option<f64>,
    pub lat_max: Option<f64>,
    pub lon_stride: Option<usize>,
    pub lat_stride: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSection {
    pub json: Option<bool>,
    pub verbose: Option<bool>,
}

fn set<T>(target: &mut T, value: &Option<T>)
where
    T: Clone,
{
    if let Some(v) = value {
        *target = v.clone();
    }
}

impl FileConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FetchError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| FetchError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${COPERNICUSMARINE_SERVICE_PASSWORD})
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn json_logging(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }

    pub fn verbose(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.verbose).unwrap_or(false)
    }

    /// Applies the overrides on top of a product preset.
    pub fn apply(&self, config: &mut FetchConfig) -> Result<()> {
        if let Some(output) = &self.output {
            set(&mut config.output_dir, &output.directory);
            set(&mut config.prefix, &output.prefix);
            set(&mut config.cadence, &output.cadence);
        }

        if let Some(credentials) = &self.credentials {
            let unresolved = |v: &Option<String>| v.as_deref().is_some_and(|s| s.contains("${"));
            if unresolved(&credentials.username) || unresolved(&credentials.password) {
                return Err(FetchError::MissingConfigError {
                    field: "credentials (environment variable not set)".to_string(),
                });
            }
            config.credentials.merge(credentials.clone());
        }

        if let Some(source) = &self.source {
            match &mut config.source {
                SourceSpec::Marine(m) => {
                    set(&mut m.stac_url, &source.url);
                    set(&mut m.product_id, &source.product_id);
                    set(&mut m.dataset_id, &source.dataset_id);
                    set(&mut m.filter, &source.filter);
                }
                SourceSpec::Griddap(g) => {
                    set(&mut g.base_url, &source.url);
                    set(&mut g.variable, &source.variable);
                    set(&mut g.time_of_day, &source.time_of_day);
                }
                SourceSpec::FtpGrib(f) => {
                    set(&mut f.base_url, &source.url);
                    set(&mut f.file_name, &source.file_name);
                    set(&mut f.title, &source.title);
                }
            }
        }

        if let Some(region) = &self.region {
            let mut bounds: GeoBounds = config.bounds_or_global();
            set(&mut bounds.lon_min, &region.lon_min);
            set(&mut bounds.lon_max, &region.lon_max);
            set(&mut bounds.lat_min, &region.lat_min);
            set(&mut bounds.lat_max, &region.lat_max);
            config.bounds = Some(bounds);
            set(&mut config.strides.lon, &region.lon_stride);
            set(&mut config.strides.lat, &region.lat_stride);
        }

        Ok(())
    }
}
