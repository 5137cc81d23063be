use super::toml_config::FileConfig;
use super::{Credentials, FetchConfig, Product};
use crate::utils::error::Result;
use clap::{Args, Parser};
use std::path::PathBuf;

/// Arguments shared by every downloader binary.
#[derive(Debug, Clone, Args)]
pub struct DownloadArgs {
    /// [start_date] [end_date] | [date] in yyyymmdd format; today when omitted
    #[arg(value_name = "DATE")]
    pub dates: Vec<String>,

    /// Directory the NetCDF files are written to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// TOML file with overrides (output, credentials, source, region)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Log CPU and memory usage after every file
    #[arg(long)]
    pub monitor: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

/// Command line of a single-product binary.
#[derive(Debug, Clone, Parser)]
#[command(about = "Download one oceanographic product as {prefix}_{yyyymmdd}.nc files")]
pub struct ProductCli {
    #[command(flatten)]
    pub args: DownloadArgs,
}

/// Command line of the `ocean-fetch` binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "ocean-fetch")]
#[command(about = "Download oceanographic satellite products as NetCDF files")]
pub struct OceanFetchCli {
    /// Product to download
    #[arg(short, long, value_enum)]
    pub product: Product,

    #[command(flatten)]
    pub args: DownloadArgs,
}

impl DownloadArgs {
    pub fn load_file_config(&self) -> Result<Option<FileConfig>> {
        self.config.as_ref().map(FileConfig::from_file).transpose()
    }

    /// Product preset, then environment credentials, then the config file,
    /// then command-line flags.
    pub fn build_config(&self, product: Product, file: Option<&FileConfig>) -> Result<FetchConfig> {
        let mut config = FetchConfig::for_product(product);
        config.credentials.merge(Credentials::from_env());

        if let Some(file) = file {
            file.apply(&mut config)?;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        Ok(config)
    }
}
