//! RTG-SST-HR analysis: a grib2 file from an anonymous FTP archive,
//! converted to NetCDF. The archive only keeps the last two days.

use crate::adapters::netcdf_writer::{write_sst_netcdf, TemperatureGrid};
use crate::adapters::storage::LocalStorage;
use crate::config::FtpGribSource;
use crate::domain::model::{format_date, RetrievalRequest};
use crate::domain::ports::{Fetcher, Storage};
use crate::utils::error::{FetchError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use grib::codetables::{CodeTable4_2, Lookup};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use suppaftp::tokio::AsyncFtpStream;
use suppaftp::types::FileType;
use url::Url;

const TEMPERATURE: &str = "Temperature";

pub struct FtpGribFetcher {
    source: FtpGribSource,
}

impl FtpGribFetcher {
    pub fn new(source: FtpGribSource) -> Self {
        Self { source }
    }

    pub fn build_url(&self, date: NaiveDate) -> String {
        format!(
            "{}nsst.{}/{}",
            self.source.base_url,
            format_date(date),
            self.source.file_name
        )
    }

    async fn download(&self, url: &str, destination: &Path) -> Result<()> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidConfigValueError {
            field: "source.base_url".to_string(),
            value: url.to_string(),
            reason: e.to_string(),
        })?;
        let host = parsed.host_str().ok_or_else(|| FetchError::MissingConfigError {
            field: "source.base_url host".to_string(),
        })?;
        let port = parsed.port().unwrap_or(21);
        let (dir, file) = parsed.path().rsplit_once('/').unwrap_or(("", parsed.path()));

        tracing::debug!("Connecting to {}:{}", host, port);
        let mut ftp_stream = AsyncFtpStream::connect(format!("{host}:{port}")).await?;
        ftp_stream.login("anonymous", "anonymous").await?;
        ftp_stream.transfer_type(FileType::Binary).await?;
        if !dir.is_empty() {
            ftp_stream.cwd(dir).await?;
        }

        let mut reader = ftp_stream.retr_as_stream(file).await?;
        let mut out = tokio::fs::File::create(destination).await?;
        let copied = tokio::io::copy(&mut reader, &mut out).await?;
        ftp_stream.finalize_retr_stream(reader).await?;
        ftp_stream.quit().await?;

        tracing::debug!("Retrieved {} bytes", copied);
        Ok(())
    }
}

/// Reads the first `Temperature` field of a grib2 file together with the
/// latitude and longitude of every grid point.
pub fn decode_temperature(path: &Path) -> Result<TemperatureGrid> {
    let reader = BufReader::new(File::open(path)?);
    let grib2 = grib::from_reader(reader)?;

    for (_index, submessage) in grib2.iter() {
        let discipline = submessage.indicator().discipline;
        let (Some(category), Some(parameter)) = (
            submessage.prod_def().parameter_category(),
            submessage.prod_def().parameter_number(),
        ) else {
            continue;
        };
        let name = CodeTable4_2::new(discipline, category)
            .lookup(usize::from(parameter))
            .to_string();
        if name != TEMPERATURE {
            continue;
        }

        let (nx, ny) = submessage.grid_shape()?;
        let (latitude, longitude): (Vec<f32>, Vec<f32>) = submessage.latlons()?.unzip();
        let decoder = grib::Grib2SubmessageDecoder::from(submessage)?;
        let values: Vec<f32> = decoder.dispatch()?.collect();

        let grid = TemperatureGrid {
            nx,
            ny,
            longitude,
            latitude,
            values,
        };
        grid.check_shape()?;
        return Ok(grid);
    }

    Err(FetchError::ProcessingError {
        message: format!("no {} field in {}", TEMPERATURE, path.display()),
    })
}

#[async_trait]
impl Fetcher for FtpGribFetcher {
    fn name(&self) -> &str {
        "ftp-grib2"
    }

    async fn fetch(&self, request: &RetrievalRequest) -> Result<PathBuf> {
        let url = self.build_url(request.date);
        let storage = LocalStorage::new(&request.output_dir);
        storage.ensure_dir().await?;
        let grib_path = storage.path_for(&self.source.file_name);

        println!("---- Download the data");
        if let Err(e) = self.download(&url, &grib_path).await {
            // no partial downloads left behind
            let _ = storage.remove_file(&grib_path).await;
            return Err(e);
        }
        println!("  URL : {}", url);
        println!("  SAVE: {}", grib_path.display());

        println!("---- Read the grib2 file");
        let nc_path = request.output_path();
        convert_to_netcdf(&grib_path, &nc_path, &self.source.title, &request.date_str()).await?;
        Ok(nc_path)
    }
}

/// Decodes `grib_path` and writes `nc_path` on the blocking pool. The grib
/// file is always removed afterwards; a partially written `nc_path` is
/// removed when the write fails.
pub async fn convert_to_netcdf(grib_path: &Path, nc_path: &Path, title: &str, date: &str) -> Result<()> {
    let converted = {
        let grib_path = grib_path.to_path_buf();
        let nc_path = nc_path.to_path_buf();
        let title = title.to_string();
        let date = date.to_string();

        tokio::task::spawn_blocking(move || -> Result<()> {
            let grid = decode_temperature(&grib_path)?;
            tracing::debug!("Temperature grid {}x{}", grid.ny, grid.nx);

            println!("---- Write the NetCDF file");
            write_sst_netcdf(&nc_path, &grid, &title, &date).inspect_err(|_| {
                let _ = std::fs::remove_file(&nc_path);
            })
        })
        .await
        .unwrap_or_else(|e| {
            Err(FetchError::ProcessingError {
                message: format!("grib2 conversion task failed: {}", e),
            })
        })
    };

    if let Err(e) = tokio::fs::remove_file(grib_path).await {
        tracing::warn!("Could not remove {}: {}", grib_path.display(), e);
    }
    converted
}
