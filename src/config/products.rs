use super::{
    Credentials, FetchConfig, FtpGribSource, GeoBounds, GriddapSource, MarineSource, SourceSpec,
    Strides,
};
use crate::domain::model::Cadence;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub const MARINE_STAC_URL: &str = "https://stac.marine.copernicus.eu/metadata";
pub const GHRSST_GRIDDAP_URL: &str = "https://coastwatch.pfeg.noaa.gov/erddap/griddap/jplMURSST41.nc";
pub const RTGHR_FTP_URL: &str = "ftp://ftpprd.ncep.noaa.gov/pub/data/nccf/com/nsst/v1.2/";

/// The products this tool knows how to download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum Product {
    /// Sea surface height anomaly, 0.25°, daily (near real time)
    SshNrt,
    /// Sea surface salinity SMOS-OI, 0.25°, weekly
    SssSmosOi,
    /// Sea surface temperature OSTIA, 0.05°, daily
    SstOstia,
    /// Significant wave height, 2°, daily (near real time)
    SwhNrt,
    /// Sea surface temperature GHRSST MUR, 0.01°, daily
    SstGhrsst,
    /// Sea surface temperature RTG-SST-HR, 0.083°, last two days only
    SstRtghr,
}

impl Product {
    pub const ALL: [Product; 6] = [
        Product::SshNrt,
        Product::SssSmosOi,
        Product::SstOstia,
        Product::SwhNrt,
        Product::SstGhrsst,
        Product::SstRtghr,
    ];

    pub fn prefix(&self) -> &'static str {
        match self {
            Product::SshNrt => "SSH_NRT_0p25",
            Product::SssSmosOi => "SSS_SMOS-OI_0p25",
            Product::SstOstia => "SST_OSTIA_0p05",
            Product::SwhNrt => "SWH_NRT_2p00",
            Product::SstGhrsst => "SST_GHRSST_0p01",
            Product::SstRtghr => "SST_RTGHR_0p083",
        }
    }

    pub fn binary_name(&self) -> &'static str {
        match self {
            Product::SshNrt => "download_ssh_nrt_0p25",
            Product::SssSmosOi => "download_sss_smos_oi_0p25",
            Product::SstOstia => "download_sst_ostia_0p05",
            Product::SwhNrt => "download_swh_nrt_2p00",
            Product::SstGhrsst => "download_sst_ghrsst_0p01",
            Product::SstRtghr => "download_sst_rtghr_0p083",
        }
    }

    pub fn cadence(&self) -> Cadence {
        match self {
            Product::SssSmosOi => Cadence::Weekly,
            _ => Cadence::Daily,
        }
    }

    /// Usage text printed on malformed arguments.
    pub fn usage(&self) -> String {
        let bin = self.binary_name();
        if *self == Product::SstRtghr {
            return format!(
                "Usage: {bin} [date]\n       {bin}\n\nArguments:\n  date          Single date in yyyymmdd format (optional, defaults to current date)\n\nExample:\n  {bin} 20240105\n"
            );
        }
        format!(
            "Usage: {bin} [start_date] [end_date]\n       {bin} [date]\n       {bin}\n\nArguments:\n  start_date    Start date in yyyymmdd format\n  end_date      End date in yyyymmdd format (optional, defaults to start_date)\n  date          Single date in yyyymmdd format (optional, defaults to current date)\n\nExample:\n  {bin} 20240101 20240105\n"
        )
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

fn marine(product_id: &str, dataset_id: &str, filter: &str) -> SourceSpec {
    SourceSpec::Marine(MarineSource {
        stac_url: MARINE_STAC_URL.to_string(),
        product_id: product_id.to_string(),
        dataset_id: dataset_id.to_string(),
        filter: filter.to_string(),
    })
}

impl FetchConfig {
    /// Preset for `product`, writing to the current directory. Credentials
    /// are left empty; callers fill them from the environment or a file.
    pub fn for_product(product: Product) -> Self {
        let mut bounds = None;
        let mut strides = Strides::default();

        let source = match product {
            // https://doi.org/10.48670/moi-00149
            Product::SshNrt => marine(
                "SEALEVEL_GLO_PHY_L4_NRT_008_046",
                "cmems_obs-sl_glo_phy-ssh_nrt_allsat-l4-duacs-0.25deg_P1D",
                "*/{yyyy}/{mm}/*_{date}_*.nc",
            ),
            Product::SssSmosOi => marine(
                "MULTIOBS_GLO_PHY_SSS_L4_MY_015_015",
                "cmems_obs-mob_glo_phy-sss_my_multi-oi_P1W",
                "*/{yyyy}/*_{date}T000000_*.nc",
            ),
            // https://doi.org/10.48670/moi-00165
            Product::SstOstia => marine(
                "SST_GLO_SST_L4_NRT_OBSERVATIONS_010_001",
                "METOFFICE-GLO-SST-L4-NRT-OBS-SST-V2",
                "*/{yyyy}/{mm}/{date}*.nc",
            ),
            // https://doi.org/10.48670/moi-00180
            Product::SwhNrt => marine(
                "WAVE_GLO_PHY_SWH_L4_NRT_014_003",
                "cmems_obs-wave_glo_phy-swh_nrt_multi-l4-2deg_P1D",
                "*/{yyyy}/{mm}/*_{date}T120000Z_*.nc",
            ),
            Product::SstGhrsst => {
                // Gulf of Maine to Cape Hatteras
                bounds = Some(GeoBounds {
                    lon_min: -77.97,
                    lon_max: -56.85,
                    lat_min: 31.84,
                    lat_max: 46.15,
                });
                strides = Strides { lon: 10, lat: 10 };
                SourceSpec::Griddap(GriddapSource {
                    base_url: GHRSST_GRIDDAP_URL.to_string(),
                    variable: "analysed_sst".to_string(),
                    time_of_day: "09:00:00".to_string(),
                })
            }
            Product::SstRtghr => SourceSpec::FtpGrib(FtpGribSource {
                base_url: RTGHR_FTP_URL.to_string(),
                file_name: "rtgssthr_grb_0.083_awips.grib2".to_string(),
                title: "RTGHR SST".to_string(),
            }),
        };

        Self {
            prefix: product.prefix().to_string(),
            output_dir: PathBuf::from("./"),
            cadence: product.cadence(),
            max_args: if product == Product::SstRtghr { 1 } else { 2 },
            credentials: Credentials::default(),
            source,
            bounds,
            strides,
        }
    }
}
