// Adapters layer: one fetcher per kind of data service, plus the local output directory.

pub mod ftp_grib;
pub mod griddap;
pub mod http;
pub mod marine;
pub mod netcdf_writer;
pub mod storage;

pub use ftp_grib::FtpGribFetcher;
pub use griddap::GriddapFetcher;
pub use marine::MarineServiceFetcher;
pub use storage::LocalStorage;
