pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{DownloadArgs, OceanFetchCli, ProductCli};

pub use adapters::LocalStorage;
pub use config::{FetchConfig, Product};
pub use core::{dates::resolve_window, DatedFetchDriver};
pub use domain::model::{output_file_name, Cadence, DateWindow, RetrievalRequest};
pub use domain::ports::{Fetcher, Storage};
pub use utils::error::{FetchError, Result};
