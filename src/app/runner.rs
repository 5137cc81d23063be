use crate::adapters::{FtpGribFetcher, GriddapFetcher, MarineServiceFetcher};
use crate::config::{FetchConfig, SourceSpec};
use crate::core::DatedFetchDriver;
use crate::domain::model::DateWindow;
use crate::utils::error::Result;
use std::path::PathBuf;

/// Picks the fetcher for the configured source and runs it over `window`.
pub async fn run(config: &FetchConfig, window: &DateWindow, monitor: bool) -> Result<Vec<PathBuf>> {
    match &config.source {
        SourceSpec::Marine(source) => {
            let fetcher = MarineServiceFetcher::new(source.clone(), config.credentials.clone())?;
            DatedFetchDriver::new_with_monitoring(fetcher, config, monitor)
                .run(window)
                .await
        }
        SourceSpec::Griddap(source) => {
            let fetcher =
                GriddapFetcher::new(source.clone(), config.bounds_or_global(), config.strides)?;
            DatedFetchDriver::new_with_monitoring(fetcher, config, monitor)
                .run(window)
                .await
        }
        SourceSpec::FtpGrib(source) => {
            let fetcher = FtpGribFetcher::new(source.clone());
            DatedFetchDriver::new_with_monitoring(fetcher, config, monitor)
                .run(window)
                .await
        }
    }
}

#[cfg(feature = "cli")]
pub use cli_entry::run_product;

#[cfg(feature = "cli")]
mod cli_entry {
    use super::run;
    use crate::config::cli::DownloadArgs;
    use crate::config::Product;
    use crate::core::dates::resolve_window;
    use crate::utils::error::FetchError;
    use crate::utils::logger;
    use crate::utils::validation::Validate;

    /// Full command-line flow for one product. Returns the process exit code.
    pub async fn run_product(product: Product, args: DownloadArgs) -> i32 {
        let file_config = match args.load_file_config() {
            Ok(file_config) => file_config,
            Err(e) => {
                eprintln!("❌ Failed to load config file: {}", e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                return 1;
            }
        };

        // 初始化日誌
        let verbose = args.verbose || file_config.as_ref().is_some_and(|f| f.verbose());
        if args.log_json || file_config.as_ref().is_some_and(|f| f.json_logging()) {
            logger::init_json_logger(verbose);
        } else {
            logger::init_cli_logger(verbose);
        }

        let config = match args.build_config(product, file_config.as_ref()) {
            Ok(config) => config,
            Err(e) => return report(&e),
        };
        tracing::debug!("Run config: {:?}", config);

        // 驗證配置
        if let Err(e) = config.validate() {
            tracing::error!("❌ Configuration validation failed: {}", e);
            return report(&e);
        }

        let today = chrono::Local::now().date_naive();
        let window = match resolve_window(&args.dates, today, config.cadence, config.max_args) {
            Ok(window) => window,
            Err(e) => {
                println!("Invalid input format.");
                println!("{}", product.usage());
                tracing::debug!("{}", e);
                return e.exit_code();
            }
        };
        tracing::info!("Resolved window {} .. {}", window.start, window.end);

        match run(&config, &window, args.monitor).await {
            Ok(written) => {
                tracing::info!("✅ {} file(s) written for {}", written.len(), product);
                0
            }
            Err(e) => report(&e),
        }
    }

    fn report(e: &FetchError) -> i32 {
        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("{}", e.user_friendly_message());
        e.exit_code()
    }
}
