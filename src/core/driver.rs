use crate::config::FetchConfig;
use crate::domain::model::{DateWindow, RetrievalRequest};
use crate::domain::ports::Fetcher;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::Instrument;

/// Walks a date window and fetches one file per step, strictly in order.
/// The first failure ends the run; files already written stay in place.
pub struct DatedFetchDriver<F: Fetcher> {
    fetcher: F,
    source: String,
    output_dir: PathBuf,
    prefix: String,
    monitor: SystemMonitor,
}

impl<F: Fetcher> DatedFetchDriver<F> {
    pub fn new(fetcher: F, config: &FetchConfig) -> Self {
        Self::new_with_monitoring(fetcher, config, false)
    }

    pub fn new_with_monitoring(fetcher: F, config: &FetchConfig, monitor_enabled: bool) -> Self {
        Self {
            fetcher,
            source: config.source.identifier().to_string(),
            output_dir: config.output_dir.clone(),
            prefix: config.prefix.clone(),
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn request_for(&self, date: NaiveDate) -> RetrievalRequest {
        RetrievalRequest {
            source: self.source.clone(),
            date,
            output_dir: self.output_dir.clone(),
            prefix: self.prefix.clone(),
        }
    }

    pub async fn run(&self, window: &DateWindow) -> Result<Vec<PathBuf>> {
        tracing::info!(
            "🚀 {} from {} to {} ({:?}) into {}",
            self.source,
            window.start,
            window.end,
            window.cadence,
            self.output_dir.display()
        );

        let mut written = Vec::new();
        for date in window.dates() {
            let request = self.request_for(date);
            let date_str = request.date_str();

            println!("----Processing data for {}", date_str);
            let span = tracing::info_span!("fetch", date = %date_str, fetcher = self.fetcher.name());
            let path = self
                .fetcher
                .fetch(&request)
                .instrument(span)
                .await
                .inspect_err(|e| tracing::error!("❌ {} failed: {}", date_str, e))?;

            self.monitor.record_file(&date_str, &path);
            tracing::debug!("Saved {}", path.display());
            println!("     Data download completed.");
            println!();

            written.push(path);
        }

        self.monitor.log_final_stats();
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Product;
    use crate::domain::model::Cadence;
    use crate::utils::error::FetchError;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingFetcher {
        calls: Arc<Mutex<Vec<NaiveDate>>>,
        fail_on: Option<NaiveDate>,
    }

    impl RecordingFetcher {
        fn calls(&self) -> Vec<NaiveDate> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for RecordingFetcher {
        fn name(&self) -> &str {
            "recording"
        }

        async fn fetch(&self, request: &RetrievalRequest) -> Result<PathBuf> {
            self.calls.lock().unwrap().push(request.date);
            if Some(request.date) == self.fail_on {
                return Err(FetchError::HttpStatus {
                    code: 404,
                    reason: "Not Found".to_string(),
                    url: "http://localhost/missing".to_string(),
                });
            }
            Ok(request.output_path())
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_five_day_range_fetches_five_times_in_order() {
        let fetcher = RecordingFetcher::default();
        let config = FetchConfig::for_product(Product::SstGhrsst);
        let driver = DatedFetchDriver::new(fetcher.clone(), &config);

        let window = DateWindow::new(ymd(2024, 1, 1), ymd(2024, 1, 5), Cadence::Daily);
        let written = driver.run(&window).await.unwrap();

        assert_eq!(
            fetcher.calls(),
            (1..=5).map(|d| ymd(2024, 1, d)).collect::<Vec<_>>()
        );
        assert_eq!(written.len(), 5);
        assert!(written[0].ends_with("SST_GHRSST_0p01_20240101.nc"));
        assert!(written[4].ends_with("SST_GHRSST_0p01_20240105.nc"));
    }

    #[test]
    fn test_three_week_range_fetches_three_times() {
        let fetcher = RecordingFetcher::default();
        let config = FetchConfig::for_product(Product::SssSmosOi);
        let driver = DatedFetchDriver::new(fetcher.clone(), &config);

        let window = DateWindow::new(ymd(2024, 1, 1), ymd(2024, 1, 15), Cadence::Weekly);
        tokio_test::block_on(driver.run(&window)).unwrap();

        let calls = fetcher.calls();
        assert_eq!(calls, vec![ymd(2024, 1, 1), ymd(2024, 1, 8), ymd(2024, 1, 15)]);
        assert!(calls.windows(2).all(|w| (w[1] - w[0]).num_days() == 7));
    }

    #[tokio::test]
    async fn test_failure_stops_the_run() {
        let fetcher = RecordingFetcher {
            fail_on: Some(ymd(2024, 1, 3)),
            ..Default::default()
        };
        let config = FetchConfig::for_product(Product::SshNrt);
        let driver = DatedFetchDriver::new(fetcher.clone(), &config);

        let window = DateWindow::new(ymd(2024, 1, 1), ymd(2024, 1, 5), Cadence::Daily);
        let err = driver.run(&window).await.unwrap_err();

        assert!(matches!(err, FetchError::HttpStatus { code: 404, .. }));
        assert_eq!(
            fetcher.calls(),
            vec![ymd(2024, 1, 1), ymd(2024, 1, 2), ymd(2024, 1, 3)]
        );
    }

    #[test]
    fn test_request_carries_config() {
        let mut config = FetchConfig::for_product(Product::SwhNrt);
        config.output_dir = PathBuf::from("/data/swh");
        let driver = DatedFetchDriver::new(RecordingFetcher::default(), &config);

        let request = driver.request_for(ymd(2024, 6, 30));
        assert_eq!(request.source, "cmems_obs-wave_glo_phy-swh_nrt_multi-l4-2deg_P1D");
        assert_eq!(
            request.output_path(),
            PathBuf::from("/data/swh/SWH_NRT_2p00_20240630.nc")
        );
    }
}
