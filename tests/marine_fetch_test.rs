use chrono::NaiveDate;
use httpmock::prelude::*;
use ocean_fetch::config::{Credentials, MarineSource, SourceSpec};
use ocean_fetch::{app, Cadence, DateWindow, FetchConfig, FetchError, Product};
use tempfile::TempDir;

const DAY1_KEY: &str = "native/PROD/DS_202311/2024/01/nrt_global_allsat_phy_l4_20240101_20240107.nc";
const DAY2_KEY: &str = "native/PROD/DS_202311/2024/01/nrt_global_allsat_phy_l4_20240102_20240108.nc";

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn listing_xml(keys: &[&str], next_token: Option<&str>) -> String {
    let contents: String = keys
        .iter()
        .map(|key| format!("  <Contents><Key>{key}</Key></Contents>\n"))
        .collect();
    let truncation = match next_token {
        Some(token) => format!(
            "  <IsTruncated>true</IsTruncated>\n  <NextContinuationToken>{token}</NextContinuationToken>\n"
        ),
        None => "  <IsTruncated>false</IsTruncated>\n".to_string(),
    };
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<ListBucketResult>\n  <Name>mdl-native-14</Name>\n{truncation}{contents}</ListBucketResult>"
    )
}

/// True when the request carries no `Authorization` header.
fn without_authorization(req: &HttpMockRequest) -> bool {
    req.headers
        .as_ref()
        .map_or(true, |headers| {
            headers
                .iter()
                .all(|(name, _)| !name.eq_ignore_ascii_case("authorization"))
        })
}

fn without_continuation_token(req: &HttpMockRequest) -> bool {
    req.query_params
        .as_ref()
        .map_or(true, |params| params.iter().all(|(name, _)| name != "continuation-token"))
}

struct Catalog {
    product: httpmock::Mock<'static>,
    item: httpmock::Mock<'static>,
}

fn mock_catalog(server: &'static MockServer) -> Catalog {
    let product = server.mock(|when, then| {
        when.method(GET).path("/metadata/PROD/product.stac.json");
        then.status(200).json_body(serde_json::json!({
            "id": "PROD",
            "links": [
                {"rel": "root", "href": "../catalog.stac.json"},
                {"rel": "item", "href": "DS_202211/dataset.stac.json"},
                {"rel": "item", "href": "DS_202311/dataset.stac.json"},
                {"rel": "item", "href": "DS_other_202401/dataset.stac.json"}
            ]
        }));
    });

    let item = server.mock(|when, then| {
        when.method(GET).path("/metadata/PROD/DS_202311/dataset.stac.json");
        then.status(200).json_body(serde_json::json!({
            "id": "DS_202311",
            "assets": {
                "native": {"href": server.url("/mdl-native-14/native/PROD/DS_202311")}
            }
        }));
    });

    Catalog { product, item }
}

/// Single-page listing of January 2024 holding both daily files.
fn mock_listing(server: &'static MockServer) -> httpmock::Mock<'static> {
    server.mock(|when, then| {
        when.method(GET)
            .path("/mdl-native-14")
            .query_param("list-type", "2")
            .query_param("prefix", "native/PROD/DS_202311/2024/01/")
            .matches(without_authorization);
        then.status(200)
            .header("Content-Type", "application/xml")
            .body(listing_xml(&[DAY2_KEY, DAY1_KEY], None));
    })
}

fn marine_config(server: &MockServer, output_dir: &std::path::Path) -> FetchConfig {
    let mut config = FetchConfig::for_product(Product::SshNrt);
    config.output_dir = output_dir.to_path_buf();
    config.credentials = Credentials::new("someone", "s3cret");
    config.source = SourceSpec::Marine(MarineSource {
        stac_url: server.url("/metadata"),
        product_id: "PROD".to_string(),
        dataset_id: "DS".to_string(),
        filter: "*/{yyyy}/{mm}/*_{date}_*.nc".to_string(),
    });
    config
}

fn leak_server() -> &'static MockServer {
    Box::leak(Box::new(MockServer::start()))
}

#[tokio::test]
async fn test_downloads_and_renames_each_day() {
    let temp_dir = TempDir::new().unwrap();
    let server = leak_server();
    let catalog = mock_catalog(server);
    let listing = mock_listing(server);

    let day1 = server.mock(|when, then| {
        when.method(GET)
            .path(format!("/mdl-native-14/{DAY1_KEY}"))
            .header("x-cop-user", "someone")
            .matches(without_authorization);
        then.status(200).body("day one");
    });
    let day2 = server.mock(|when, then| {
        when.method(GET).path(format!("/mdl-native-14/{DAY2_KEY}"));
        then.status(200).body("day two");
    });

    let config = marine_config(server, temp_dir.path());
    let window = DateWindow::new(ymd(2024, 1, 1), ymd(2024, 1, 2), Cadence::Daily);
    let written = app::run(&config, &window, false).await.unwrap();

    // the catalog is resolved once per run, the listing once per day
    catalog.product.assert_hits(1);
    catalog.item.assert_hits(1);
    listing.assert_hits(2);
    day1.assert();
    day2.assert();

    assert_eq!(written.len(), 2);
    let out1 = temp_dir.path().join("SSH_NRT_0p25_20240101.nc");
    let out2 = temp_dir.path().join("SSH_NRT_0p25_20240102.nc");
    assert_eq!(std::fs::read_to_string(out1).unwrap(), "day one");
    assert_eq!(std::fs::read_to_string(out2).unwrap(), "day two");

    // originals were renamed, not copied
    assert!(!temp_dir
        .path()
        .join("nrt_global_allsat_phy_l4_20240101_20240107.nc")
        .exists());
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 2);
}

#[tokio::test]
async fn test_missing_file_for_date_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let server = leak_server();
    let _catalog = mock_catalog(server);
    let _listing = mock_listing(server);

    let config = marine_config(server, temp_dir.path());
    let window = DateWindow::new(ymd(2024, 1, 5), ymd(2024, 1, 5), Cadence::Daily);
    let err = app::run(&config, &window, false).await.unwrap_err();

    match err {
        FetchError::NoMatchingFile { dataset_id, filter } => {
            assert_eq!(dataset_id, "DS");
            assert_eq!(filter, "*/2024/01/*_20240105_*.nc");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_unknown_dataset_is_catalog_error() {
    let temp_dir = TempDir::new().unwrap();
    let server = leak_server();
    let _catalog = mock_catalog(server);
    let _listing = mock_listing(server);

    let mut config = marine_config(server, temp_dir.path());
    if let SourceSpec::Marine(source) = &mut config.source {
        source.dataset_id = "cmems_unknown".to_string();
    }
    let window = DateWindow::new(ymd(2024, 1, 1), ymd(2024, 1, 1), Cadence::Daily);
    let err = app::run(&config, &window, false).await.unwrap_err();

    assert!(matches!(err, FetchError::CatalogError { .. }));
}

#[tokio::test]
async fn test_rejected_credentials_stop_the_run() {
    let temp_dir = TempDir::new().unwrap();
    let server = leak_server();
    let _catalog = mock_catalog(server);
    let _listing = mock_listing(server);

    server.mock(|when, then| {
        when.method(GET).path(format!("/mdl-native-14/{DAY1_KEY}"));
        then.status(403);
    });

    let config = marine_config(server, temp_dir.path());
    let window = DateWindow::new(ymd(2024, 1, 1), ymd(2024, 1, 2), Cadence::Daily);
    let err = app::run(&config, &window, false).await.unwrap_err();

    assert!(matches!(err, FetchError::HttpStatus { code: 403, .. }));
    assert!(err.recovery_suggestion().contains("COPERNICUSMARINE_SERVICE_USERNAME"));
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_listing_follows_continuation_token() {
    let temp_dir = TempDir::new().unwrap();
    let server = leak_server();
    let _catalog = mock_catalog(server);

    let first_page = server.mock(|when, then| {
        when.method(GET)
            .path("/mdl-native-14")
            .query_param("list-type", "2")
            .query_param("prefix", "native/PROD/DS_202311/2024/01/")
            .matches(without_continuation_token);
        then.status(200)
            .body(listing_xml(&[DAY1_KEY], Some("page-2")));
    });
    let second_page = server.mock(|when, then| {
        when.method(GET)
            .path("/mdl-native-14")
            .query_param("prefix", "native/PROD/DS_202311/2024/01/")
            .query_param("continuation-token", "page-2");
        then.status(200).body(listing_xml(&[DAY2_KEY], None));
    });
    let day2 = server.mock(|when, then| {
        when.method(GET).path(format!("/mdl-native-14/{DAY2_KEY}"));
        then.status(200).body("day two");
    });

    let config = marine_config(server, temp_dir.path());
    let window = DateWindow::new(ymd(2024, 1, 2), ymd(2024, 1, 2), Cadence::Daily);
    let written = app::run(&config, &window, false).await.unwrap();

    first_page.assert_hits(1);
    second_page.assert_hits(1);
    day2.assert();
    assert_eq!(written, vec![temp_dir.path().join("SSH_NRT_0p25_20240102.nc")]);
    assert_eq!(std::fs::read_to_string(&written[0]).unwrap(), "day two");
}
