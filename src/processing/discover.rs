//! Endpoint discovery across compute, run and storage.

use crate::error::{ApiError, DiscoverError, SourceKind};
use crate::gcp::{compute_addresses, run_addresses, storage_addresses, GcpClient};
use crate::models::Address;
use itertools::Itertools;

/// Fetch all three sources concurrently and merge them.
///
/// The first failing source cancels the others and fails the whole run.
pub async fn discover(client: &GcpClient, project: &str) -> Result<Vec<Address>, DiscoverError> {
    log::info!("#Start discover() project={project}");
    let fetch = |kind: SourceKind| move |error: ApiError| DiscoverError::Fetch { kind, error };

    let (compute, run, storage) = tokio::try_join!(
        async {
            compute_addresses(client, project)
                .await
                .map_err(fetch(SourceKind::Compute))
        },
        async {
            run_addresses(client, project)
                .await
                .map_err(fetch(SourceKind::Run))
        },
        async {
            storage_addresses(client, project)
                .await
                .map_err(fetch(SourceKind::Storage))
        },
    )?;

    let addresses = merge_addresses(vec![compute, run, storage]);
    let duplicates = duplicate_regions(&addresses);
    if !duplicates.is_empty() {
        log::warn!("region labels from more than one source: {duplicates:?}");
    }
    log::info!("discovered {} addresses", addresses.len());
    Ok(addresses)
}

/// Concatenate per-source results and sort by region.
///
/// The sort is stable and nothing is de-duplicated: two sources reporting the
/// same region label both stay, in source order.
pub fn merge_addresses(sources: Vec<Vec<Address>>) -> Vec<Address> {
    let mut addresses: Vec<Address> = sources.into_iter().flatten().collect();
    addresses.sort_by(|a, b| a.region.cmp(&b.region));
    addresses
}

/// Region labels that appear more than once.
pub fn duplicate_regions(addresses: &[Address]) -> Vec<&str> {
    addresses
        .iter()
        .map(|a| a.region.as_str())
        .duplicates()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Endpoints;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn compute_ok() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": {"regions/us-east1": {"addresses": [{"address": "1.2.3.4"}]}}
        }))
    }

    fn run_ok() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [
                {
                    "metadata": {
                        "name": "ping",
                        "labels": {"cloud.googleapis.com/location": "us-central1"}
                    },
                    "status": {"address": {"url": "https://svc.example"}}
                },
                {
                    "metadata": {
                        "name": "admin",
                        "labels": {"cloud.googleapis.com/location": "us-central1"}
                    },
                    "status": {"address": {"url": "https://admin.example"}}
                }
            ]
        }))
    }

    fn storage_ok() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [
                {"id": "gcping-eu", "location": "EU"},
                {"id": "logs-eu", "location": "EU"}
            ]
        }))
    }

    async fn mount_sources(
        server: &MockServer,
        compute: ResponseTemplate,
        run: ResponseTemplate,
        storage: ResponseTemplate,
    ) {
        Mock::given(method("GET"))
            .and(path("/compute/v1/projects/p/aggregated/addresses"))
            .respond_with(compute)
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/run/v1/projects/p/locations/-/services"))
            .respond_with(run)
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/storage/v1/b"))
            .respond_with(storage)
            .mount(server)
            .await;
    }

    #[test]
    fn test_merge_sorts_by_region() {
        let merged = merge_addresses(vec![
            vec![Address::new("us-east1", "http://1.2.3.4")],
            vec![Address::new("us-central1-cloudrun", "https://svc.example")],
            vec![Address::new("eu-storage", "https://storage.googleapis.com/gcping-eu")],
        ]);
        let regions: Vec<&str> = merged.iter().map(|a| a.region.as_str()).collect();
        assert_eq!(regions, vec!["eu-storage", "us-central1-cloudrun", "us-east1"]);
    }

    #[test]
    fn test_merge_keeps_duplicates_in_source_order() {
        let merged = merge_addresses(vec![
            vec![Address::new("us-east1", "http://1.1.1.1")],
            vec![Address::new("asia-east1", "http://3.3.3.3")],
            vec![Address::new("us-east1", "http://2.2.2.2")],
        ]);
        assert_eq!(
            merged,
            vec![
                Address::new("asia-east1", "http://3.3.3.3"),
                Address::new("us-east1", "http://1.1.1.1"),
                Address::new("us-east1", "http://2.2.2.2"),
            ]
        );
        assert_eq!(duplicate_regions(&merged), vec!["us-east1"]);
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge_addresses(vec![vec![], vec![], vec![]]).is_empty());
    }

    #[tokio::test]
    async fn test_discover_fixture_order() {
        let server = MockServer::start().await;
        mount_sources(&server, compute_ok(), run_ok(), storage_ok()).await;

        let client = GcpClient::new("t", Endpoints::with_base(&server.uri())).unwrap();
        let addresses = discover(&client, "p").await.unwrap();
        assert_eq!(
            addresses,
            vec![
                Address::new("eu-storage", "https://storage.googleapis.com/gcping-eu"),
                Address::new("us-central1-cloudrun", "https://svc.example"),
                Address::new("us-east1", "http://1.2.3.4"),
            ]
        );
    }

    #[tokio::test]
    async fn test_discover_malformed_json_is_fatal() {
        let server = MockServer::start().await;
        mount_sources(
            &server,
            ResponseTemplate::new(200).set_body_string("{\"items\": {\"regions/us-east1\": [}"),
            run_ok(),
            storage_ok(),
        )
        .await;

        let client = GcpClient::new("t", Endpoints::with_base(&server.uri())).unwrap();
        let err = discover(&client, "p").await.unwrap_err();
        match err {
            DiscoverError::Fetch { kind, .. } => assert_eq!(kind, SourceKind::Compute),
        }
    }

    #[tokio::test]
    async fn test_discover_http_error_is_fatal() {
        let server = MockServer::start().await;
        mount_sources(
            &server,
            ResponseTemplate::new(500).set_body_string("backend"),
            run_ok(),
            storage_ok(),
        )
        .await;

        let client = GcpClient::new("t", Endpoints::with_base(&server.uri())).unwrap();
        let err = discover(&client, "p").await.unwrap_err();
        assert!(err.to_string().starts_with("compute addresses:"));
    }

    #[tokio::test]
    async fn test_discover_run_failure_is_fatal() {
        let server = MockServer::start().await;
        mount_sources(
            &server,
            compute_ok(),
            ResponseTemplate::new(503).set_body_string("unavailable"),
            storage_ok(),
        )
        .await;

        let client = GcpClient::new("t", Endpoints::with_base(&server.uri())).unwrap();
        let err = discover(&client, "p").await.unwrap_err();
        match err {
            DiscoverError::Fetch { kind, error } => {
                assert_eq!(kind, SourceKind::Run);
                assert_eq!(error.status(), Some(503));
            }
        }
    }

    #[tokio::test]
    async fn test_discover_storage_malformed_json_is_fatal() {
        let server = MockServer::start().await;
        mount_sources(
            &server,
            compute_ok(),
            run_ok(),
            ResponseTemplate::new(200).set_body_string("{\"items\": [{\"id\": 7}]}"),
        )
        .await;

        let client = GcpClient::new("t", Endpoints::with_base(&server.uri())).unwrap();
        let err = discover(&client, "p").await.unwrap_err();
        match err {
            DiscoverError::Fetch { kind, error } => {
                assert_eq!(kind, SourceKind::Storage);
                assert!(matches!(error, ApiError::Decode { .. }), "{error:?}");
            }
        }
    }
}
