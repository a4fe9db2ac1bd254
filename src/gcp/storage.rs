//! Cloud Storage bucket listing.

use super::http::{GcpClient, Paged};
use crate::config::{BUCKET_PREFIX, STORAGE_PUBLIC_HOST};
use crate::error::ApiError;
use crate::models::Address;
use serde::Deserialize;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct BucketList {
    #[serde(default)]
    pub items: Vec<Bucket>,
    pub next_page_token: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct Bucket {
    pub id: String,
    #[serde(default)]
    pub location: String,
}

impl Paged for BucketList {
    fn next_page_token(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Keep the `gcping-` buckets, labelled `<location>-storage`.
pub fn normalize_buckets(list: BucketList) -> Vec<Address> {
    list.items
        .into_iter()
        .filter(|b| b.id.starts_with(BUCKET_PREFIX))
        .map(|b| {
            Address::new(
                format!("{}-storage", b.location.to_lowercase()),
                format!("{STORAGE_PUBLIC_HOST}/{}", b.id),
            )
        })
        .collect()
}

/// Fetch the buckets of `project`.
pub async fn storage_addresses(
    client: &GcpClient,
    project: &str,
) -> Result<Vec<Address>, ApiError> {
    let url = format!("{}/b", client.endpoints.storage);
    let pages: Vec<BucketList> = client.get_pages(&url, &[("project", project)]).await?;
    let addresses: Vec<Address> = pages.into_iter().flat_map(normalize_buckets).collect();
    log::info!("storage: {} addresses", addresses.len());
    Ok(addresses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Endpoints;
    use crate::gcp::http::decode;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_normalize_fixture() {
        let json = std::fs::read_to_string("src/tests/test_data/buckets.json")
            .expect("Error reading fixture");
        let list: BucketList = decode("fixture", &json).expect("Error decoding fixture");
        assert_eq!(list.items.len(), 3);

        let addresses = normalize_buckets(list);
        assert_eq!(
            addresses,
            vec![
                Address::new("eu-storage", "https://storage.googleapis.com/gcping-eu"),
                Address::new(
                    "asia-northeast1-storage",
                    "https://storage.googleapis.com/gcping-asia-northeast1"
                ),
            ]
        );
    }

    #[test]
    fn test_prefix_must_lead() {
        let list: BucketList = serde_json::from_value(serde_json::json!({
            "items": [
                {"id": "my-gcping-bucket", "location": "US"},
                {"id": "gcping", "location": "US"}
            ]
        }))
        .unwrap();
        assert!(normalize_buckets(list).is_empty());
    }

    #[tokio::test]
    async fn test_storage_addresses_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/storage/v1/b"))
            .and(query_param("project", "p"))
            .and(query_param("pageToken", "next"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"id": "gcping-us", "location": "US"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/storage/v1/b"))
            .and(query_param("project", "p"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"id": "gcping-eu", "location": "EU"}],
                "nextPageToken": "next"
            })))
            .mount(&server)
            .await;

        let client = GcpClient::new("t", Endpoints::with_base(&server.uri())).unwrap();
        let addresses = storage_addresses(&client, "p").await.unwrap();
        assert_eq!(
            addresses,
            vec![
                Address::new("eu-storage", "https://storage.googleapis.com/gcping-eu"),
                Address::new("us-storage", "https://storage.googleapis.com/gcping-us"),
            ]
        );
    }
}
