//! Authenticated JSON requests against the Google REST APIs.

use crate::config::{Config, Endpoints, HTTP_TIMEOUT_SECS, REDACTED};
use crate::error::ApiError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// A list response that may continue on another page.
pub trait Paged {
    fn next_page_token(&self) -> Option<&str>;
}

/// Bearer-authenticated client shared by all fetchers.
#[derive(Clone)]
pub struct GcpClient {
    http: reqwest::Client,
    token: String,
    pub endpoints: Endpoints,
}

impl fmt::Debug for GcpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GcpClient")
            .field("token", &REDACTED)
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl GcpClient {
    pub fn new(token: &str, endpoints: Endpoints) -> Result<GcpClient, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|source| ApiError::Transport {
                method: "BUILD",
                url: String::new(),
                source,
            })?;
        Ok(GcpClient {
            http,
            token: token.to_string(),
            endpoints,
        })
    }

    pub fn from_config(config: &Config) -> Result<GcpClient, ApiError> {
        GcpClient::new(&config.token, config.endpoints.clone())
    }

    /// GET `url` with optional query parameters and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        log::debug!("GET {url} {query:?}");
        let request = self.http.get(url).bearer_auth(&self.token).query(query);
        self.send("GET", url, request).await
    }

    /// GET every page of a list call, following `nextPageToken`.
    ///
    /// Fails with [`ApiError::PageLoop`] if the server hands back a token it
    /// already returned.
    pub async fn get_pages<T: DeserializeOwned + Paged>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, ApiError> {
        let mut pages = Vec::new();
        let mut seen_tokens: Vec<String> = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut page_query = query.to_vec();
            if let Some(token) = page_token.as_deref() {
                page_query.push(("pageToken", token));
            }
            let page: T = self.get_json(url, &page_query).await?;
            let next = page.next_page_token().map(str::to_string);
            pages.push(page);

            log::info!(
                "got page#{:2} from {url} next_page_token={:?}",
                pages.len(),
                next
            );

            match next {
                None => break,
                Some(token) if seen_tokens.contains(&token) => {
                    return Err(ApiError::PageLoop {
                        url: url.to_string(),
                        token,
                    });
                }
                Some(token) => {
                    seen_tokens.push(token.clone());
                    page_token = Some(token);
                }
            }
        }

        Ok(pages)
    }

    /// POST a JSON body to `url` and decode the JSON response.
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        log::debug!("POST {url}");
        let request = self.http.post(url).bearer_auth(&self.token).json(body);
        self.send("POST", url, request).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: &'static str,
        url: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let transport = |source| ApiError::Transport {
            method,
            url: url.to_string(),
            source,
        };
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        if !status.is_success() {
            return Err(ApiError::Status {
                method,
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        decode(url, &body)
    }
}

/// Decode a JSON body, reporting the path of the first bad field.
pub fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, ApiError> {
    let mut deserializer = serde_json::Deserializer::from_str(body);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        log::error!("OUTPUT START:\n\n{}\n\nOUTPUT END\n", body);
        ApiError::Decode {
            url: url.to_string(),
            path: e.path().to_string(),
            source: e.into_inner(),
        }
    })
}
