//! Canvas API client
//!
//! Wraps `reqwest::Client` with bearer authentication, URL construction,
//! and the single-request contract every listing builds on: one call,
//! status check, optional `Link` header, JSON decode.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use canvas_sync_api::{client::CanvasClient, files};
//!
//! # async fn example() -> Result<(), canvas_sync_api::ApiError> {
//! let client = CanvasClient::new("https://canvas.example.edu", "token").with_per_page(100);
//! let file = files::get_file(&client, 42).await?;
//! println!("{} ({} bytes)", file.display_name, file.size);
//! # Ok(())
//! # }
//! ```

use reqwest::{header::LINK, Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use canvas_sync_core::config::Config;

use crate::pagination::LinkRelations;
use crate::ApiError;

/// HTTP client for Canvas REST and GraphQL calls
///
/// Cheap to clone: the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct CanvasClient {
    /// The underlying HTTP client
    client: Client,
    /// Instance base URL without a trailing slash
    host: String,
    /// Static bearer token
    token: String,
    /// Page size appended to REST listing URLs
    per_page: Option<u32>,
}

impl CanvasClient {
    /// Creates a client for `host` authenticating with `token`
    pub fn new(host: impl Into<String>, token: impl Into<String>) -> Self {
        let host: String = host.into();
        Self {
            client: Client::new(),
            host: host.trim_end_matches('/').to_string(),
            token: token.into(),
            per_page: None,
        }
    }

    /// Creates a client from the host, token and page size in `config`
    pub fn from_config(config: &Config) -> Self {
        let client = Self::new(&config.host, &config.token);
        match config.per_page {
            Some(n) => client.with_per_page(n),
            None => client,
        }
    }

    /// Sets the `per_page` query parameter for REST listings
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Replaces the underlying HTTP client (timeouts, proxies, ...)
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn per_page(&self) -> Option<u32> {
        self.per_page
    }

    /// Returns the underlying reqwest client
    pub fn http(&self) -> &Client {
        &self.client
    }

    /// Builds an absolute URL for an API path, adding `per_page` if configured
    ///
    /// # Arguments
    /// * `uri` - Path starting with `/`, e.g. `/api/v1/courses/1/files`
    pub fn build_url(&self, uri: &str) -> Result<String, ApiError> {
        let mut url = self.base_url(uri)?;
        if let Some(n) = self.per_page {
            url.query_pairs_mut().append_pair("per_page", &n.to_string());
        }
        Ok(url.into())
    }

    /// Builds an absolute URL for an API path without query parameters
    pub fn build_plain_url(&self, uri: &str) -> Result<String, ApiError> {
        self.base_url(uri).map(Into::into)
    }

    fn base_url(&self, uri: &str) -> Result<Url, ApiError> {
        let raw = if uri.starts_with('/') {
            format!("{}{}", self.host, uri)
        } else {
            format!("{}/{}", self.host, uri)
        };
        Url::parse(&raw).map_err(|source| ApiError::InvalidUrl { url: raw, source })
    }

    /// Creates an authenticated request builder for an absolute URL
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url).bearer_auth(&self.token)
    }

    /// Sends `request` and decodes its JSON body
    ///
    /// Any status other than 200 fails with [`ApiError::HttpStatus`]
    /// carrying the raw body. The `Link` header, if present, is parsed into
    /// relations; its absence means the collection has a single page.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        url: &str,
        request: RequestBuilder,
    ) -> Result<(T, Option<LinkRelations>), ApiError> {
        let response = request.send().await?;
        let status = response.status();

        let link = response
            .headers()
            .get_all(LINK)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join(",");

        let body = response.text().await?;

        if status != StatusCode::OK {
            debug!(url, status = status.as_u16(), "Request failed");
            return Err(ApiError::HttpStatus {
                status,
                url: url.to_string(),
                body,
            });
        }

        let relations = if link.is_empty() {
            None
        } else {
            Some(LinkRelations::parse(&link))
        };

        let data = serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })?;

        Ok((data, relations))
    }

    /// Performs an authenticated GET against an absolute URL
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<(T, Option<LinkRelations>), ApiError> {
        debug!(url, "GET");
        self.execute(url, self.request(Method::GET, url)).await
    }
}
