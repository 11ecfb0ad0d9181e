//! SCIM HTTP client
//!
//! Thin typed wrapper over `reqwest::Client` that knows the directory's base
//! URL, credentials, paging and content type. It speaks raw JSON; mapping to
//! domain records happens in [`crate::mapper`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use idsync_scim::client::ScimClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = ScimClient::new("https://tenant.example.com/scim")?
//!     .with_basic_auth("client-id", "client-secret");
//! let users = client.list_resources("Users").await?;
//! println!("{} users", users.len());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use idsync_core::config::DirectoryConfig;

use crate::schema::{ScimListResponse, ScimPatchRequest};
use crate::{ScimError, ScimResult};

/// Media type for every request and response body
pub const SCIM_CONTENT_TYPE: &str = "application/scim+json";

/// Timeout applied when none is configured
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Page size applied when none is configured
const DEFAULT_PAGE_SIZE: u32 = 100;

/// HTTP client for a SCIM 2.0 directory
#[derive(Debug, Clone)]
pub struct ScimClient {
    client: Client,
    base_url: Url,
    credentials: Option<(String, String)>,
    page_size: u32,
}

impl ScimClient {
    /// Creates a client with the default timeout and page size
    pub fn new(base_url: &str) -> ScimResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a client whose requests fail after `timeout`
    pub fn with_timeout(base_url: &str, timeout: Duration) -> ScimResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ScimError::InvalidConfig(format!("base URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(ScimError::InvalidConfig(format!(
                "base URL '{base_url}' must be an http(s) URL"
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScimError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            credentials: None,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Creates a client from the `directory` configuration section
    pub fn from_config(config: &DirectoryConfig) -> ScimResult<Self> {
        let mut client = Self::with_timeout(&config.base_url, config.request_timeout())?
            .with_page_size(config.page_size);
        if let (Some(id), Some(secret)) = (&config.client_id, &config.client_secret) {
            client = client.with_basic_auth(id, secret);
        }
        Ok(client)
    }

    /// Authenticates every request with HTTP Basic
    pub fn with_basic_auth(mut self, client_id: impl Into<String>, secret: impl Into<String>) -> Self {
        self.credentials = Some((client_id.into(), secret.into()));
        self
    }

    /// Sets how many resources are requested per list page
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds the URL for a resource path, encoding each segment
    ///
    /// `endpoint(&["Users", "a/b"])` yields `<base>/Users/a%2Fb`.
    pub fn endpoint(&self, segments: &[&str]) -> ScimResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ScimError::InvalidConfig(format!("base URL '{}' cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Creates a request with SCIM headers and credentials attached
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header(ACCEPT, SCIM_CONTENT_TYPE);
        match &self.credentials {
            Some((id, secret)) => builder.basic_auth(id, Some(secret)),
            None => builder,
        }
    }

    // ------------------------------------------------------------------
    // Resource operations
    // ------------------------------------------------------------------

    /// Fetches every resource of a collection, following pages
    ///
    /// A page without `Resources` counts as empty only when it reports
    /// `totalResults: 0`. A page that comes back empty while fewer than
    /// `totalResults` resources have arrived is an invalid response too, so
    /// a malformed or truncated reply never looks like a smaller directory.
    pub async fn list_resources(&self, collection: &str) -> ScimResult<Vec<serde_json::Value>> {
        let url = self.endpoint(&[collection])?;
        let mut resources = Vec::new();
        let mut start_index: u64 = 1;

        loop {
            debug!(collection, start_index, count = self.page_size, "SCIM GET page");
            let response = self
                .request(Method::GET, url.clone())
                .query(&[
                    ("startIndex", start_index.to_string()),
                    ("count", self.page_size.to_string()),
                ])
                .send()
                .await?;
            let response = check_status(response).await?;
            let body = response.text().await?;
            let page: ScimListResponse = serde_json::from_str(&body).map_err(|e| {
                ScimError::InvalidResponse(format!("{collection} list response: {e}"))
            })?;

            let batch = match page.resources {
                Some(batch) => batch,
                None if page.total_results == Some(0) => Vec::new(),
                None => {
                    return Err(ScimError::InvalidResponse(format!(
                        "{collection} list response has no Resources (totalResults: {:?})",
                        page.total_results
                    )))
                }
            };

            let fetched = batch.len() as u64;
            resources.extend(batch);

            let more = match page.total_results {
                Some(total) => (resources.len() as u64) < total,
                None => fetched >= u64::from(self.page_size),
            };
            if !more {
                break;
            }
            if fetched == 0 {
                // Only reachable with totalResults still ahead of what arrived
                warn!(
                    collection,
                    fetched = resources.len(),
                    total = ?page.total_results,
                    "Directory stopped returning resources before totalResults"
                );
                return Err(ScimError::InvalidResponse(format!(
                    "{collection} list ended after {} of {:?} resources",
                    resources.len(),
                    page.total_results
                )));
            }
            start_index += fetched;
        }

        debug!(collection, count = resources.len(), "SCIM list complete");
        Ok(resources)
    }

    /// Fetches a single resource, `None` on 404
    pub async fn get_resource(
        &self,
        collection: &str,
        id: &str,
    ) -> ScimResult<Option<serde_json::Value>> {
        let url = self.endpoint(&[collection, id])?;
        debug!(%url, "SCIM GET");
        let response = self.request(Method::GET, url).send().await?;
        match check_status(response).await {
            Ok(response) => Ok(Some(response.json().await?)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// POSTs a new resource and returns the directory's representation
    pub async fn create_resource<B: Serialize + ?Sized>(
        &self,
        collection: &str,
        body: &B,
    ) -> ScimResult<serde_json::Value> {
        let url = self.endpoint(&[collection])?;
        debug!(%url, "SCIM POST");
        let response = self.send_json(Method::POST, url, body).await?;
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ScimError::InvalidResponse(format!("{collection} create response: {e}")))
    }

    /// PUTs a full replacement of a resource; the response body is ignored
    pub async fn replace_resource<B: Serialize + ?Sized>(
        &self,
        collection: &str,
        id: &str,
        body: &B,
    ) -> ScimResult<()> {
        let url = self.endpoint(&[collection, id])?;
        debug!(%url, "SCIM PUT");
        self.send_json(Method::PUT, url, body).await?;
        Ok(())
    }

    /// PATCHes a resource; the response body is ignored
    pub async fn patch_resource(
        &self,
        collection: &str,
        id: &str,
        patch: &ScimPatchRequest,
    ) -> ScimResult<()> {
        let url = self.endpoint(&[collection, id])?;
        debug!(%url, "SCIM PATCH");
        self.send_json(Method::PATCH, url, patch).await?;
        Ok(())
    }

    /// DELETEs a resource
    pub async fn delete_resource(&self, collection: &str, id: &str) -> ScimResult<()> {
        let url = self.endpoint(&[collection, id])?;
        debug!(%url, "SCIM DELETE");
        let response = self.request(Method::DELETE, url).send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> ScimResult<Response> {
        let payload = serde_json::to_vec(body)
            .map_err(|e| ScimError::Mapping(format!("request body: {e}")))?;
        let response = self
            .request(method, url)
            .header(CONTENT_TYPE, SCIM_CONTENT_TYPE)
            .body(payload)
            .send()
            .await?;
        check_status(response).await
    }
}

/// Turns a non-2xx response into [`ScimError::Status`]
async fn check_status(response: Response) -> ScimResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!(status = status.as_u16(), "SCIM request failed");
    Err(ScimError::Status {
        status: status.as_u16(),
        body,
    })
}
