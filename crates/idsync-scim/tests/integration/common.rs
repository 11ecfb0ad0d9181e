//! Shared helpers for SCIM integration tests
//!
//! Each helper starts a wiremock server mounted under `/scim` and returns an
//! adapter pointing at it.

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use idsync_core::domain::ResourceId;
use idsync_scim::client::ScimClient;
use idsync_scim::provider::ScimDirectoryClient;

pub const CLIENT_ID: &str = "sync-client";
pub const CLIENT_SECRET: &str = "s3cret";

/// Starts a mock server and returns an authenticated adapter for it
pub async fn setup_scim_mock() -> (MockServer, ScimDirectoryClient) {
    let server = MockServer::start().await;
    let client = ScimClient::new(&format!("{}/scim", server.uri()))
        .expect("valid mock URL")
        .with_basic_auth(CLIENT_ID, CLIENT_SECRET);
    (server, ScimDirectoryClient::new(client))
}

/// Wraps resources in a single-page list envelope
pub fn list_response(resources: Value) -> Value {
    let total = resources.as_array().map(|r| r.len()).unwrap_or(0);
    json!({
        "schemas": ["urn:ietf:params:scim:api:messages:2.0:ListResponse"],
        "totalResults": total,
        "startIndex": 1,
        "itemsPerPage": total,
        "Resources": resources
    })
}

/// Mounts `GET /scim/{collection}` answering with one page
pub async fn mount_list(server: &MockServer, collection: &str, resources: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/scim/{collection}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_response(resources)))
        .mount(server)
        .await;
}

pub fn id(s: &str) -> ResourceId {
    ResourceId::new(s).expect("valid id")
}
