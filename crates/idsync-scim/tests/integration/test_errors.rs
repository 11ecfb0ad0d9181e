//! Failure handling: status errors, malformed envelopes and timeouts

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use idsync_core::domain::User;
use idsync_core::ports::IDirectoryClient;
use idsync_scim::client::ScimClient;
use idsync_scim::provider::ScimDirectoryClient;
use idsync_scim::ScimError;

use crate::common::{self, id};

#[tokio::test]
async fn test_status_error_carries_code_and_body() {
    let (server, directory) = common::setup_scim_mock().await;

    Mock::given(method("POST"))
        .and(path("/scim/Users"))
        .respond_with(ResponseTemplate::new(409).set_body_string("userName already exists"))
        .mount(&server)
        .await;

    let err = directory.create_user(&User::new("jdoe")).await.unwrap_err();
    match err.downcast_ref::<ScimError>() {
        Some(ScimError::Status { status, body }) => {
            assert_eq!(*status, 409);
            assert_eq!(body, "userName already exists");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_on_list_aborts() {
    let (server, directory) = common::setup_scim_mock().await;

    Mock::given(method("GET"))
        .and(path("/scim/Groups"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = directory.list_groups().await.unwrap_err();
    let scim = err.downcast_ref::<ScimError>().expect("ScimError");
    assert_eq!(scim.status(), Some(503));
}

#[tokio::test]
async fn test_list_without_resources_and_nonzero_total_is_invalid() {
    let (server, directory) = common::setup_scim_mock().await;

    Mock::given(method("GET"))
        .and(path("/scim/Users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"totalResults": 12})))
        .mount(&server)
        .await;

    let err = directory.list_users().await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ScimError>(),
        Some(ScimError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_empty_page_with_nonzero_total_is_invalid() {
    let (server, directory) = common::setup_scim_mock().await;

    Mock::given(method("GET"))
        .and(path("/scim/Users"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"totalResults": 5, "Resources": []})),
        )
        .mount(&server)
        .await;

    let err = directory.list_users().await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ScimError>(),
        Some(ScimError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_listing_that_stops_before_total_is_invalid() {
    let (server, directory) = common::setup_scim_mock().await;

    Mock::given(method("GET"))
        .and(path("/scim/Users"))
        .and(query_param("startIndex", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalResults": 3,
            "Resources": [{"id": "u-1", "userName": "first"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/scim/Users"))
        .and(query_param("startIndex", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"totalResults": 3, "Resources": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = directory.list_users().await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ScimError>(),
        Some(ScimError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_list_without_resources_or_total_is_invalid() {
    let (server, directory) = common::setup_scim_mock().await;

    Mock::given(method("GET"))
        .and(path("/scim/Users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    assert!(directory.list_users().await.is_err());
}

#[tokio::test]
async fn test_non_json_list_is_invalid() {
    let (server, directory) = common::setup_scim_mock().await;

    Mock::given(method("GET"))
        .and(path("/scim/Users"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = directory.list_users().await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ScimError>(),
        Some(ScimError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_timeout_surfaces_as_transport_error() {
    let server = MockServer::start().await;
    let client =
        ScimClient::with_timeout(&format!("{}/scim", server.uri()), Duration::from_millis(200))
            .unwrap();
    let directory = ScimDirectoryClient::new(client);

    Mock::given(method("DELETE"))
        .and(path("/scim/Users/u-1"))
        .respond_with(ResponseTemplate::new(204).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let err = directory.delete_user(&id("u-1")).await.unwrap_err();
    match err.downcast_ref::<ScimError>() {
        Some(ScimError::Transport(e)) => assert!(e.is_timeout()),
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_directory_is_transport_error() {
    // Nothing listens on port 1
    let directory =
        ScimDirectoryClient::new(ScimClient::new("http://127.0.0.1:1/scim").unwrap());
    let err = directory.list_users().await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ScimError>(),
        Some(ScimError::Transport(_))
    ));
}
