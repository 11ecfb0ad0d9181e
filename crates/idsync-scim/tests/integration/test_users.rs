//! User operations against a mock SCIM directory

use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{basic_auth, body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use idsync_core::domain::{User, UserStatus};
use idsync_core::ports::IDirectoryClient;
use idsync_scim::client::ScimClient;
use idsync_scim::provider::ScimDirectoryClient;

use crate::common::{self, id, CLIENT_ID, CLIENT_SECRET};

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_users_maps_wire_records() {
    let (server, directory) = common::setup_scim_mock().await;

    Mock::given(method("GET"))
        .and(path("/scim/Users"))
        .and(basic_auth(CLIENT_ID, CLIENT_SECRET))
        .and(header("accept", "application/scim+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::list_response(json!([
            {
                "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
                "id": "u-1",
                "userName": "jdoe",
                "name": {"givenName": "Jane", "familyName": "Doe"},
                "emails": [{"value": "jane@example.com", "primary": true}],
                "active": true,
                "userType": "employee",
                "addresses": [{"type": "home", "country": "DE", "locality": "Berlin"}],
                "urn:ietf:params:scim:schemas:extension:sap:2.0:User": {
                    "validFrom": "2026-01-01T00:00:00Z"
                },
                "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User": {
                    "organization": "ACME"
                }
            },
            {"id": "u-2", "userName": "bare"}
        ]))))
        .expect(1)
        .mount(&server)
        .await;

    let users = directory.list_users().await.expect("list users");
    assert_eq!(users.len(), 2);

    let jane = &users[0];
    assert_eq!(jane.id, Some(id("u-1")));
    assert_eq!(jane.login_name.as_deref(), Some("jdoe"));
    assert_eq!(jane.first_name.as_deref(), Some("Jane"));
    assert_eq!(jane.last_name.as_deref(), Some("Doe"));
    assert_eq!(jane.email.as_deref(), Some("jane@example.com"));
    assert_eq!(jane.status, UserStatus::Active);
    assert_eq!(jane.user_type, "employee");
    assert_eq!(
        jane.valid_from,
        Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap())
    );
    assert!(jane.valid_to.is_none());
    assert_eq!(jane.company.as_deref(), Some("ACME"));
    assert_eq!(jane.country.as_deref(), Some("DE"));
    assert_eq!(jane.city.as_deref(), Some("Berlin"));

    let bare = &users[1];
    assert_eq!(bare.status, UserStatus::Inactive);
    assert_eq!(bare.user_type, "public");
    assert!(bare.company.is_none());
}

#[tokio::test]
async fn test_list_users_skips_records_without_id() {
    let (server, directory) = common::setup_scim_mock().await;

    common::mount_list(
        &server,
        "Users",
        json!([
            {"id": "u-1", "userName": "first"},
            {"userName": "no-id"},
            "garbage",
            {"id": "u-3", "userName": "third"}
        ]),
    )
    .await;

    let users = directory.list_users().await.expect("list users");
    let ids: Vec<_> = users.iter().filter_map(|u| u.id.clone()).collect();
    assert_eq!(ids, vec![id("u-1"), id("u-3")]);
}

#[tokio::test]
async fn test_list_users_follows_pages() {
    let (server, _) = common::setup_scim_mock().await;
    let client = ScimClient::new(&format!("{}/scim", server.uri()))
        .unwrap()
        .with_page_size(2);
    let directory = ScimDirectoryClient::new(client);

    Mock::given(method("GET"))
        .and(path("/scim/Users"))
        .and(query_param("startIndex", "1"))
        .and(query_param("count", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalResults": 3,
            "startIndex": 1,
            "itemsPerPage": 2,
            "Resources": [{"id": "u-1"}, {"id": "u-2"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/scim/Users"))
        .and(query_param("startIndex", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalResults": 3,
            "startIndex": 3,
            "itemsPerPage": 1,
            "Resources": [{"id": "u-3"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let users = directory.list_users().await.expect("list users");
    let ids: Vec<_> = users.iter().filter_map(|u| u.id.clone()).collect();
    assert_eq!(ids, vec![id("u-1"), id("u-2"), id("u-3")]);
}

#[tokio::test]
async fn test_empty_directory_is_empty_list() {
    let (server, directory) = common::setup_scim_mock().await;

    Mock::given(method("GET"))
        .and(path("/scim/Users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "schemas": ["urn:ietf:params:scim:api:messages:2.0:ListResponse"],
            "totalResults": 0
        })))
        .mount(&server)
        .await;

    let users = directory.list_users().await.expect("list users");
    assert!(users.is_empty());
}

// ============================================================================
// Single-record operations
// ============================================================================

#[tokio::test]
async fn test_get_user_found_and_missing() {
    let (server, directory) = common::setup_scim_mock().await;

    Mock::given(method("GET"))
        .and(path("/scim/Users/u-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "u-1", "userName": "jdoe"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/scim/Users/u-404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let found = directory.get_user(&id("u-1")).await.unwrap();
    assert_eq!(found.unwrap().login_name.as_deref(), Some("jdoe"));

    let missing = directory.get_user(&id("u-404")).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_create_user_posts_scim_body_and_adopts_id() {
    let (server, directory) = common::setup_scim_mock().await;

    Mock::given(method("POST"))
        .and(path("/scim/Users"))
        .and(header("content-type", "application/scim+json"))
        .and(body_json(json!({
            "schemas": [
                "urn:ietf:params:scim:schemas:core:2.0:User",
                "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User"
            ],
            "userName": "jdoe",
            "emails": [{"value": "jane@example.com", "primary": true}],
            "active": true,
            "userType": "public",
            "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User": {
                "organization": "ACME"
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "u-77",
            "userName": "jdoe",
            "meta": {"resourceType": "User"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let user = User {
        company: Some("ACME".into()),
        ..User::new("jdoe").with_email("jane@example.com")
    };
    let created = directory.create_user(&user).await.expect("create user");
    assert_eq!(created.id, Some(id("u-77")));
    assert_eq!(created.company.as_deref(), Some("ACME"));
}

#[tokio::test]
async fn test_create_user_without_id_in_response_fails() {
    let (server, directory) = common::setup_scim_mock().await;

    Mock::given(method("POST"))
        .and(path("/scim/Users"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"userName": "jdoe"})))
        .mount(&server)
        .await;

    let err = directory.create_user(&User::new("jdoe")).await.unwrap_err();
    assert!(err.to_string().contains("no id"), "unexpected error: {err:#}");
}

#[tokio::test]
async fn test_update_user_puts_to_resource_path() {
    let (server, directory) = common::setup_scim_mock().await;

    Mock::given(method("PUT"))
        .and(path("/scim/Users/u-1"))
        .and(header("content-type", "application/scim+json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not even json"))
        .expect(1)
        .mount(&server)
        .await;

    let user = User::new("jdoe").with_id(id("u-1"));
    directory
        .update_user(&id("u-1"), &user)
        .await
        .expect("update ignores response body");
}

#[tokio::test]
async fn test_delete_user_accepts_no_content() {
    let (server, directory) = common::setup_scim_mock().await;

    Mock::given(method("DELETE"))
        .and(path("/scim/Users/u-9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    directory.delete_user(&id("u-9")).await.expect("delete user");
}
