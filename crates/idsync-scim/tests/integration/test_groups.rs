//! Group and membership operations against a mock SCIM directory

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use idsync_core::domain::Group;
use idsync_core::ports::IDirectoryClient;

use crate::common::{self, id};

#[tokio::test]
async fn test_list_groups_returns_members() {
    let (server, directory) = common::setup_scim_mock().await;

    common::mount_list(
        &server,
        "Groups",
        json!([
            {
                "schemas": [
                    "urn:ietf:params:scim:schemas:core:2.0:Group",
                    "urn:sap:cloud:scim:schemas:extension:custom:2.0:Group"
                ],
                "id": "g-1",
                "displayName": "Admins",
                "members": [{"value": "u-5", "display": "jdoe"}, {"value": "u-6"}],
                "urn:sap:cloud:scim:schemas:extension:custom:2.0:Group": {
                    "name": "admins",
                    "description": "Administrators"
                }
            },
            {"id": "g-2", "displayName": "Empty"},
            {"displayName": "No id"}
        ]),
    )
    .await;

    let groups = directory.list_groups().await.expect("list groups");
    assert_eq!(groups.len(), 2);

    let admins = &groups[0];
    assert_eq!(admins.group.id, Some(id("g-1")));
    assert_eq!(admins.group.display_name, "Admins");
    assert_eq!(admins.group.name.as_deref(), Some("admins"));
    assert_eq!(admins.group.description.as_deref(), Some("Administrators"));
    assert_eq!(admins.members, vec![id("u-5"), id("u-6")]);

    assert!(groups[1].members.is_empty());
    assert!(groups[1].group.description.is_none());
}

#[tokio::test]
async fn test_list_groups_skips_records_without_usable_id() {
    let (server, directory) = common::setup_scim_mock().await;

    common::mount_list(
        &server,
        "Groups",
        json!([
            {"id": "g-1", "displayName": "First"},
            {"displayName": "No id"},
            {"id": 42, "displayName": "Numeric id"},
            {"id": "  ", "displayName": "Blank id"},
            "garbage",
            {"id": "g-3", "displayName": "Third", "members": [{"value": "u-1"}]}
        ]),
    )
    .await;

    let groups = directory.list_groups().await.expect("list groups");
    let ids: Vec<_> = groups.iter().filter_map(|g| g.group.id.clone()).collect();
    assert_eq!(ids, vec![id("g-1"), id("g-3")]);
    assert_eq!(groups[1].members, vec![id("u-1")]);
}

#[tokio::test]
async fn test_get_group_missing() {
    let (server, directory) = common::setup_scim_mock().await;

    Mock::given(method("GET"))
        .and(path("/scim/Groups/g-404"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    assert!(directory.get_group(&id("g-404")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_create_group_adopts_assigned_id() {
    let (server, directory) = common::setup_scim_mock().await;

    Mock::given(method("POST"))
        .and(path("/scim/Groups"))
        .and(body_json(json!({
            "schemas": [
                "urn:ietf:params:scim:schemas:core:2.0:Group",
                "urn:sap:cloud:scim:schemas:extension:custom:2.0:Group"
            ],
            "displayName": "Engineering",
            "urn:sap:cloud:scim:schemas:extension:custom:2.0:Group": {
                "description": "All engineers"
            }
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"id": "g-42", "displayName": "Engineering"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let group = Group::new("Engineering").with_description("All engineers");
    let created = directory.create_group(&group).await.expect("create group");
    assert_eq!(created.id, Some(id("g-42")));
    assert_eq!(created.display_name, "Engineering");
}

#[tokio::test]
async fn test_update_group_sends_member_list() {
    let (server, directory) = common::setup_scim_mock().await;

    Mock::given(method("PUT"))
        .and(path("/scim/Groups/g-1"))
        .and(body_json(json!({
            "schemas": ["urn:ietf:params:scim:schemas:core:2.0:Group"],
            "id": "g-1",
            "displayName": "Admins",
            "members": [{"value": "u-1"}, {"value": "u-2"}]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let group = Group::new("Admins").with_id(id("g-1"));
    directory
        .update_group(&id("g-1"), &group, &[id("u-1"), id("u-2")])
        .await
        .expect("update group");
}

#[tokio::test]
async fn test_delete_group() {
    let (server, directory) = common::setup_scim_mock().await;

    Mock::given(method("DELETE"))
        .and(path("/scim/Groups/g-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    directory.delete_group(&id("g-1")).await.expect("delete group");
}

#[tokio::test]
async fn test_add_member_sends_patch() {
    let (server, directory) = common::setup_scim_mock().await;

    Mock::given(method("PATCH"))
        .and(path("/scim/Groups/g-1"))
        .and(body_json(json!({
            "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
            "Operations": [{"op": "add", "path": "members", "value": [{"value": "u-5"}]}]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    directory
        .add_group_member(&id("g-1"), &id("u-5"))
        .await
        .expect("add member");
}

#[tokio::test]
async fn test_remove_member_sends_filtered_path() {
    let (server, directory) = common::setup_scim_mock().await;

    Mock::given(method("PATCH"))
        .and(path("/scim/Groups/g-1"))
        .and(body_json(json!({
            "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
            "Operations": [{"op": "remove", "path": "members[value eq \"u-5\"]"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "g-1"})))
        .expect(1)
        .mount(&server)
        .await;

    directory
        .remove_group_member(&id("g-1"), &id("u-5"))
        .await
        .expect("remove member");
}
