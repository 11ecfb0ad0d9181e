//! Integration tests for idsync-scim
//!
//! Uses wiremock to simulate a SCIM 2.0 directory and verifies the HTTP
//! client, paging, schema mapping and the IDirectoryClient adapter end to end.

mod common;

mod test_errors;
mod test_groups;
mod test_users;
