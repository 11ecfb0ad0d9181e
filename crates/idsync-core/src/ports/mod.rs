//! Port definitions (hexagonal architecture interfaces)
//!
//! Ports are the boundaries the sync engine depends on. Their
//! implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IDirectoryClient`] - Remote identity directory (SCIM)
//! - [`IIdentityStore`] - Local relational store of users, groups and memberships
//! - [`ILifecycleHooks`] - Callbacks the local store invokes around each mutation

pub mod directory_client;
pub mod identity_store;
pub mod lifecycle;

pub use directory_client::IDirectoryClient;
pub use identity_store::IIdentityStore;
pub use lifecycle::{ILifecycleHooks, NoopLifecycleHooks};
