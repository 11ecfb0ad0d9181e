//! IdSync Core - Domain model and port definitions
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `User`, `Group`, `Membership`, `DirectoryGroup`
//! - **Port definitions** - Traits for adapters: `IDirectoryClient`, `IIdentityStore`,
//!   `ILifecycleHooks`
//! - **Configuration** - YAML-backed settings for the directory, sync loop and store
//!
//! # Architecture
//!
//! The domain module holds plain records with no I/O. Ports define the trait
//! interfaces that the SCIM adapter, the SQLite store and the sync engine
//! implement or consume.

pub mod config;
pub mod domain;
pub mod ports;
