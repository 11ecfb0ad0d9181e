//! Domain entities
//!
//! This module contains the identity records that live on both sides of the
//! synchronization:
//! - Identifier newtype assigned by the remote directory
//! - Users with their optional extension attributes
//! - Groups and remote groups carrying their member lists
//! - Memberships keyed by the (group, user) pair
//! - Domain-specific error types

pub mod errors;
pub mod group;
pub mod membership;
pub mod newtypes;
pub mod user;

pub use errors::DomainError;
pub use group::{DirectoryGroup, Group};
pub use membership::Membership;
pub use newtypes::{EntityKind, ResourceId};
pub use user::{User, UserStatus};
