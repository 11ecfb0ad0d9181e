//! Membership entity
//!
//! A membership has no identity beyond its (group, user) pair. The pair is a
//! real composite type rather than a concatenated string, so identifiers that
//! contain separator characters never collide.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use super::newtypes::ResourceId;

/// A (group, user) pair; unique within the local store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Membership {
    pub group_id: ResourceId,
    pub user_id: ResourceId,
}

impl Membership {
    pub fn new(group_id: ResourceId, user_id: ResourceId) -> Self {
        Self { group_id, user_id }
    }
}

impl Display for Membership {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.group_id, self.user_id)
    }
}
