//! Persisted permission grants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identifier::DocumentIdentifier;

/// A persisted, revocable authorization rooted at a tree-form identifier.
///
/// A grant covers its root and, by platform convention, everything nested
/// under it. Grants are immutable snapshots: they are created when a picked
/// tree identifier is explicitly persisted, and destroyed only by
/// platform-level revocation outside this subsystem. A grant may therefore
/// disappear between listing and use; callers must tolerate that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// The tree-form identifier this grant is rooted at.
    pub root: DocumentIdentifier,
    /// When the grant was persisted.
    pub granted_at: DateTime<Utc>,
}

impl Grant {
    /// Create a grant rooted at the given identifier, timestamped now.
    pub fn new(root: DocumentIdentifier) -> Self {
        Self {
            root,
            granted_at: Utc::now(),
        }
    }

    /// Create a grant with an explicit timestamp.
    pub fn at(root: DocumentIdentifier, granted_at: DateTime<Utc>) -> Self {
        Self { root, granted_at }
    }
}
