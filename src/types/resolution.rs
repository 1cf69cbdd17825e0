//! Resolution results and listing modes.

use serde::{Deserialize, Serialize};

use super::identifier::DocumentIdentifier;

/// How children of a directory are enumerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListMode {
    /// Only direct children that are files; subdirectories are skipped.
    Flat,
    /// Depth-first enumeration of every file in the subtree.
    Recursive,
}

/// Outcome of a resolution call.
///
/// Never partially typed: `Children` carries file identifiers only;
/// directories are either expanded (recursive mode) or silently excluded
/// (flat mode).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionResult {
    /// The containing directory of the requested document.
    Parent(DocumentIdentifier),
    /// File children, in the order the provider returned them.
    Children(Vec<DocumentIdentifier>),
    /// Every strategy in the chain was exhausted without an answer.
    NotResolvable,
}

impl ResolutionResult {
    /// True when this result carries no usable answer.
    pub fn is_not_resolvable(&self) -> bool {
        matches!(self, Self::NotResolvable)
    }
}
