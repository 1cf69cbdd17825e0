//! Recursive tree enumeration.
//!
//! Depth-first walk over pre-classified directory entries that collects
//! file identifiers. Listing failures are subtree-local: an unreadable
//! directory is skipped and the walk continues with its siblings, so a
//! single bad branch never empties the whole result.

use crate::provider::{DocumentProvider, ProviderError};
use crate::types::DocumentIdentifier;

/// A directory entry whose classification is already resolved.
///
/// Carrying the flag alongside the identifier keeps results file-only:
/// an entry is reported as a file only when whatever produced it
/// positively classified it as one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The entry's identifier.
    pub id: DocumentIdentifier,
    /// Whether the entry is a directory.
    pub is_directory: bool,
}

/// Walk depth-first from `seed` using `list` to enumerate each
/// directory, collecting file identifiers in discovery order.
///
/// `list` is consulted once per directory; an `Err` prunes that subtree.
pub fn walk_with<L>(seed: Vec<Entry>, mut list: L) -> Vec<DocumentIdentifier>
where
    L: FnMut(&DocumentIdentifier) -> Result<Vec<Entry>, ProviderError>,
{
    let mut files = Vec::new();
    let mut stack: Vec<Entry> = seed.into_iter().rev().collect();

    while let Some(entry) = stack.pop() {
        if !entry.is_directory {
            files.push(entry.id);
            continue;
        }
        match list(&entry.id) {
            Ok(children) => {
                // Reverse so the stack yields children in provider order.
                stack.extend(children.into_iter().rev());
            }
            Err(err) => {
                tracing::debug!(directory = %entry.id, error = %err, "Skipping unreadable subtree");
            }
        }
    }

    files
}

/// Recursively collect all file identifiers under `root` using the
/// provider's native listing.
///
/// An entry the provider cannot classify is treated as a directory, so
/// it is never reported as a file; its listing attempt fails and the
/// entry drops out instead.
pub fn collect_files<P: DocumentProvider>(
    provider: &P,
    root: &DocumentIdentifier,
) -> Vec<DocumentIdentifier> {
    let list = |dir: &DocumentIdentifier| -> Result<Vec<Entry>, ProviderError> {
        let children = provider.list_children(dir)?;
        Ok(children
            .into_iter()
            .map(|id| {
                let is_directory = provider.is_directory(&id).unwrap_or(true);
                Entry { id, is_directory }
            })
            .collect())
    };

    let seed = match list(root) {
        Ok(seed) => seed,
        Err(err) => {
            tracing::debug!(directory = %root, error = %err, "Root listing failed");
            return Vec::new();
        }
    };
    walk_with(seed, list)
}
