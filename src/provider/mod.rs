//! Document provider service capability interface.
//!
//! The platform's content providers are reached only through this trait.
//! Calls are synchronous and expected to return or fail promptly; the
//! resolver treats every failure as strategy-local and recoverable.

pub mod memory;

use std::io::Read;

use crate::types::{DocumentIdentifier, Grant};

/// Error taxonomy for provider operations.
///
/// The resolver downgrades all of these to "try the next strategy"; they
/// become caller-visible only when the whole strategy chain is exhausted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The identifier does not exist per the provider.
    #[error("Document not found: {0}")]
    NotFound(String),
    /// The provider refuses access.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    /// The provider does not support the requested operation.
    #[error("Operation not supported: {0}")]
    Unsupported(String),
    /// Any other backend failure.
    #[error("Provider backend error: {0}")]
    Backend(String),
}

/// A raw filesystem directory entry, for the path-listing fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// Absolute path of the entry.
    pub path: String,
    /// Whether the entry is a directory.
    pub is_directory: bool,
}

/// Capability interface over the platform's document providers.
///
/// Implementations answer for every authority; an identifier from an
/// authority the backend does not serve is simply `NotFound`. Hierarchies
/// are promised acyclic by contract; the resolver does not re-verify.
pub trait DocumentProvider {
    /// Whether the document exists.
    fn exists(&self, id: &DocumentIdentifier) -> Result<bool, ProviderError>;

    /// Whether the document is a directory.
    fn is_directory(&self, id: &DocumentIdentifier) -> Result<bool, ProviderError>;

    /// Native parent lookup. `Ok(None)` when the provider cannot expose a
    /// parent for this document; that is not an error.
    fn parent(&self, id: &DocumentIdentifier)
        -> Result<Option<DocumentIdentifier>, ProviderError>;

    /// Direct children of a directory, in provider order.
    fn list_children(
        &self,
        id: &DocumentIdentifier,
    ) -> Result<Vec<DocumentIdentifier>, ProviderError>;

    /// Children of `dir` listed through the capability of a granted tree
    /// root. Recovers access where direct listing is denied but a persisted
    /// grant covers the directory.
    fn list_children_via(
        &self,
        root: &DocumentIdentifier,
        dir: &DocumentIdentifier,
    ) -> Result<Vec<DocumentIdentifier>, ProviderError>;

    /// Open the document's content for reading.
    fn open_read(&self, id: &DocumentIdentifier) -> Result<Box<dyn Read>, ProviderError>;

    /// Metadata-index query: files whose backing absolute path starts with
    /// `prefix`. Secondary source of filenames when native listing is
    /// restricted; the resolver synthesizes identifiers from the hits.
    fn query_by_path_prefix(&self, prefix: &str) -> Result<Vec<RawEntry>, ProviderError>;

    /// Raw filesystem listing of an absolute directory path.
    fn read_dir_path(&self, path: &str) -> Result<Vec<RawEntry>, ProviderError>;

    /// Persist a grant rooted at a tree-form identifier.
    fn persist_grant(&self, id: &DocumentIdentifier) -> Result<(), ProviderError>;

    /// Snapshot of currently persisted grants.
    fn list_grants(&self) -> Result<Vec<Grant>, ProviderError>;
}

pub use memory::{InMemoryProvider, Manifest, ManifestEntry};
