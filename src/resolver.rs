//! Multi-strategy resolution engine.
//!
//! Answers two questions about a document identifier: "what directory
//! contains it?" and "what does that directory contain?". Each answer
//! runs an ordered chain of strategies against the provider; every
//! strategy-level failure is downgraded to "try the next one", and only
//! exhaustion of the whole chain is visible to the caller.
//!
//! The engine is stateless between calls. Grants are re-read from the
//! provider on every resolution so a revocation between calls is picked
//! up immediately.

use std::sync::Arc;

use crate::convert;
use crate::grants;
use crate::provider::{DocumentProvider, ProviderError};
use crate::types::{DocumentIdentifier, Grant, ListMode, ProviderKind, ResolutionResult};
use crate::walk::{self, Entry};

/// Resolution engine over a document provider.
#[derive(Debug)]
pub struct DocumentResolver<P> {
    provider: Arc<P>,
}

impl<P> Clone for DocumentResolver<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<P: DocumentProvider> DocumentResolver<P> {
    /// Create a resolver over the given provider.
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// The underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Most specific persisted grant covering `id`, if any.
    ///
    /// Reads the grant set fresh from the provider; a failure to list
    /// grants is treated as "no grants".
    pub fn find_covering_grant(&self, id: &DocumentIdentifier) -> Option<Grant> {
        let grants = match self.provider.list_grants() {
            Ok(grants) => grants,
            Err(err) => {
                tracing::debug!(error = %err, "Grant listing failed; treating as empty");
                return None;
            }
        };
        grants::find_covering(id, &grants).cloned()
    }

    /// Resolve the directory containing `id`.
    ///
    /// Strategy chain, first success wins:
    /// 1. A legacy downloads identifier is converted to its external
    ///    storage equivalent and resolved again (at most one conversion,
    ///    since the converted identifier is never legacy).
    /// 2. Native parent lookup, verified for existence.
    /// 3. For a legacy raw-path identifier, the parent path is derived by
    ///    dropping the last path segment and returned unverified as a
    ///    tree identifier; the next dereference re-checks existence.
    pub fn resolve_parent(&self, id: &DocumentIdentifier) -> ResolutionResult {
        let kind = ProviderKind::classify(&id.authority);

        if kind == ProviderKind::LegacyDownloads {
            if let Ok(converted) = convert::legacy_downloads_to_external_storage(id) {
                if let ResolutionResult::Parent(parent) = self.resolve_parent(&converted) {
                    return ResolutionResult::Parent(parent);
                }
                tracing::debug!(identifier = %id, "Converted identifier did not resolve; retrying unconverted");
            }
        }

        match self.provider.parent(&id.with_form(false)) {
            Ok(Some(parent)) => {
                if self.provider.exists(&parent).unwrap_or(false) {
                    return ResolutionResult::Parent(parent);
                }
                tracing::debug!(identifier = %id, parent = %parent, "Native parent does not exist");
            }
            Ok(None) => {
                tracing::debug!(identifier = %id, "Provider exposes no parent");
            }
            Err(err) => {
                tracing::debug!(identifier = %id, error = %err, "Native parent lookup failed");
            }
        }

        if kind == ProviderKind::LegacyDownloads {
            if let Some(parent) = raw_string_parent(id) {
                return ResolutionResult::Parent(parent);
            }
        }

        ResolutionResult::NotResolvable
    }

    /// Resolve the children of `id`.
    ///
    /// A file identifier is first normalized to its containing directory
    /// via [`Self::resolve_parent`], so "list the siblings of a picked
    /// file" and "list a granted directory" share one entry point. `Flat`
    /// mode returns direct children that are files, in provider order;
    /// `Recursive` mode walks the whole tree collecting files, skipping
    /// unreadable subtrees.
    pub fn resolve_children(&self, id: &DocumentIdentifier, mode: ListMode) -> ResolutionResult {
        // Converting preemptively lets every later strategy use the less
        // restricted external storage encoding.
        let target = convert::prefer_external_storage(id);

        let dir = match self.provider.is_directory(&target) {
            Ok(false) => match self.resolve_parent(&target) {
                ResolutionResult::Parent(parent) => parent,
                _ => return ResolutionResult::NotResolvable,
            },
            // Directory, or unknown to the provider: attempt the strategy
            // chain on the identifier as-is.
            _ => target.clone(),
        };

        match mode {
            ListMode::Flat => match self.children_of(&dir) {
                Ok(entries) => ResolutionResult::Children(
                    entries
                        .into_iter()
                        .filter(|entry| !entry.is_directory)
                        .map(|entry| entry.id)
                        .collect(),
                ),
                Err(err) => {
                    tracing::debug!(directory = %dir, error = %err, "All listing strategies exhausted");
                    ResolutionResult::NotResolvable
                }
            },
            // Seed the walk with the entries already produced by the
            // strategy chain; the target itself is never re-classified,
            // so a directory the provider cannot look up (known only to
            // the metadata index, say) still walks as a directory.
            ListMode::Recursive => match self.children_of(&dir) {
                Ok(entries) => ResolutionResult::Children(walk::walk_with(entries, |d| {
                    self.children_of(d)
                })),
                Err(err) => {
                    tracing::debug!(directory = %dir, error = %err, "All listing strategies exhausted");
                    ResolutionResult::NotResolvable
                }
            },
        }
    }

    /// Direct children of a directory via the ordered strategy chain:
    /// grant-scoped navigation, native listing, metadata-index query,
    /// raw filesystem listing. A non-empty result wins; empty results
    /// and failures fall through.
    fn children_of(&self, dir: &DocumentIdentifier) -> Result<Vec<Entry>, ProviderError> {
        if let Some(grant) = self.find_covering_grant(dir) {
            if grant.root != *dir {
                match self.list_via_grant(&grant, dir) {
                    Ok(children) if !children.is_empty() => {
                        return Ok(self.tag_entries(children));
                    }
                    Ok(_) => {
                        tracing::debug!(directory = %dir, root = %grant.root, "Grant-scoped listing empty");
                    }
                    Err(err) => {
                        tracing::debug!(directory = %dir, root = %grant.root, error = %err, "Grant-scoped listing failed");
                    }
                }
            }
        }

        match self.provider.list_children(&dir.with_form(false)) {
            Ok(children) if !children.is_empty() => {
                return Ok(self.tag_entries(children));
            }
            Ok(_) => {
                tracing::debug!(directory = %dir, "Native listing empty");
            }
            Err(err) => {
                tracing::debug!(directory = %dir, error = %err, "Native listing failed");
            }
        }

        if ProviderKind::classify(&dir.authority) == ProviderKind::LegacyDownloads {
            if let Some(path) = convert::raw_path(dir) {
                let prefix = format!("{}/", path.trim_end_matches('/'));
                match self.provider.query_by_path_prefix(&prefix) {
                    Ok(hits) => {
                        let entries: Vec<Entry> = hits
                            .iter()
                            .filter_map(|hit| {
                                // Direct children only; deeper hits belong
                                // to the recursive walk.
                                let name = hit.path.strip_prefix(&prefix)?;
                                if name.is_empty() || name.contains('/') {
                                    return None;
                                }
                                Some(Entry {
                                    id: child_of(dir, name),
                                    is_directory: hit.is_directory,
                                })
                            })
                            .collect();
                        if !entries.is_empty() {
                            return Ok(entries);
                        }
                        tracing::debug!(directory = %dir, "Metadata-index query returned no direct children");
                    }
                    Err(err) => {
                        tracing::debug!(directory = %dir, error = %err, "Metadata-index query failed");
                    }
                }
            }
        }

        if let Some(path) = convert::filesystem_path(dir) {
            match self.provider.read_dir_path(&path) {
                Ok(entries) if !entries.is_empty() => {
                    let prefix = format!("{}/", path.trim_end_matches('/'));
                    return Ok(entries
                        .into_iter()
                        .filter_map(|entry| {
                            let name = entry.path.strip_prefix(&prefix)?.to_string();
                            if name.is_empty() || name.contains('/') {
                                return None;
                            }
                            Some(Entry {
                                id: child_of(dir, &name),
                                is_directory: entry.is_directory,
                            })
                        })
                        .collect());
                }
                Ok(_) => {
                    tracing::debug!(directory = %dir, path = %path, "Raw path listing empty");
                }
                Err(err) => {
                    tracing::debug!(directory = %dir, path = %path, error = %err, "Raw path listing failed");
                }
            }
        }

        Err(ProviderError::NotFound(dir.to_string()))
    }

    /// Walk down from a grant root to `dir` by path-segment matching and
    /// list the target through the grant's capability. Bounded by the
    /// target path's actual length; a segment that cannot be found gives
    /// up rather than looping.
    fn list_via_grant(
        &self,
        grant: &Grant,
        dir: &DocumentIdentifier,
    ) -> Result<Vec<DocumentIdentifier>, ProviderError> {
        let unsupported = || {
            ProviderError::Unsupported(format!(
                "Encoding of {dir} does not support segment navigation"
            ))
        };
        let root_path = convert::encoded_path(&grant.root).ok_or_else(unsupported)?;
        let dir_path = convert::encoded_path(dir).ok_or_else(unsupported)?;

        let mut current = grant.root.with_form(false);
        for depth in root_path.segments().len()..dir_path.segments().len() {
            let want = &dir_path.segments()[..=depth];
            let children = self.provider.list_children_via(&grant.root, &current)?;
            current = children
                .into_iter()
                .find(|child| {
                    convert::encoded_path(child)
                        .is_some_and(|p| p.anchor() == dir_path.anchor() && p.segments() == want)
                })
                .ok_or_else(|| {
                    ProviderError::NotFound(format!(
                        "No child at segment depth {depth} walking from {}",
                        grant.root
                    ))
                })?;
        }

        self.provider.list_children_via(&grant.root, &current)
    }

    fn tag_entries(&self, children: Vec<DocumentIdentifier>) -> Vec<Entry> {
        children
            .into_iter()
            .map(|id| {
                // A child the provider cannot classify is treated as a
                // directory: it never appears in a flat result, and the
                // recursive walk prunes it when its listing fails.
                let is_directory = self.provider.is_directory(&id).unwrap_or(true);
                Entry { id, is_directory }
            })
            .collect()
    }
}

/// Parent of a legacy raw-path identifier by string manipulation, as a
/// tree identifier under the same authority. `None` at the path root.
fn raw_string_parent(id: &DocumentIdentifier) -> Option<DocumentIdentifier> {
    let path = convert::raw_path(id)?;
    let trimmed = path.trim_end_matches('/');
    let (parent, last) = trimmed.rsplit_once('/')?;
    if parent.is_empty() || last.is_empty() {
        return None;
    }
    Some(DocumentIdentifier::tree(
        &id.authority,
        format!("{}{}", convert::RAW_PREFIX, parent),
    ))
}

/// Child identifier for `name` directly under `dir`, preserving the
/// directory's encoding unmodified.
fn child_of(dir: &DocumentIdentifier, name: &str) -> DocumentIdentifier {
    DocumentIdentifier::document(
        &dir.authority,
        format!("{}/{}", dir.encoded_id.trim_end_matches('/'), name),
    )
}
