//! In-memory document provider.
//!
//! Backs tests and the demo service. Uses `BTreeMap` for deterministic
//! iteration order, and models the platform restrictions the resolver's
//! fallback chain exists for: per-node listability, hidden parents, and
//! tree-scoped listing under persisted grants.

use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::grants;
use crate::types::{DocumentIdentifier, Grant, ParseError};

use super::{DocumentProvider, ProviderError, RawEntry};

#[derive(Debug, Clone)]
struct Node {
    is_directory: bool,
    parent: Option<DocumentIdentifier>,
    children: Vec<DocumentIdentifier>,
    /// Direct listing allowed without a covering grant.
    listable: bool,
    /// Native parent lookup exposes the parent.
    parent_visible: bool,
    /// Backing absolute filesystem path, when the node has one.
    fs_path: Option<String>,
    content: Vec<u8>,
}

impl Node {
    fn directory() -> Self {
        Self {
            is_directory: true,
            parent: None,
            children: Vec::new(),
            listable: true,
            parent_visible: true,
            fs_path: None,
            content: Vec::new(),
        }
    }

    fn file() -> Self {
        Self {
            is_directory: false,
            ..Self::directory()
        }
    }
}

/// In-memory provider over a declarative document tree.
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    nodes: BTreeMap<DocumentIdentifier, Node>,
    grants: RwLock<Vec<Grant>>,
}

impl InMemoryProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a directory node.
    pub fn insert_directory(&mut self, id: DocumentIdentifier) {
        self.nodes.insert(id.with_form(false), Node::directory());
    }

    /// Insert a file node.
    pub fn insert_file(&mut self, id: DocumentIdentifier) {
        self.nodes.insert(id.with_form(false), Node::file());
    }

    /// Record `child` as a direct child of `parent`, in insertion order.
    pub fn link_child(&mut self, parent: &DocumentIdentifier, child: &DocumentIdentifier) {
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child.with_form(false));
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent.with_form(false));
        }
    }

    /// Deny direct listing of a directory (still reachable via a covering
    /// grant through [`DocumentProvider::list_children_via`]).
    pub fn restrict_listing(&mut self, id: &DocumentIdentifier) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.listable = false;
        }
    }

    /// Make native parent lookup report no parent for this node.
    pub fn hide_parent(&mut self, id: &DocumentIdentifier) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent_visible = false;
        }
    }

    /// Attach a backing filesystem path, making the node visible to the
    /// metadata index and the raw path listing.
    pub fn set_fs_path(&mut self, id: &DocumentIdentifier, path: impl Into<String>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.fs_path = Some(path.into());
        }
    }

    /// Set file content.
    pub fn set_content(&mut self, id: &DocumentIdentifier, content: impl Into<Vec<u8>>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.content = content.into();
        }
    }

    /// Drop a persisted grant, simulating platform-level revocation.
    pub fn revoke_grant(&self, root: &DocumentIdentifier) {
        let mut grants = self.grants.write().unwrap();
        grants.retain(|g| g.root != *root);
    }

    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Build a provider from a declarative manifest.
    pub fn from_manifest(manifest: &Manifest) -> Result<Self, ParseError> {
        let mut provider = Self::new();
        for entry in &manifest.entries {
            let id = DocumentIdentifier::parse(&entry.id)?;
            if entry.directory {
                provider.insert_directory(id.clone());
            } else {
                provider.insert_file(id.clone());
            }
            if let Some(parent) = &entry.parent {
                let parent = DocumentIdentifier::parse(parent)?;
                provider.link_child(&parent, &id);
            }
            if let Some(path) = &entry.fs_path {
                provider.set_fs_path(&id, path.clone());
            }
            if let Some(content) = &entry.content {
                provider.set_content(&id, content.as_bytes());
            }
            if !entry.listable {
                provider.restrict_listing(&id);
            }
            if !entry.parent_visible {
                provider.hide_parent(&id);
            }
        }
        for root in &manifest.grants {
            // Grants are rooted at tree-form identifiers; coerce so a
            // document-form entry in the manifest still seeds a grant.
            let root = DocumentIdentifier::parse(root)?.with_form(true);
            let mut grants = provider.grants.write().unwrap();
            if !grants.iter().any(|g| g.root == root) {
                grants.push(Grant::new(root.clone()));
            }
        }
        Ok(provider)
    }

    fn node(&self, id: &DocumentIdentifier) -> Result<&Node, ProviderError> {
        self.nodes
            .get(id)
            .ok_or_else(|| ProviderError::NotFound(id.to_string()))
    }

    fn grants_snapshot(&self) -> Vec<Grant> {
        self.grants.read().unwrap().clone()
    }
}

impl DocumentProvider for InMemoryProvider {
    fn exists(&self, id: &DocumentIdentifier) -> Result<bool, ProviderError> {
        Ok(self.nodes.contains_key(id))
    }

    fn is_directory(&self, id: &DocumentIdentifier) -> Result<bool, ProviderError> {
        Ok(self.node(id)?.is_directory)
    }

    fn parent(
        &self,
        id: &DocumentIdentifier,
    ) -> Result<Option<DocumentIdentifier>, ProviderError> {
        let node = self.node(id)?;
        if !node.parent_visible {
            return Ok(None);
        }
        Ok(node.parent.clone())
    }

    fn list_children(
        &self,
        id: &DocumentIdentifier,
    ) -> Result<Vec<DocumentIdentifier>, ProviderError> {
        let node = self.node(id)?;
        if !node.is_directory {
            return Err(ProviderError::Unsupported(format!(
                "Not a directory: {id}"
            )));
        }
        if !node.listable {
            return Err(ProviderError::PermissionDenied(id.to_string()));
        }
        Ok(node.children.clone())
    }

    fn list_children_via(
        &self,
        root: &DocumentIdentifier,
        dir: &DocumentIdentifier,
    ) -> Result<Vec<DocumentIdentifier>, ProviderError> {
        let grants = self.grants_snapshot();
        let Some(covering) = grants.iter().find(|g| g.root == *root) else {
            return Err(ProviderError::PermissionDenied(format!(
                "No persisted grant rooted at {root}"
            )));
        };
        if grants::find_covering(dir, std::slice::from_ref(covering)).is_none() {
            return Err(ProviderError::PermissionDenied(format!(
                "Grant {root} does not cover {dir}"
            )));
        }
        let node = self.node(dir)?;
        if !node.is_directory {
            return Err(ProviderError::Unsupported(format!(
                "Not a directory: {dir}"
            )));
        }
        Ok(node.children.clone())
    }

    fn open_read(&self, id: &DocumentIdentifier) -> Result<Box<dyn Read>, ProviderError> {
        let node = self.node(id)?;
        if node.is_directory {
            return Err(ProviderError::Unsupported(format!(
                "Cannot read a directory: {id}"
            )));
        }
        Ok(Box::new(Cursor::new(node.content.clone())))
    }

    fn query_by_path_prefix(&self, prefix: &str) -> Result<Vec<RawEntry>, ProviderError> {
        Ok(self
            .nodes
            .values()
            .filter(|node| !node.is_directory)
            .filter_map(|node| node.fs_path.as_deref())
            .filter(|path| path.starts_with(prefix))
            .map(|path| RawEntry {
                path: path.to_string(),
                is_directory: false,
            })
            .collect())
    }

    fn read_dir_path(&self, path: &str) -> Result<Vec<RawEntry>, ProviderError> {
        let dir_exists = self.nodes.values().any(|node| {
            node.is_directory && node.fs_path.as_deref() == Some(path)
        });
        if !dir_exists {
            return Err(ProviderError::NotFound(path.to_string()));
        }

        let prefix = format!("{}/", path.trim_end_matches('/'));
        Ok(self
            .nodes
            .values()
            .filter_map(|node| {
                let fs_path = node.fs_path.as_deref()?;
                let rest = fs_path.strip_prefix(&prefix)?;
                // Direct children only.
                if rest.is_empty() || rest.contains('/') {
                    return None;
                }
                Some(RawEntry {
                    path: fs_path.to_string(),
                    is_directory: node.is_directory,
                })
            })
            .collect())
    }

    fn persist_grant(&self, id: &DocumentIdentifier) -> Result<(), ProviderError> {
        if !id.is_tree_form {
            return Err(ProviderError::Unsupported(format!(
                "Grants require a tree-form identifier: {id}"
            )));
        }
        let mut grants = self.grants.write().unwrap();
        if !grants.iter().any(|g| g.root == *id) {
            grants.push(Grant::new(id.clone()));
        }
        Ok(())
    }

    fn list_grants(&self) -> Result<Vec<Grant>, ProviderError> {
        Ok(self.grants_snapshot())
    }
}

/// Declarative description of a provider's document tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Document nodes, parents before children.
    pub entries: Vec<ManifestEntry>,
    /// Tree-form identifiers to persist grants for.
    #[serde(default)]
    pub grants: Vec<String>,
}

/// A single node in a [`Manifest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Wire-form identifier.
    pub id: String,
    /// Whether the node is a directory.
    #[serde(default)]
    pub directory: bool,
    /// Wire-form identifier of the parent, if any.
    #[serde(default)]
    pub parent: Option<String>,
    /// Backing absolute filesystem path.
    #[serde(default)]
    pub fs_path: Option<String>,
    /// Whether direct listing is allowed.
    #[serde(default = "default_true")]
    pub listable: bool,
    /// Whether native parent lookup exposes the parent.
    #[serde(default = "default_true")]
    pub parent_visible: bool,
    /// Inline file content.
    #[serde(default)]
    pub content: Option<String>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> DocumentIdentifier {
        DocumentIdentifier::parse(raw).unwrap()
    }

    fn sample_provider() -> InMemoryProvider {
        let mut p = InMemoryProvider::new();
        let dir = id("external-storage:primary:Download");
        let a = id("external-storage:primary:Download/a.json");
        let b = id("external-storage:primary:Download/b.zip");
        p.insert_directory(dir.clone());
        p.insert_file(a.clone());
        p.insert_file(b.clone());
        p.link_child(&dir, &a);
        p.link_child(&dir, &b);
        p
    }

    #[test]
    fn test_exists_and_kind() {
        let p = sample_provider();
        assert!(p.exists(&id("external-storage:primary:Download")).unwrap());
        assert!(p.is_directory(&id("external-storage:primary:Download")).unwrap());
        assert!(!p
            .is_directory(&id("external-storage:primary:Download/a.json"))
            .unwrap());
        assert!(!p.exists(&id("external-storage:primary:Pictures")).unwrap());
    }

    #[test]
    fn test_list_children_in_insertion_order() {
        let p = sample_provider();
        let children = p.list_children(&id("external-storage:primary:Download")).unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].encoded_id, "primary:Download/a.json");
        assert_eq!(children[1].encoded_id, "primary:Download/b.zip");
    }

    #[test]
    fn test_parent_lookup_and_hiding() {
        let mut p = sample_provider();
        let file = id("external-storage:primary:Download/a.json");
        assert_eq!(
            p.parent(&file).unwrap().unwrap().encoded_id,
            "primary:Download"
        );
        p.hide_parent(&file);
        assert!(p.parent(&file).unwrap().is_none());
    }

    #[test]
    fn test_restricted_listing_denied() {
        let mut p = sample_provider();
        let dir = id("external-storage:primary:Download");
        p.restrict_listing(&dir);
        assert!(matches!(
            p.list_children(&dir),
            Err(ProviderError::PermissionDenied(_))
        ));
    }

    #[test]
    fn test_tree_scoped_listing_under_grant() {
        let mut p = sample_provider();
        let dir = id("external-storage:primary:Download");
        p.restrict_listing(&dir);

        let root = id("tree:external-storage:primary:Download");
        p.persist_grant(&root).unwrap();

        let children = p.list_children_via(&root, &dir).unwrap();
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn test_tree_scoped_listing_requires_covering_grant() {
        let p = sample_provider();
        let root = id("tree:external-storage:primary:Pictures");
        let dir = id("external-storage:primary:Download");
        assert!(matches!(
            p.list_children_via(&root, &dir),
            Err(ProviderError::PermissionDenied(_))
        ));
    }

    #[test]
    fn test_grant_persist_requires_tree_form() {
        let p = sample_provider();
        assert!(matches!(
            p.persist_grant(&id("external-storage:primary:Download")),
            Err(ProviderError::Unsupported(_))
        ));
    }

    #[test]
    fn test_grant_revocation() {
        let p = sample_provider();
        let root = id("tree:external-storage:primary:Download");
        p.persist_grant(&root).unwrap();
        assert_eq!(p.list_grants().unwrap().len(), 1);
        p.revoke_grant(&root);
        assert!(p.list_grants().unwrap().is_empty());
    }

    #[test]
    fn test_query_by_path_prefix() {
        let mut p = sample_provider();
        p.set_fs_path(
            &id("external-storage:primary:Download/a.json"),
            "/storage/emulated/0/Download/a.json",
        );
        p.set_fs_path(
            &id("external-storage:primary:Download/b.zip"),
            "/storage/emulated/0/Download/b.zip",
        );

        let hits = p.query_by_path_prefix("/storage/emulated/0/Download/").unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|e| !e.is_directory));

        let none = p.query_by_path_prefix("/storage/emulated/0/Pictures/").unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_read_dir_path_direct_children_only() {
        let mut p = InMemoryProvider::new();
        let dir = id("legacy-downloads:raw:/storage/emulated/0/Download");
        let file = id("legacy-downloads:raw:/storage/emulated/0/Download/a.json");
        let sub = id("legacy-downloads:raw:/storage/emulated/0/Download/sub");
        let nested = id("legacy-downloads:raw:/storage/emulated/0/Download/sub/deep.json");
        p.insert_directory(dir.clone());
        p.insert_file(file.clone());
        p.insert_directory(sub.clone());
        p.insert_file(nested.clone());
        p.set_fs_path(&dir, "/storage/emulated/0/Download");
        p.set_fs_path(&file, "/storage/emulated/0/Download/a.json");
        p.set_fs_path(&sub, "/storage/emulated/0/Download/sub");
        p.set_fs_path(&nested, "/storage/emulated/0/Download/sub/deep.json");

        let entries = p.read_dir_path("/storage/emulated/0/Download").unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| e.path.ends_with("a.json") && !e.is_directory));
        assert!(entries.iter().any(|e| e.path.ends_with("sub") && e.is_directory));
    }

    #[test]
    fn test_open_read_round_trips_content() {
        let mut p = sample_provider();
        let file = id("external-storage:primary:Download/a.json");
        p.set_content(&file, br#"{"ok":true}"#.to_vec());

        let mut buf = String::new();
        p.open_read(&file).unwrap().read_to_string(&mut buf).unwrap();
        assert_eq!(buf, r#"{"ok":true}"#);
    }

    #[test]
    fn test_from_manifest() {
        let manifest: Manifest = serde_json::from_str(
            r#"{
                "entries": [
                    {"id": "external-storage:primary:Download", "directory": true},
                    {"id": "external-storage:primary:Download/a.json",
                     "parent": "external-storage:primary:Download",
                     "content": "hello"}
                ],
                "grants": ["tree:external-storage:primary:Download"]
            }"#,
        )
        .unwrap();

        let p = InMemoryProvider::from_manifest(&manifest).unwrap();
        assert_eq!(p.num_nodes(), 2);
        assert_eq!(p.list_grants().unwrap().len(), 1);
        let children = p.list_children(&id("external-storage:primary:Download")).unwrap();
        assert_eq!(children.len(), 1);
    }
}
