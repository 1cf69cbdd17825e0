//! Document identifier model.
//!
//! Identifiers come in two shapes:
//!
//! - document form: `{authority}:{encoded-id}`, a single document
//! - tree form: `tree:{authority}:{encoded-id}`, a directory grant root
//!
//! The authority names the provider that owns the identifier; the encoded id
//! is opaque to everything outside the converter. The `tree:` marker is a
//! reserved shape prefix and cannot itself be an authority.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Error for identifier strings that cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The string has no authority segment before the first `/`.
    #[error("Missing authority segment in identifier: {0}")]
    MissingAuthority(String),
    /// The authority or encoded id segment is empty.
    #[error("Empty {0} segment in identifier")]
    EmptySegment(&'static str),
}

/// An opaque, provider-scoped document identifier.
///
/// Two identifiers are equal iff their authority and encoded id are
/// byte-equal; the form marker does not participate in equality, since both
/// forms address the same underlying document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentIdentifier {
    /// Provider authority that owns this identifier.
    pub authority: String,
    /// Provider-specific encoded id. Opaque outside the converter.
    pub encoded_id: String,
    /// Whether this is a tree-form (directory grant) identifier.
    pub is_tree_form: bool,
}

impl DocumentIdentifier {
    /// Shape marker prefix for tree-form identifiers.
    pub const TREE_MARKER: &'static str = "tree:";

    /// Create a document-form identifier.
    pub fn document(authority: impl Into<String>, encoded_id: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
            encoded_id: encoded_id.into(),
            is_tree_form: false,
        }
    }

    /// Create a tree-form identifier.
    pub fn tree(authority: impl Into<String>, encoded_id: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
            encoded_id: encoded_id.into(),
            is_tree_form: true,
        }
    }

    /// Parse an identifier from its wire string.
    ///
    /// A raw string is recognized as tree form when it carries the `tree:`
    /// shape marker; otherwise it is document form. The authority must be
    /// non-empty and must precede any `/` in the string.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let (is_tree_form, rest) = match raw.strip_prefix(Self::TREE_MARKER) {
            Some(rest) => (true, rest),
            None => (false, raw),
        };

        let (authority, encoded_id) = rest
            .split_once(':')
            .ok_or_else(|| ParseError::MissingAuthority(raw.to_string()))?;

        if authority.is_empty() {
            return Err(ParseError::EmptySegment("authority"));
        }
        if authority.contains('/') {
            // The first `:` appeared inside a path, not after an authority.
            return Err(ParseError::MissingAuthority(raw.to_string()));
        }
        if encoded_id.is_empty() {
            return Err(ParseError::EmptySegment("encoded id"));
        }

        Ok(Self {
            authority: authority.to_string(),
            encoded_id: encoded_id.to_string(),
            is_tree_form,
        })
    }

    /// Return this identifier with the same authority and encoded id but a
    /// different form marker.
    pub fn with_form(&self, is_tree_form: bool) -> Self {
        Self {
            authority: self.authority.clone(),
            encoded_id: self.encoded_id.clone(),
            is_tree_form,
        }
    }
}

impl fmt::Display for DocumentIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_tree_form {
            write!(f, "{}{}:{}", Self::TREE_MARKER, self.authority, self.encoded_id)
        } else {
            write!(f, "{}:{}", self.authority, self.encoded_id)
        }
    }
}

impl PartialEq for DocumentIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.authority == other.authority && self.encoded_id == other.encoded_id
    }
}

impl Eq for DocumentIdentifier {}

impl Hash for DocumentIdentifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.authority.hash(state);
        self.encoded_id.hash(state);
    }
}

impl PartialOrd for DocumentIdentifier {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DocumentIdentifier {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.authority
            .cmp(&other.authority)
            .then_with(|| self.encoded_id.cmp(&other.encoded_id))
    }
}
