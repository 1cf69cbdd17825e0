//! Pure identifier conversions.
//!
//! The legacy downloads provider exposes the same physical files as the
//! external-storage provider under a different, more restrictive encoding on
//! newer platform versions. Converting preemptively lets later resolution
//! steps use the less-restricted scheme.
//!
//! The path heuristics here are deliberately conservative: platform behavior
//! differs across versions, and the recognized sub-formats are only partially
//! enumerable from observed behavior. Anything unrecognized is
//! `ConversionError::UnsupportedFormat`, never a guess.

use crate::types::{
    DocumentIdentifier, ProviderKind, EXTERNAL_STORAGE_AUTHORITY,
};

/// Absolute root of shared storage on the primary volume.
pub const SHARED_STORAGE_ROOT: &str = "/storage/emulated/0";

/// Canonical name of the download folder in the external-storage encoding.
pub const CANONICAL_DOWNLOAD_FOLDER: &str = "Download";

/// Volume prefix used by the external-storage encoding for internal storage.
pub const PRIMARY_VOLUME: &str = "primary";

/// Prefix of the legacy downloads raw-path sub-format.
pub const RAW_PREFIX: &str = "raw:";

/// Bare markers the legacy provider uses for its downloads root.
const DOWNLOADS_ROOT_MARKERS: [&str; 2] = ["downloads", "msf:downloads"];

/// Error for conversions whose precondition fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// The identifier's authority is not the legacy downloads provider.
    #[error("Not a legacy downloads identifier: {0}")]
    NotLegacyDownloads(String),
    /// The encoded id's sub-format is not recognized.
    #[error("Unsupported legacy encoding sub-format: {0}")]
    UnsupportedFormat(String),
    /// The raw path carries no shared-storage or download anchor to rebase from.
    #[error("No recognizable path anchor in: {0}")]
    NoPathAnchor(String),
}

/// Segment view of an encoded id, for providers whose encoding nests as a
/// path. `anchor` is the non-path portion (volume name for external storage,
/// the raw marker for legacy downloads).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPath {
    // Construction goes through `encoded_path`, which never produces a
    // view for an `Other` provider.
    kind: ProviderKind,
    anchor: String,
    segments: Vec<String>,
}

impl EncodedPath {
    /// Volume or sub-format anchor.
    pub fn anchor(&self) -> &str {
        &self.anchor
    }

    /// Path segments, in order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Rebuild the encoded id string for this view.
    pub fn to_encoded(&self) -> String {
        if self.kind == ProviderKind::ExternalStorage {
            format!("{}:{}", self.anchor, self.segments.join("/"))
        } else {
            // Legacy raw paths are absolute.
            format!("{}:/{}", self.anchor, self.segments.join("/"))
        }
    }

    /// The view with the last segment dropped, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        let mut parent = self.clone();
        parent.segments.pop();
        Some(parent)
    }
}

/// Extract the segment view of an identifier's encoded id.
///
/// Returns `None` for `Other` providers, for legacy encodings that are not
/// the raw-path sub-format, and for malformed encodings. Only this module
/// inspects encoded id structure; everything else treats it as opaque.
pub fn encoded_path(id: &DocumentIdentifier) -> Option<EncodedPath> {
    match ProviderKind::classify(&id.authority) {
        ProviderKind::ExternalStorage => {
            let (volume, relative) = id.encoded_id.split_once(':')?;
            if volume.is_empty() {
                return None;
            }
            Some(EncodedPath {
                kind: ProviderKind::ExternalStorage,
                anchor: volume.to_string(),
                segments: split_segments(relative),
            })
        }
        ProviderKind::LegacyDownloads => {
            let path = raw_path(id)?;
            Some(EncodedPath {
                kind: ProviderKind::LegacyDownloads,
                anchor: "raw".to_string(),
                segments: split_segments(path),
            })
        }
        ProviderKind::Other => None,
    }
}

/// The absolute filesystem path carried by a legacy raw-format encoded id.
pub fn raw_path(id: &DocumentIdentifier) -> Option<&str> {
    let path = id.encoded_id.strip_prefix(RAW_PREFIX)?;
    if path.starts_with('/') {
        Some(path)
    } else {
        None
    }
}

/// A direct filesystem path for this identifier, when one is derivable:
/// the raw path for legacy raw encodings, or the shared-storage path for
/// primary-volume external-storage encodings.
pub fn filesystem_path(id: &DocumentIdentifier) -> Option<String> {
    match ProviderKind::classify(&id.authority) {
        ProviderKind::LegacyDownloads => raw_path(id).map(str::to_string),
        ProviderKind::ExternalStorage => {
            let (volume, relative) = id.encoded_id.split_once(':')?;
            if volume != PRIMARY_VOLUME {
                return None;
            }
            Some(format!("{}/{}", SHARED_STORAGE_ROOT, relative))
        }
        ProviderKind::Other => None,
    }
}

/// Extract a tree's root document as a document-form identifier.
///
/// Valid only for tree-form identifiers.
pub fn tree_to_document(id: &DocumentIdentifier) -> Option<DocumentIdentifier> {
    if !id.is_tree_form {
        return None;
    }
    Some(id.with_form(false))
}

/// Rebuild a document-form identifier as a tree root.
///
/// Structurally always succeeds for document-form inputs; whether the
/// resulting tree is actually grantable is a runtime concern.
pub fn document_to_tree(id: &DocumentIdentifier) -> Option<DocumentIdentifier> {
    if id.is_tree_form {
        return None;
    }
    Some(id.with_form(true))
}

/// Convert a legacy downloads identifier to the external-storage encoding.
///
/// Recognized sub-formats:
///
/// - `raw:{absolute-path}`: the path is rewritten relative to the
///   shared-storage root, or rebased from a `Download`/`Downloads` segment
///   (normalizing the plural spelling), whichever anchor is found first.
/// - bare root markers (`downloads`, `msf:downloads`): converted
///   unconditionally to the canonical download folder root.
///
/// The form marker is preserved across the conversion.
pub fn legacy_downloads_to_external_storage(
    id: &DocumentIdentifier,
) -> Result<DocumentIdentifier, ConversionError> {
    if ProviderKind::classify(&id.authority) != ProviderKind::LegacyDownloads {
        return Err(ConversionError::NotLegacyDownloads(id.to_string()));
    }

    if DOWNLOADS_ROOT_MARKERS.contains(&id.encoded_id.as_str()) {
        return Ok(rebuilt(id, CANONICAL_DOWNLOAD_FOLDER.to_string()));
    }

    let path = raw_path(id)
        .ok_or_else(|| ConversionError::UnsupportedFormat(id.encoded_id.clone()))?;

    if let Some(relative) = strip_shared_storage_root(path) {
        return Ok(rebuilt(id, relative.to_string()));
    }

    // No shared-storage prefix: rebase from a Download/Downloads segment.
    let segments = split_segments(path);
    let anchor_index = segments
        .iter()
        .position(|s| s == CANONICAL_DOWNLOAD_FOLDER || s == "Downloads")
        .ok_or_else(|| ConversionError::NoPathAnchor(path.to_string()))?;

    let mut rebased = segments[anchor_index..].to_vec();
    rebased[0] = CANONICAL_DOWNLOAD_FOLDER.to_string();
    Ok(rebuilt(id, rebased.join("/")))
}

/// Tolerant conversion wrapper: the converted identifier when conversion
/// applies, the input unchanged otherwise. Idempotent: a successfully
/// converted identifier reclassifies as external storage, so a second
/// application is a no-op.
pub fn prefer_external_storage(id: &DocumentIdentifier) -> DocumentIdentifier {
    legacy_downloads_to_external_storage(id).unwrap_or_else(|_| id.clone())
}

fn rebuilt(id: &DocumentIdentifier, relative: String) -> DocumentIdentifier {
    DocumentIdentifier {
        authority: EXTERNAL_STORAGE_AUTHORITY.to_string(),
        encoded_id: format!("{}:{}", PRIMARY_VOLUME, relative),
        is_tree_form: id.is_tree_form,
    }
}

fn strip_shared_storage_root(path: &str) -> Option<&str> {
    if let Some(rest) = path.strip_prefix(SHARED_STORAGE_ROOT) {
        // "/storage/emulated/0/x" and the bare root "/storage/emulated/0".
        if rest.is_empty() {
            return Some("");
        }
        if let Some(relative) = rest.strip_prefix('/') {
            return Some(relative);
        }
    }
    None
}

fn split_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
