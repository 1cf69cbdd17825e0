//! Provider classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Authority of the modern external-storage provider.
pub const EXTERNAL_STORAGE_AUTHORITY: &str = "external-storage";

/// Authority of the legacy downloads provider.
pub const LEGACY_DOWNLOADS_AUTHORITY: &str = "legacy-downloads";

/// Provider kind derived purely from an identifier's authority.
///
/// The kind drives which fallback strategies apply. `Other` providers are
/// handled only through the generic strategy path; their encoded ids are
/// never parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    /// The modern external-storage provider (`volume:relative/path` encoding).
    ExternalStorage,
    /// The legacy downloads provider (`raw:` paths and root markers).
    LegacyDownloads,
    /// Any unrecognized provider.
    Other,
}

impl ProviderKind {
    /// Classify an authority string. Total and deterministic: every authority
    /// maps to exactly one kind; unrecognized authorities map to `Other`.
    pub fn classify(authority: &str) -> Self {
        match authority {
            EXTERNAL_STORAGE_AUTHORITY => Self::ExternalStorage,
            LEGACY_DOWNLOADS_AUTHORITY => Self::LegacyDownloads,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExternalStorage => write!(f, "external-storage"),
            Self::LegacyDownloads => write!(f, "legacy-downloads"),
            Self::Other => write!(f, "other"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_authorities() {
        assert_eq!(
            ProviderKind::classify(EXTERNAL_STORAGE_AUTHORITY),
            ProviderKind::ExternalStorage
        );
        assert_eq!(
            ProviderKind::classify(LEGACY_DOWNLOADS_AUTHORITY),
            ProviderKind::LegacyDownloads
        );
    }

    #[test]
    fn test_classify_unrecognized_is_other() {
        assert_eq!(ProviderKind::classify("media-store"), ProviderKind::Other);
        assert_eq!(ProviderKind::classify(""), ProviderKind::Other);
        assert_eq!(
            ProviderKind::classify("EXTERNAL-STORAGE"),
            ProviderKind::Other
        );
    }

    #[test]
    fn test_classify_deterministic() {
        for authority in ["external-storage", "legacy-downloads", "x", ""] {
            assert_eq!(
                ProviderKind::classify(authority),
                ProviderKind::classify(authority)
            );
        }
    }
}
