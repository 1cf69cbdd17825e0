//! Core types for the document resolver.

pub mod grant;
pub mod identifier;
pub mod provider_kind;
pub mod resolution;

pub use grant::Grant;
pub use identifier::{DocumentIdentifier, ParseError};
pub use provider_kind::{ProviderKind, EXTERNAL_STORAGE_AUTHORITY, LEGACY_DOWNLOADS_AUTHORITY};
pub use resolution::{ListMode, ResolutionResult};
