//! # document-resolver
//!
//! Identifier resolution over inconsistent document providers.
//!
//! The resolver answers one question:
//!
//! > Given a picked file or a granted directory, how do I list its
//! > siblings or walk its tree?
//!
//! Providers encode the same physical file differently, restrict directory
//! listing differently across platform versions, and sometimes refuse to
//! expose a file's parent at all. The resolver hides that behind one
//! stable contract.
//!
//! ## Core Contract
//!
//! 1. Parse an opaque identifier and classify its provider authority
//! 2. Convert restrictive legacy encodings to the external storage encoding
//! 3. Resolve parents and children through an ordered fallback chain,
//!    consulting persisted grants, native listing, the metadata index,
//!    and raw filesystem paths in turn
//!
//! ## Architecture
//!
//! ```text
//! Request → Identifier Model → Classifier → Resolution Engine → Result
//!                                   ↓            ↓
//!                              Converter    Grant Matcher
//!                                   ↓            ↓
//!                          DocumentProvider (capability interface)
//! ```
//!
//! ## Resolution Guarantees
//!
//! - Strategy-level failures never abort a call; only exhaustion of the
//!   whole chain is caller-visible
//! - Children keep provider order, never sorted
//! - An unreadable subtree shrinks a recursive result, never errors it

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod convert;
pub mod grants;
pub mod provider;
pub mod request;
pub mod resolver;
pub mod types;
pub mod walk;

#[cfg(feature = "service")]
pub mod service;

// Re-exports
pub use types::{
    DocumentIdentifier, Grant, ListMode, ParseError, ProviderKind, ResolutionResult,
    EXTERNAL_STORAGE_AUTHORITY, LEGACY_DOWNLOADS_AUTHORITY,
};
pub use convert::ConversionError;
pub use grants::find_covering;
pub use provider::{DocumentProvider, InMemoryProvider, Manifest, ManifestEntry, ProviderError};
pub use request::{
    dispatch, handle, CorrelationToken, RequestEnvelope, RequestError, ResolverRequest,
    ResolverResponse, ResponseEnvelope, ResponseOutcome,
};
pub use resolver::DocumentResolver;
pub use walk::collect_files;

// Service re-exports (when service feature is enabled)
#[cfg(feature = "service")]
pub use service::{create_router, ServiceState};

/// Schema version for the wire-facing request and response types.
/// Increment on breaking changes to any of them.
pub const RESOLVER_SCHEMA_VERSION: &str = "1.0.0";
