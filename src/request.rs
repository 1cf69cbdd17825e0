//! Typed request surface for the bridge layer.
//!
//! Operations arrive as a closed enum and are matched exhaustively; there
//! is no string-keyed dispatch. Each request travels in an envelope with a
//! correlation token, and the response echoes the token back so the bridge
//! can pair them without shared mutable state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::provider::{DocumentProvider, ProviderError};
use crate::resolver::DocumentResolver;
use crate::types::{DocumentIdentifier, ListMode, ParseError, ResolutionResult};

/// Opaque token pairing a response with its request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CorrelationToken(pub Uuid);

impl CorrelationToken {
    /// Generate a fresh token.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CorrelationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A resolution operation, one variant per supported request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ResolverRequest {
    /// Direct file children of the identifier's directory.
    ResolveChildrenFlat {
        /// Wire-form identifier.
        identifier: String,
    },
    /// All file descendants of the identifier's directory.
    ResolveChildrenRecursive {
        /// Wire-form identifier.
        identifier: String,
    },
    /// The directory containing the identifier.
    ResolveParent {
        /// Wire-form identifier.
        identifier: String,
    },
    /// All persisted grant roots.
    ListGrants,
    /// Most specific persisted grant covering the identifier.
    FindCoveringGrant {
        /// Wire-form identifier.
        identifier: String,
    },
}

/// Successful payload of a resolver operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverResponse {
    /// An ordered list of wire-form identifiers.
    Identifiers(Vec<String>),
    /// A single optional wire-form identifier.
    Identifier(Option<String>),
}

/// Caller-visible failure of a resolver operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// The identifier string could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The provider failed outside any recoverable strategy chain.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// A request paired with its correlation token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Token echoed back in the response.
    pub token: CorrelationToken,
    /// The operation to perform.
    #[serde(flatten)]
    pub request: ResolverRequest,
}

impl RequestEnvelope {
    /// Wrap a request with a fresh token.
    pub fn new(request: ResolverRequest) -> Self {
        Self {
            token: CorrelationToken::new(),
            request,
        }
    }
}

/// Outcome of a dispatched envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseOutcome {
    /// The operation succeeded.
    Ok(ResolverResponse),
    /// The operation failed with a descriptive message.
    Error {
        /// Human-readable failure description.
        message: String,
    },
}

/// A response paired with the originating request's token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Token copied from the request envelope.
    pub token: CorrelationToken,
    /// Success payload or failure message.
    pub outcome: ResponseOutcome,
}

/// Dispatch a single operation against the resolver.
///
/// Resolution outcomes map onto the wire contract: an unresolvable
/// children listing is an empty list, an unresolvable parent is `None`,
/// and a covering-grant lookup never fails (a malformed identifier simply
/// has no covering grant).
pub fn dispatch<P: DocumentProvider>(
    resolver: &DocumentResolver<P>,
    request: &ResolverRequest,
) -> Result<ResolverResponse, RequestError> {
    match request {
        ResolverRequest::ResolveChildrenFlat { identifier } => {
            let id = DocumentIdentifier::parse(identifier)?;
            Ok(children_payload(resolver.resolve_children(&id, ListMode::Flat)))
        }
        ResolverRequest::ResolveChildrenRecursive { identifier } => {
            let id = DocumentIdentifier::parse(identifier)?;
            Ok(children_payload(
                resolver.resolve_children(&id, ListMode::Recursive),
            ))
        }
        ResolverRequest::ResolveParent { identifier } => {
            let id = DocumentIdentifier::parse(identifier)?;
            let parent = match resolver.resolve_parent(&id) {
                ResolutionResult::Parent(parent) => Some(parent.to_string()),
                _ => None,
            };
            Ok(ResolverResponse::Identifier(parent))
        }
        ResolverRequest::ListGrants => {
            let grants = resolver.provider().list_grants()?;
            Ok(ResolverResponse::Identifiers(
                grants.into_iter().map(|g| g.root.to_string()).collect(),
            ))
        }
        ResolverRequest::FindCoveringGrant { identifier } => {
            let covering = DocumentIdentifier::parse(identifier)
                .ok()
                .and_then(|id| resolver.find_covering_grant(&id))
                .map(|grant| grant.root.to_string());
            Ok(ResolverResponse::Identifier(covering))
        }
    }
}

/// Dispatch an envelope, echoing its token in the response.
pub fn handle<P: DocumentProvider>(
    resolver: &DocumentResolver<P>,
    envelope: &RequestEnvelope,
) -> ResponseEnvelope {
    let outcome = match dispatch(resolver, &envelope.request) {
        Ok(response) => ResponseOutcome::Ok(response),
        Err(err) => {
            tracing::warn!(token = %envelope.token, error = %err, "Request failed");
            ResponseOutcome::Error {
                message: err.to_string(),
            }
        }
    };
    ResponseEnvelope {
        token: envelope.token,
        outcome,
    }
}

fn children_payload(result: ResolutionResult) -> ResolverResponse {
    match result {
        ResolutionResult::Children(children) => ResolverResponse::Identifiers(
            children.into_iter().map(|c| c.to_string()).collect(),
        ),
        _ => ResolverResponse::Identifiers(Vec::new()),
    }
}
