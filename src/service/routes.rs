//! Axum routes for the document resolver service.

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::provider::{DocumentProvider, InMemoryProvider, ProviderError};
use crate::request::{dispatch, RequestError, ResolverRequest, ResolverResponse};
use crate::RESOLVER_SCHEMA_VERSION;

use super::state::ServiceState;

/// Type alias for the service state with the in-memory provider backend.
pub type AppState = ServiceState<InMemoryProvider>;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request naming a single wire-form identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifierRequest {
    /// Wire-form identifier.
    pub identifier: String,
}

/// Response carrying an ordered list of identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifierListResponse {
    /// Wire-form identifiers, in resolution order.
    pub identifiers: Vec<String>,
    /// Number of identifiers.
    pub count: usize,
}

/// Response carrying a single optional identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifierResponse {
    /// Wire-form identifier, if one resolved.
    pub identifier: Option<String>,
}

/// Response listing persisted grant roots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantListResponse {
    /// Tree-form grant roots.
    pub grants: Vec<String>,
    /// Number of grants.
    pub count: usize,
}

/// Service health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub schema_version: String,
    pub grant_count: usize,
}

/// Simple liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessResponse {
    pub status: String,
}

/// Structured error response with correlation ID for tracing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Machine-readable error code.
    pub code: String,
    /// Correlation ID for request tracing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// Additional error details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response with code and message.
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            correlation_id: None,
            details: None,
        }
    }

    /// Add a correlation ID to the error.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Add details to the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> axum::response::Response {
        tracing::warn!(
            code = %self.code,
            error = %self.error,
            correlation_id = ?self.correlation_id,
            "Request error"
        );
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}

fn error_for(err: RequestError, identifier: &str) -> (StatusCode, Json<ErrorResponse>) {
    match err {
        RequestError::Parse(parse) => (
            StatusCode::BAD_REQUEST,
            Json(
                ErrorResponse::new("INVALID_IDENTIFIER", parse.to_string())
                    .with_details(identifier.to_string()),
            ),
        ),
        RequestError::Provider(provider) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("PROVIDER_FAILED", provider.to_string())),
        ),
    }
}

fn identifiers_of(response: ResolverResponse) -> Vec<String> {
    match response {
        ResolverResponse::Identifiers(identifiers) => identifiers,
        ResolverResponse::Identifier(one) => one.into_iter().collect(),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Direct file children of the identifier's directory.
async fn flat_children_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IdentifierRequest>,
) -> Result<Json<IdentifierListResponse>, (StatusCode, Json<ErrorResponse>)> {
    let response = dispatch(
        &state.resolver,
        &ResolverRequest::ResolveChildrenFlat {
            identifier: request.identifier.clone(),
        },
    )
    .map_err(|e| error_for(e, &request.identifier))?;

    let identifiers = identifiers_of(response);
    Ok(Json(IdentifierListResponse {
        count: identifiers.len(),
        identifiers,
    }))
}

/// All file descendants of the identifier's directory.
async fn recursive_children_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IdentifierRequest>,
) -> Result<Json<IdentifierListResponse>, (StatusCode, Json<ErrorResponse>)> {
    let response = dispatch(
        &state.resolver,
        &ResolverRequest::ResolveChildrenRecursive {
            identifier: request.identifier.clone(),
        },
    )
    .map_err(|e| error_for(e, &request.identifier))?;

    let identifiers = identifiers_of(response);
    Ok(Json(IdentifierListResponse {
        count: identifiers.len(),
        identifiers,
    }))
}

/// The directory containing the identifier, if resolvable.
async fn parent_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IdentifierRequest>,
) -> Result<Json<IdentifierResponse>, (StatusCode, Json<ErrorResponse>)> {
    let response = dispatch(
        &state.resolver,
        &ResolverRequest::ResolveParent {
            identifier: request.identifier.clone(),
        },
    )
    .map_err(|e| error_for(e, &request.identifier))?;

    let identifier = match response {
        ResolverResponse::Identifier(identifier) => identifier,
        ResolverResponse::Identifiers(mut many) => many.pop(),
    };
    Ok(Json(IdentifierResponse { identifier }))
}

/// All persisted grant roots.
async fn list_grants_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<GrantListResponse>, (StatusCode, Json<ErrorResponse>)> {
    let response = dispatch(&state.resolver, &ResolverRequest::ListGrants)
        .map_err(|e| error_for(e, ""))?;

    let grants = identifiers_of(response);
    Ok(Json(GrantListResponse {
        count: grants.len(),
        grants,
    }))
}

/// Most specific persisted grant covering the identifier. Never fails: a
/// malformed identifier simply has no covering grant.
async fn covering_grant_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IdentifierRequest>,
) -> Result<Json<IdentifierResponse>, (StatusCode, Json<ErrorResponse>)> {
    let response = dispatch(
        &state.resolver,
        &ResolverRequest::FindCoveringGrant {
            identifier: request.identifier.clone(),
        },
    )
    .map_err(|e| error_for(e, &request.identifier))?;

    let identifier = match response {
        ResolverResponse::Identifier(identifier) => identifier,
        ResolverResponse::Identifiers(mut many) => many.pop(),
    };
    Ok(Json(IdentifierResponse { identifier }))
}

/// Persist a grant rooted at a tree-form identifier.
async fn persist_grant_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IdentifierRequest>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let id = crate::types::DocumentIdentifier::parse(&request.identifier).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(
                ErrorResponse::new("INVALID_IDENTIFIER", e.to_string())
                    .with_details(request.identifier.clone()),
            ),
        )
    })?;

    state.provider.persist_grant(&id).map_err(|e| match e {
        ProviderError::Unsupported(message) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("NOT_TREE_FORM", message)),
        ),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("PROVIDER_FAILED", other.to_string())),
        ),
    })?;

    Ok(StatusCode::CREATED)
}

/// Health check endpoint (detailed).
async fn health_handler(
    State(state): State<Arc<AppState>>,
) -> Json<HealthResponse> {
    let grant_count = state.provider.list_grants().map(|g| g.len()).unwrap_or(0);

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        schema_version: RESOLVER_SCHEMA_VERSION.to_string(),
        grant_count,
    })
}

/// Liveness probe endpoint.
///
/// Simple check that the service is running. Does NOT check dependencies.
async fn liveness_handler() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "alive".to_string(),
    })
}

// ============================================================================
// Router Construction
// ============================================================================

/// Create the Axum router for the document resolver service.
pub fn create_router(state: AppState) -> Router {
    let state = Arc::new(state);

    Router::new()
        // Resolution operations
        .route("/api/children/flat", post(flat_children_handler))
        .route("/api/children/recursive", post(recursive_children_handler))
        .route("/api/parent", post(parent_handler))
        // Grant operations
        .route("/api/grants", get(list_grants_handler))
        .route("/api/grants", post(persist_grant_handler))
        .route("/api/grants/covering", post(covering_grant_handler))
        // Health checks
        .route("/health", get(health_handler))
        .route("/health/live", get(liveness_handler))
        .with_state(state)
}
