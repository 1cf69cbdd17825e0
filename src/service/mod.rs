//! Document Resolver REST Service
//!
//! Exposes the resolution engine as a REST API for bridge layers that
//! speak HTTP instead of the in-process request envelope.
//!
//! ## Endpoints
//!
//! - `POST /api/children/flat` - Direct file children of a directory
//! - `POST /api/children/recursive` - All file descendants of a directory
//! - `POST /api/parent` - Containing directory of an identifier
//! - `GET /api/grants` - List persisted grant roots
//! - `POST /api/grants` - Persist a grant rooted at a tree identifier
//! - `POST /api/grants/covering` - Most specific grant covering an identifier
//! - `GET /health` - Detailed service health check
//! - `GET /health/live` - Liveness probe

pub mod routes;
pub mod state;

pub use routes::{create_router, AppState};
pub use state::ServiceState;
