//! Shared service state.

use std::sync::Arc;

use crate::provider::DocumentProvider;
use crate::resolver::DocumentResolver;

/// Shared state for the resolver service.
///
/// Holds the provider backend and the resolution engine over it. The
/// engine itself is stateless between calls, so the state is cheap to
/// clone and safe to share across request handlers.
pub struct ServiceState<P: DocumentProvider + Send + Sync + 'static> {
    /// The provider backend.
    pub provider: Arc<P>,
    /// Resolution engine over the provider.
    pub resolver: DocumentResolver<P>,
}

impl<P: DocumentProvider + Send + Sync + 'static> ServiceState<P> {
    /// Create service state over a provider backend.
    pub fn new(provider: P) -> Self {
        let provider = Arc::new(provider);
        Self {
            resolver: DocumentResolver::new(Arc::clone(&provider)),
            provider,
        }
    }
}

impl<P: DocumentProvider + Send + Sync + 'static> Clone for ServiceState<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            resolver: self.resolver.clone(),
        }
    }
}
