use std::sync::Arc;

use super::traits::{SessionVerifier, TokenStore};

/// Shared state for the token store route handlers.
pub(super) struct TokenState<V, S> {
    pub(super) verifier: Arc<V>,
    pub(super) store: Arc<S>,
}

// Manual Clone: avoid derive adding `V: Clone, S: Clone` bounds.
impl<V, S> Clone for TokenState<V, S> {
    fn clone(&self) -> Self {
        Self {
            verifier: self.verifier.clone(),
            store: self.store.clone(),
        }
    }
}

// Handlers are generic over the injected implementations.
impl<V: SessionVerifier, S: TokenStore> TokenState<V, S> {
    pub(super) fn new(verifier: V, store: S) -> Self {
        Self {
            verifier: Arc::new(verifier),
            store: Arc::new(store),
        }
    }
}
