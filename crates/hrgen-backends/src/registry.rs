//! Backend registry.
//!
//! Holds one adapter per [`BackendKind`] and resolves a request's selector
//! to its adapter. The closed enum keeps dispatch exhaustive; adding a
//! backend means adding a variant and the compiler finds every site.

use hrgen_core::{BackendKind, TextBackend};
use std::sync::Arc;

/// Registry of the configured backend adapters.
#[derive(Clone)]
pub struct BackendRegistry {
    local: Arc<dyn TextBackend>,
    cloud: Arc<dyn TextBackend>,
}

impl BackendRegistry {
    /// Create a registry from one adapter per kind.
    #[must_use]
    pub fn new(local: Arc<dyn TextBackend>, cloud: Arc<dyn TextBackend>) -> Self {
        Self { local, cloud }
    }

    /// Resolve a selector to its adapter.
    #[must_use]
    pub fn resolve(&self, kind: BackendKind) -> Arc<dyn TextBackend> {
        match kind {
            BackendKind::Local => Arc::clone(&self.local),
            BackendKind::Cloud => Arc::clone(&self.cloud),
        }
    }

    /// All registered adapters, for health reporting.
    #[must_use]
    pub fn all(&self) -> Vec<Arc<dyn TextBackend>> {
        vec![Arc::clone(&self.local), Arc::clone(&self.cloud)]
    }
}
