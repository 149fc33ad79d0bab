//! Session identity owned by one client instance.

use arc_swap::ArcSwap;
use std::sync::Arc;

use crate::identity::generator::{new_correlation_id, new_session_id};

/// Session and correlation identity for one client instantiation.
///
/// The session id is fixed at construction. The correlation id can be
/// swapped at any time; readers always see a complete value.
#[derive(Debug)]
pub struct IdentityContext {
    session_id: String,
    correlation_id: ArcSwap<String>,
}

/// Point-in-time copy of the identity, taken when a record is emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySnapshot {
    pub session_id: String,
    pub correlation_id: String,
}

impl IdentityContext {
    /// Create a context with freshly generated identifiers.
    pub fn new() -> Self {
        Self::with_ids(new_session_id(), new_correlation_id())
    }

    /// Create a context from known identifiers.
    pub fn with_ids(session_id: impl Into<String>, correlation_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            correlation_id: ArcSwap::from_pointee(correlation_id.into()),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn correlation_id(&self) -> Arc<String> {
        self.correlation_id.load_full()
    }

    /// Re-scope subsequent records to a new logical interaction.
    pub fn set_correlation_id(&self, correlation_id: impl Into<String>) {
        self.correlation_id.store(Arc::new(correlation_id.into()));
    }

    /// Install a freshly generated correlation id and return it.
    pub fn rotate_correlation_id(&self) -> Arc<String> {
        let next = Arc::new(new_correlation_id());
        self.correlation_id.store(next.clone());
        next
    }

    pub fn snapshot(&self) -> IdentitySnapshot {
        IdentitySnapshot {
            session_id: self.session_id.clone(),
            correlation_id: self.correlation_id.load().as_ref().clone(),
        }
    }
}

impl Default for IdentityContext {
    fn default() -> Self {
        Self::new()
    }
}
