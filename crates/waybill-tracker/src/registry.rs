//! Client request registry: one active cancellation scope per client.
//!
//! A new tracking request from a client supersedes that client's in-flight
//! request: the previous scope is cancelled and removed atomically before
//! the fresh one is installed. A cancelled handle is never reused.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use waybill_core::ClientId;

/// The cancellation scope of one client's active request.
#[derive(Debug, Clone)]
pub struct ActiveScope {
    client_id: ClientId,
    scope_id: u64,
    token: CancellationToken,
}

impl ActiveScope {
    /// The client this scope belongs to.
    #[must_use]
    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// The scope's cancellation handle; pass it (or a child of it) down as
    /// the request-level parent signal.
    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Whether this scope has been cancelled (superseded, shut down, or
    /// cancelled through the handle itself).
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Maps each client to its currently active cancellation scope.
///
/// This is the only cross-request shared mutable state in the system; every
/// mutation for a given client happens under one lock acquisition so a
/// register/cancel race cannot leak a handle or double-install.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    active: Mutex<HashMap<ClientId, (u64, CancellationToken)>>,
    next_scope_id: AtomicU64,
}

impl ClientRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new request scope for a client.
    ///
    /// Any existing scope for the same client is cancelled and removed
    /// before the fresh scope is installed.
    pub async fn register(&self, client_id: &ClientId) -> ActiveScope {
        let scope_id = self.next_scope_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();

        let mut active = self.active.lock().await;
        if let Some((old_id, old_token)) = active.insert(client_id.clone(), (scope_id, token.clone()))
        {
            tracing::debug!(
                client_id = %client_id,
                superseded_scope = old_id,
                "superseding active request scope"
            );
            old_token.cancel();
        }

        ActiveScope {
            client_id: client_id.clone(),
            scope_id,
            token,
        }
    }

    /// Remove a scope that completed normally.
    ///
    /// Only removes the entry if it still holds this same scope; if the
    /// client has re-registered in the meantime, the newer scope stays.
    /// The released scope's handle is fired either way: the request is
    /// finished, and firing it lets anything still parked on the handle
    /// (session watchers, straggling lookups) unwind instead of waiting on
    /// a token that will never cancel.
    pub async fn release(&self, scope: &ActiveScope) {
        let mut active = self.active.lock().await;
        if let Some((current_id, _)) = active.get(&scope.client_id) {
            if *current_id == scope.scope_id {
                active.remove(&scope.client_id);
            }
        }
        drop(active);
        scope.token.cancel();
    }

    /// Cancel and clear every outstanding scope.
    ///
    /// Called explicitly at process shutdown; cleanup is deterministic, not
    /// left to drop order.
    pub async fn shutdown(&self) {
        let mut active = self.active.lock().await;
        let count = active.len();
        for (client_id, (_, token)) in active.drain() {
            tracing::debug!(client_id = %client_id, "cancelling scope at shutdown");
            token.cancel();
        }
        if count > 0 {
            tracing::debug!(count, "registry shut down");
        }
    }

    /// Number of clients with an active scope.
    pub async fn active_clients(&self) -> usize {
        self.active.lock().await.len()
    }
}
