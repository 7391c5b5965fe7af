//! Handler registry: a process-wide cache of handler instances.
//!
//! Handlers are stateless with respect to conversation identity, so one
//! instance per stage serves every chat concurrently. The cache identity is
//! a configuration fingerprint: a registry built from one configuration is
//! never reused under another, which is what forces reconstruction after a
//! credential or endpoint change (always a process restart here).
//!
//! The registry is constructed once at startup and injected; there is no
//! module-level singleton.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use secrecy::{ExposeSecret, Secret};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::Stage;

use super::handler::{build_handler, HandlerDeps, StageHandler};

/// Process-wide cache of stage handlers.
pub struct HandlerRegistry {
    fingerprint: String,
    deps: HandlerDeps,
    // One lock over the whole map: construction is cheap and rare, so
    // per-key locking buys nothing. Losers of a construction race block
    // here and receive the winner's instance.
    handlers: Mutex<HashMap<Stage, Arc<StageHandler>>>,
    constructions: AtomicUsize,
}

impl HandlerRegistry {
    pub fn new(fingerprint: impl Into<String>, deps: HandlerDeps) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            deps,
            handlers: Mutex::new(HashMap::new()),
            constructions: AtomicUsize::new(0),
        }
    }

    /// Fetch the handler for a stage, constructing it on first use.
    pub async fn get_or_create(&self, stage: Stage) -> Arc<StageHandler> {
        let mut handlers = self.handlers.lock().await;
        if let Some(handler) = handlers.get(&stage) {
            return handler.clone();
        }

        debug!(stage = %stage, fingerprint = %self.fingerprint, "constructing stage handler");
        let handler = Arc::new(build_handler(stage, &self.deps));
        self.constructions.fetch_add(1, Ordering::Relaxed);
        handlers.insert(stage, handler.clone());
        handler
    }

    /// Configuration fingerprint this registry was built for.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// How many handlers have actually been constructed (observable for
    /// cache-correctness tests).
    pub fn construction_count(&self) -> usize {
        self.constructions.load(Ordering::Relaxed)
    }
}

/// Fingerprint of the runtime configuration the handlers depend on:
/// endpoint, model, and credential identity. Hashed so the credential never
/// appears in logs or diagnostics.
pub fn config_fingerprint(endpoint: &str, model: &str, api_key: &Secret<String>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(endpoint.as_bytes());
    hasher.update([0]);
    hasher.update(model.as_bytes());
    hasher.update([0]);
    hasher.update(api_key.expose_secret().as_bytes());
    format!("{:x}", hasher.finalize())
}
