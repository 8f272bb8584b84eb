//! Application state: challenge registry, key-value store and usage history.
//!
//! This module owns:
//!   - the detection registry (config challenges first, then built-in seeds)
//!   - the durable key-value store (JSON file when configured, memory otherwise)
//!   - the bounded usage history built on that store
//!
//! Everything here is read-mostly; the engines themselves hold no state.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::config::{load_config_from_env, SandboxConfig};
use crate::detect::Registry;
use crate::domain::ChallengeSource;
use crate::history::UsageHistory;
use crate::seeds::seed_challenges;
use crate::store::{JsonFileStore, KeyValueStore, MemoryStore};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub store: Arc<dyn KeyValueStore>,
    pub history: Arc<UsageHistory>,
}

impl AppState {
    /// Build state from env: load config, then assemble from it.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_config_from_env().unwrap_or_default();
        Self::from_config(cfg)
    }

    /// Assemble state from an already-parsed config.
    #[instrument(level = "info", skip_all)]
    pub fn from_config(cfg: SandboxConfig) -> Self {
        let store: Arc<dyn KeyValueStore> = match &cfg.storage.path {
            Some(path) => match JsonFileStore::open(path) {
                Ok(s) => {
                    info!(target: "sandbox_backend", %path, "Using JSON file store");
                    Arc::new(s)
                }
                Err(e) => {
                    error!(target: "sandbox_backend", %path, error = %e, "Failed to open JSON store; falling back to memory");
                    Arc::new(MemoryStore::new())
                }
            },
            None => {
                info!(target: "sandbox_backend", "No storage path configured; using in-memory store");
                Arc::new(MemoryStore::new())
            }
        };

        let registry = build_registry(&cfg);
        let history = UsageHistory::new(store.clone(), cfg.history.capacity);

        Self {
            registry: Arc::new(registry),
            store,
            history: Arc::new(history),
        }
    }

    /// State over a caller-supplied store and the built-in challenges only.
    pub fn with_store(store: Arc<dyn KeyValueStore>) -> Self {
        let history = UsageHistory::new(store.clone(), crate::history::DEFAULT_CAPACITY);
        Self {
            registry: Arc::new(Registry::with_builtin()),
            store,
            history: Arc::new(history),
        }
    }
}

/// Config challenges win over built-ins with the same id.
fn build_registry(cfg: &SandboxConfig) -> Registry {
    let mut registry = Registry::new();

    for cc in &cfg.challenges {
        let ch = cc.clone().into_challenge();
        if ch.rules.is_empty() {
            warn!(target: "detection", id = %ch.id, "Config challenge has no bug rules; it will never report bugs");
        }
        if !ch.has_unique_bug_ids() {
            error!(target: "detection", id = %ch.id, "Skipping config challenge: duplicate bug ids.");
            continue;
        }
        registry.insert(ch);
    }

    for c in seed_challenges() {
        let id = c.id.clone();
        if !registry.insert_if_absent(c) {
            info!(target: "detection", %id, "Built-in challenge overridden by config");
        }
    }

    for ch in registry.iter() {
        let source = match ch.source {
            ChallengeSource::Config => "config",
            ChallengeSource::Builtin => "builtin",
        };
        info!(target: "detection", id = %ch.id, bugs = ch.rules.len(), %source, "Startup challenge inventory");
    }
    registry
}
