//! In-memory authoritative expectation store (spec §4.3 "Store").
//!
//! A coarse-grained reader/writer lock covers the id→expectation map and
//! its index together, so `find` never observes a partial index (spec
//! §5 "Ordering guarantees"). Persistence is driven inside each mutation
//! but the snapshot is taken and released before the write, so the disk
//! write is serialised by its own lock rather than held across the state
//! lock (spec §5 "Persistence writes must not be held across an entire
//! handler lifecycle").

mod validation;

use std::sync::atomic::{AtomicBool, Ordering};

use indexmap::IndexMap;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::index::ExpectationIndex;
use crate::matchers;
use crate::model::wire::{ExpectationWire, ValidationError};
use crate::model::{Expectation, PathPattern, RequestRecord};
use crate::persistence::{self, PersistenceError};

pub use validation::admit;

struct State {
    expectations: IndexMap<String, Expectation>,
    index: ExpectationIndex,
}

/// A `clear`/`reset` filter (spec §4.3 "clear(filter?)").
#[derive(Debug, Clone)]
pub enum ClearFilter {
    Id(String),
    RequestDefinition {
        method: Option<String>,
        path: Option<String>,
    },
}

pub struct Store {
    state: RwLock<State>,
    persist_lock: Mutex<()>,
    is_saving: AtomicBool,
    config: ServerConfig,
}

impl Store {
    /// Load from persistence and the initialization file, rebuild the
    /// index, dedup ids (spec §4.3 "initialize()").
    pub async fn initialize(config: ServerConfig) -> Result<Self, PersistenceError> {
        if config.persist_expectations {
            if let Some(parent) = config.persisted_expectations_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(PersistenceError::Io)?;
                }
            }
        }

        let mut expectations = Vec::new();

        if config.persist_expectations {
            match persistence::file_store::load(&config.persisted_expectations_path) {
                Ok(loaded) => expectations.extend(loaded),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to load persisted expectations, starting empty");
                }
            }
        }

        if let Some(path) = &config.initialization_json_path {
            match persistence::init_file::load_and_validate(path) {
                Ok((loaded, skipped)) => {
                    if skipped > 0 {
                        tracing::warn!(skipped, "skipped invalid expectations in initialization file");
                    }
                    expectations.extend(loaded);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read initialization file");
                }
            }
        }

        let expectations = dedup_ids(expectations);

        let mut state = State {
            expectations: IndexMap::new(),
            index: ExpectationIndex::new(),
        };
        for e in expectations {
            state.index.insert(&e);
            state.expectations.insert(e.id.clone(), e);
        }

        Ok(Self {
            state: RwLock::new(state),
            persist_lock: Mutex::new(()),
            is_saving: AtomicBool::new(false),
            config,
        })
    }

    /// Whether a persistence save is currently in flight; the
    /// initialization-file watcher gates reloads on this (spec §4.4,
    /// §5 "Cross-file locking").
    pub fn is_saving(&self) -> bool {
        self.is_saving.load(Ordering::SeqCst)
    }

    pub async fn add(&self, wire: ExpectationWire) -> Result<Expectation, ValidationError> {
        let mut expectation = admit(wire)?;
        {
            let mut guard = self.state.write().await;
            if expectation.id.is_empty() || guard.expectations.contains_key(&expectation.id) {
                if !expectation.id.is_empty() {
                    tracing::warn!(id = %expectation.id, "id collision on add, assigning a fresh id");
                }
                expectation.id = Uuid::new_v4().to_string();
            }
            guard.index.insert(&expectation);
            guard.expectations.insert(expectation.id.clone(), expectation.clone());
        }
        self.persist().await;
        Ok(expectation)
    }

    /// Insert-or-replace keyed by id, preserving id (spec §4.3
    /// "upsert(e)").
    pub async fn upsert(&self, wire: ExpectationWire) -> Result<Expectation, ValidationError> {
        let mut expectation = admit(wire)?;
        {
            let mut guard = self.state.write().await;
            if expectation.id.is_empty() {
                expectation.id = Uuid::new_v4().to_string();
            } else if guard.expectations.contains_key(&expectation.id) {
                guard.index.remove(&expectation.id);
            }
            guard.index.insert(&expectation);
            guard.expectations.insert(expectation.id.clone(), expectation.clone());
        }
        self.persist().await;
        Ok(expectation)
    }

    pub async fn get(&self, id: &str) -> Option<Expectation> {
        self.state.read().await.expectations.get(id).cloned()
    }

    pub async fn list(&self) -> Vec<Expectation> {
        self.state.read().await.expectations.values().cloned().collect()
    }

    pub async fn delete(&self, id: &str) -> bool {
        let removed = {
            let mut guard = self.state.write().await;
            let removed = guard.expectations.shift_remove(id).is_some();
            if removed {
                guard.index.remove(id);
            }
            removed
        };
        if removed {
            self.persist().await;
        }
        removed
    }

    pub async fn clear(&self, filter: Option<ClearFilter>) {
        {
            let mut guard = self.state.write().await;
            match filter {
                Some(ClearFilter::Id(id)) => {
                    if guard.expectations.shift_remove(&id).is_some() {
                        guard.index.remove(&id);
                    }
                }
                Some(ClearFilter::RequestDefinition { method, path }) => {
                    let doomed: Vec<String> = guard
                        .expectations
                        .values()
                        .filter(|e| request_definition_matches(e, method.as_deref(), path.as_deref()))
                        .map(|e| e.id.clone())
                        .collect();
                    for id in doomed {
                        guard.expectations.shift_remove(&id);
                        guard.index.remove(&id);
                    }
                }
                None => {
                    guard.expectations.clear();
                    guard.index.clear();
                }
            }
        }
        self.persist().await;
    }

    /// Atomically replace the entire store (spec §4.4 watcher reload:
    /// "parse → validate all → atomically clear and re-insert"). The
    /// caller validates the whole batch before calling this, so a
    /// partially-invalid reload never reaches here — nothing needs
    /// rolling back because nothing was mutated.
    pub async fn replace_all(&self, expectations: Vec<Expectation>) {
        {
            let mut guard = self.state.write().await;
            guard.expectations.clear();
            guard.index.clear();
            for e in expectations {
                guard.index.insert(&e);
                guard.expectations.insert(e.id.clone(), e);
            }
        }
        self.persist().await;
    }

    /// Index → candidates → matcher → priority/id-tiebreak selection
    /// (spec §4.3 "find(request)", §4.5 "Executor and selection").
    pub async fn find(&self, request: &RequestRecord) -> Option<Expectation> {
        let guard = self.state.read().await;
        let candidate_ids = guard.index.candidates(request);
        let matched: Vec<&Expectation> = candidate_ids
            .iter()
            .filter_map(|id| guard.expectations.get(id))
            .filter(|e| matchers::matches(&e.request_matcher, request))
            .collect();

        if matched.is_empty() {
            return None;
        }

        let responses: Vec<&Expectation> = matched.iter().copied().filter(|e| !e.is_forward()).collect();
        let pool = if responses.is_empty() { matched } else { responses };

        pool.into_iter()
            .max_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.id.cmp(&b.id)))
            .cloned()
    }

    async fn persist(&self) {
        if !self.config.persist_expectations {
            return;
        }
        let _permit = self.persist_lock.lock().await;
        self.is_saving.store(true, Ordering::SeqCst);

        let snapshot: Vec<Expectation> = {
            let guard = self.state.read().await;
            guard.expectations.values().cloned().collect()
        };

        if let Err(e) = persistence::file_store::save(&self.config.persisted_expectations_path, &snapshot) {
            tracing::error!(error = %e, "failed to persist expectation store, in-memory state unaffected");
        }

        self.is_saving.store(false, Ordering::SeqCst);
    }
}

fn request_definition_matches(e: &Expectation, method: Option<&str>, path: Option<&str>) -> bool {
    let method_matches = match method {
        Some(m) => e
            .request_matcher
            .method
            .as_ref()
            .map(|flag| flag.value.eq_ignore_ascii_case(m))
            .unwrap_or(false),
        None => true,
    };
    let path_matches = match path {
        Some(p) => e
            .request_matcher
            .path
            .as_ref()
            .map(|flag| matches!(&flag.value, PathPattern::Literal(lit) if lit == p))
            .unwrap_or(false),
        None => true,
    };
    method_matches && path_matches
}

/// Assign a fresh id to all but the first occurrence of a duplicate id
/// (spec §3 invariant "IDs are unique").
fn dedup_ids(expectations: Vec<Expectation>) -> Vec<Expectation> {
    let mut seen = std::collections::HashSet::new();
    expectations
        .into_iter()
        .map(|mut e| {
            if e.id.is_empty() || !seen.insert(e.id.clone()) {
                let fresh = Uuid::new_v4().to_string();
                tracing::warn!(old_id = %e.id, new_id = %fresh, "duplicate id on load, assigning a fresh id");
                e.id = fresh.clone();
                seen.insert(fresh);
            }
            e
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, Method};
    use bytes::Bytes;

    fn config() -> ServerConfig {
        ServerConfig {
            persist_expectations: false,
            ..ServerConfig::default()
        }
    }

    fn record(method: &str, path: &str) -> RequestRecord {
        crate::model::request::build_record(
            Method::from_bytes(method.as_bytes()).unwrap(),
            path.to_string(),
            None,
            HeaderMap::new(),
            Bytes::new(),
        )
    }

    fn put_body(path: &str, priority: i32, id: &str) -> ExpectationWire {
        let raw = format!(
            r#"{{"id":"{id}","priority":{priority},"httpRequest":{{"path":"{path}"}},"httpResponse":{{"statusCode":200}}}}"#
        );
        serde_json::from_str(&raw).unwrap()
    }

    #[tokio::test]
    async fn priority_tie_break_prefers_greater_id() {
        let store = Store::initialize(config()).await.unwrap();
        store.add(put_body("/x", 5, "aaa")).await.unwrap();
        store.add(put_body("/x", 5, "zzz")).await.unwrap();

        let found = store.find(&record("GET", "/x")).await.unwrap();
        assert_eq!(found.id, "zzz");
    }

    #[tokio::test]
    async fn priority_winner_beats_lexicographically_greater_id() {
        let store = Store::initialize(config()).await.unwrap();
        store.add(put_body("/x", 1, "zzz")).await.unwrap();
        store.add(put_body("/x", 10, "aaa")).await.unwrap();

        let found = store.find(&record("GET", "/x")).await.unwrap();
        assert_eq!(found.id, "aaa");
    }

    #[tokio::test]
    async fn clear_all_empties_store_and_index() {
        let store = Store::initialize(config()).await.unwrap();
        store.add(put_body("/x", 0, "a")).await.unwrap();
        store.clear(None).await;
        assert!(store.list().await.is_empty());
        assert!(store.find(&record("GET", "/x")).await.is_none());
    }

    #[tokio::test]
    async fn upsert_is_idempotent() {
        let store = Store::initialize(config()).await.unwrap();
        store.upsert(put_body("/x", 0, "a")).await.unwrap();
        store.upsert(put_body("/x", 0, "a")).await.unwrap();
        assert_eq!(store.list().await.len(), 1);
    }
}
