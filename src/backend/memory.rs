//! In-process backend used by the demo host and the tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{
    Backend, BackendError, CallRecord, CallState, ConnectionParams, CreateConnectionArgs, StructureEntry,
};

const CONNECTION_KINDS: [&str; 3] = ["postgres", "mysql", "sqlite"];

#[derive(Debug, Default)]
struct MemoryState {
    connections: Vec<ConnectionParams>,
    structures: HashMap<String, Vec<StructureEntry>>,
    history: HashMap<String, Vec<CallRecord>>,
    active: Option<String>,
    broken: HashSet<String>,
}

/// Backend keeping everything in memory, with optional simulated latency.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
    latency: Duration,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every async call by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    #[must_use]
    pub fn with_connection(self, params: ConnectionParams, structure: Vec<StructureEntry>) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.structures.insert(params.id.clone(), structure);
            state.connections.push(params);
        }
        self
    }

    /// Backend seeded with `connections`, each given a small sample structure.
    pub fn from_connections(connections: Vec<ConnectionParams>) -> Self {
        connections
            .into_iter()
            .fold(Self::new(), |backend, params| backend.with_connection(params, sample_structure()))
    }

    /// Make structure fetches for `connection_id` fail.
    pub fn break_connection(&self, connection_id: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.broken.insert(connection_id.to_string());
        }
    }

    /// Undo [`MemoryBackend::break_connection`].
    pub fn repair_connection(&self, connection_id: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.broken.remove(connection_id);
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, BackendError> {
        self.state
            .lock()
            .map_err(|e| BackendError::Other(format!("Backend state poisoned: {}", e)))
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

fn sample_structure() -> Vec<StructureEntry> {
    vec![StructureEntry::schema(
        "public",
        vec![
            StructureEntry::table("users"),
            StructureEntry::table("orders"),
            StructureEntry::view("active_users"),
        ],
    )]
}

fn ensure_known(state: &MemoryState, connection_id: &str) -> Result<(), BackendError> {
    if state.connections.iter().any(|c| c.id == connection_id) {
        Ok(())
    } else {
        Err(BackendError::NotFound(format!("connection {}", connection_id)))
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn backend_type(&self) -> &str {
        "memory"
    }

    fn connection_kinds(&self) -> Vec<String> {
        CONNECTION_KINDS.iter().map(|kind| (*kind).to_string()).collect()
    }

    async fn list_connections(&self) -> Result<Vec<ConnectionParams>, BackendError> {
        self.simulate_latency().await;
        Ok(self.lock()?.connections.clone())
    }

    async fn add_connection(&self, args: CreateConnectionArgs) -> Result<ConnectionParams, BackendError> {
        self.simulate_latency().await;
        if args.name.trim().is_empty() {
            return Err(BackendError::InvalidData("connection name is empty".to_string()));
        }
        let params = ConnectionParams {
            id: Uuid::new_v4().to_string(),
            name: args.name,
            kind: args.kind,
            url: args.url,
        };
        let mut state = self.lock()?;
        state.structures.insert(params.id.clone(), sample_structure());
        state.connections.push(params.clone());
        Ok(params)
    }

    async fn remove_connection(&self, id: &str) -> Result<(), BackendError> {
        self.simulate_latency().await;
        let mut state = self.lock()?;
        ensure_known(&state, id)?;
        state.connections.retain(|c| c.id != id);
        state.structures.remove(id);
        state.history.remove(id);
        if state.active.as_deref() == Some(id) {
            state.active = None;
        }
        Ok(())
    }

    async fn set_active_connection(&self, id: &str) -> Result<(), BackendError> {
        self.simulate_latency().await;
        let mut state = self.lock()?;
        ensure_known(&state, id)?;
        state.active = Some(id.to_string());
        Ok(())
    }

    async fn active_connection(&self) -> Result<Option<String>, BackendError> {
        self.simulate_latency().await;
        Ok(self.lock()?.active.clone())
    }

    async fn structure(&self, connection_id: &str) -> Result<Vec<StructureEntry>, BackendError> {
        self.simulate_latency().await;
        let state = self.lock()?;
        ensure_known(&state, connection_id)?;
        if state.broken.contains(connection_id) {
            return Err(BackendError::Connection(format!("cannot reach {}", connection_id)));
        }
        Ok(state.structures.get(connection_id).cloned().unwrap_or_default())
    }

    async fn history(&self, connection_id: &str) -> Result<Vec<CallRecord>, BackendError> {
        self.simulate_latency().await;
        let state = self.lock()?;
        ensure_known(&state, connection_id)?;
        Ok(state.history.get(connection_id).cloned().unwrap_or_default())
    }

    async fn execute(&self, connection_id: &str, query: &str) -> Result<CallRecord, BackendError> {
        self.simulate_latency().await;
        let mut state = self.lock()?;
        ensure_known(&state, connection_id)?;
        let state_after = if state.broken.contains(connection_id) {
            CallState::Failed
        } else {
            CallState::Succeeded
        };
        let record = CallRecord {
            id: Uuid::new_v4().to_string(),
            connection_id: connection_id.to_string(),
            query: query.to_string(),
            state: state_after,
            executed_at: Utc::now(),
        };
        // Newest first
        state
            .history
            .entry(connection_id.to_string())
            .or_default()
            .insert(0, record.clone());
        Ok(record)
    }
}
