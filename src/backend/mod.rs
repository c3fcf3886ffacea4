//! Backend abstraction for database access.
//!
//! The drawer never talks to a database itself. Everything it shows about
//! connections, their structure and their call history comes through the
//! [`Backend`] trait, whose methods are remote calls and therefore async.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod helpers;
pub mod memory;
pub mod runner;
pub mod source;

pub use memory::MemoryBackend;
pub use runner::TaskRunner;
pub use source::FileSource;

/// Common error types for backend operations.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Backend error: {0}")]
    Other(String),
}

/// A registered connection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParams {
    pub id: String,
    pub name: String,
    /// Driver type, e.g. `"postgres"` or `"sqlite"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

/// Arguments for registering a new connection.
#[derive(Clone, Debug)]
pub struct CreateConnectionArgs {
    pub name: String,
    pub kind: String,
    pub url: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureKind {
    Schema,
    Table,
    View,
}

/// One entry of a connection's structure. Schemas carry their tables and
/// views as children.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureEntry {
    pub name: String,
    pub kind: StructureKind,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub children: Vec<StructureEntry>,
}

impl StructureEntry {
    pub fn schema(name: impl Into<String>, children: Vec<StructureEntry>) -> Self {
        let name = name.into();
        let children = children
            .into_iter()
            .map(|mut child| {
                child.schema = Some(name.clone());
                child
            })
            .collect();
        Self {
            name,
            kind: StructureKind::Schema,
            schema: None,
            children,
        }
    }

    pub fn table(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: StructureKind::Table,
            schema: None,
            children: Vec::new(),
        }
    }

    pub fn view(name: impl Into<String>) -> Self {
        Self {
            kind: StructureKind::View,
            ..Self::table(name)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallState {
    Succeeded,
    Failed,
}

/// A past query execution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRecord {
    pub id: String,
    pub connection_id: String,
    pub query: String,
    pub state: CallState,
    pub executed_at: DateTime<Utc>,
}

/// Backend trait that every database backend must implement.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Returns the backend type identifier (e.g., "memory").
    fn backend_type(&self) -> &str;

    /// Driver types new connections can be created with.
    fn connection_kinds(&self) -> Vec<String>;

    // Connections
    async fn list_connections(&self) -> Result<Vec<ConnectionParams>, BackendError>;
    async fn add_connection(&self, args: CreateConnectionArgs) -> Result<ConnectionParams, BackendError>;
    async fn remove_connection(&self, id: &str) -> Result<(), BackendError>;
    async fn set_active_connection(&self, id: &str) -> Result<(), BackendError>;
    async fn active_connection(&self) -> Result<Option<String>, BackendError>;

    // Structure and history
    async fn structure(&self, connection_id: &str) -> Result<Vec<StructureEntry>, BackendError>;
    async fn history(&self, connection_id: &str) -> Result<Vec<CallRecord>, BackendError>;

    /// Run `query` on a connection and record it in the history.
    async fn execute(&self, connection_id: &str, query: &str) -> Result<CallRecord, BackendError>;
}
