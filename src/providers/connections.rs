//! Connections section: one lazy node per backend connection.
//!
//! Everything shown here is cached from the backend. Layout and lazy getters
//! only read the cache; when something is missing they start a background
//! fetch, show a `loading...` leaf, and the fetch's completion refreshes the
//! drawer. [`LayoutProvider::invalidate`] marks loaded entries stale: they keep
//! showing until the refetch they trigger lands. Failed entries are dropped
//! so the next read retries them.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::backend::helpers::helper_query;
use crate::backend::{
    Backend, CallRecord, CallState, ConnectionParams, CreateConnectionArgs, StructureEntry, StructureKind, TaskRunner,
};
use crate::constants::{HELPER_QUERIES, HISTORY_NODE_NAME, LOADING_NODE_NAME, NEW_CONNECTION_NODE_NAME};
use crate::drawer::Continuation;
use crate::tree::{ActionSlot, LayoutNode, LayoutProvider, NodeAction, NodeType};

pub const ADD_CONNECTION_ID: &str = "__connections_add";
const REMOVE_CONFIRM: [&str; 2] = ["no", "yes"];

/// Cached result of a background fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Load<T> {
    #[default]
    NotRequested,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> Load<T> {
    fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    Connections,
    Structure(String),
    History(String),
}

#[derive(Debug, Default)]
struct ConnectionsState {
    connections: Load<Vec<ConnectionParams>>,
    structures: HashMap<String, Load<Vec<StructureEntry>>>,
    history: HashMap<String, Load<Vec<CallRecord>>>,
    active: Option<String>,
    /// Loaded entries to refetch the next time they are read.
    stale: HashSet<CacheKey>,
}

/// Layout provider for backend connections.
#[derive(Clone)]
pub struct ConnectionsProvider {
    backend: Arc<dyn Backend>,
    runner: TaskRunner,
    state: Arc<Mutex<ConnectionsState>>,
}

impl ConnectionsProvider {
    pub fn new(backend: Arc<dyn Backend>, runner: TaskRunner) -> Self {
        Self {
            backend,
            runner,
            state: Arc::new(Mutex::new(ConnectionsState::default())),
        }
    }

    /// Id of the connection last activated through the drawer.
    pub fn active_connection(&self) -> Option<String> {
        self.state().active.clone()
    }

    /// Start fetching the connection list and the active connection. Loaded
    /// connections stay visible until the new list arrives.
    pub fn reload(&self) {
        {
            let mut state = self.state();
            if !state.connections.is_loaded() {
                state.connections = Load::Loading;
            }
        }
        let backend = self.backend.clone();
        let state = self.state.clone();
        self.runner.fetch("Loading connections", ADD_CONNECTION_ID, async move {
            let fetched = async {
                let connections = backend.list_connections().await?;
                let active = backend.active_connection().await?;
                Ok::<_, crate::backend::BackendError>((connections, active))
            }
            .await;
            let mut state = lock(&state);
            match fetched {
                Ok((connections, active)) => {
                    log::info!("loaded {} connections", connections.len());
                    state.connections = Load::Loaded(connections);
                    state.active = active;
                    Ok(())
                }
                Err(err) => {
                    state.connections = Load::Failed(err.to_string());
                    Err(err.into())
                }
            }
        });
    }

    fn state(&self) -> MutexGuard<'_, ConnectionsState> {
        lock(&self.state)
    }

    fn connection_node(&self, params: &ConnectionParams) -> LayoutNode {
        let this = self.clone();
        let connection_id = params.id.clone();

        LayoutNode::new(params.id.clone(), params.name.clone())
            .node_type(NodeType::Connection)
            .database(params.name.clone())
            .lazy_children(move || Ok(this.connection_children(&connection_id)))
            .pick("Remove connection?", REMOVE_CONFIRM)
            .action(ActionSlot::First, self.activate_action(&params.id))
            .action(ActionSlot::Third, self.remove_action(&params.id))
    }

    /// Cached value for `key`, consuming its stale mark.
    fn read<T: Clone>(&self, key: CacheKey, load: impl Fn(&ConnectionsState) -> Option<&Load<T>>) -> (Load<T>, bool) {
        let mut state = self.state();
        let value = load(&*state).cloned().unwrap_or(Load::NotRequested);
        let stale = state.stale.remove(&key);
        (value, stale)
    }

    fn connection_children(&self, connection_id: &str) -> Vec<LayoutNode> {
        let (structure, stale) = self.read(CacheKey::Structure(connection_id.to_string()), |state| {
            state.structures.get(connection_id)
        });
        if stale {
            self.load_structure(connection_id);
        }
        let mut children = match structure {
            Load::NotRequested => {
                self.load_structure(connection_id);
                vec![loading_leaf(connection_id)]
            }
            Load::Loading => vec![loading_leaf(connection_id)],
            Load::Failed(message) => vec![error_leaf(connection_id, &message)],
            Load::Loaded(entries) => entries
                .iter()
                .map(|entry| self.structure_node(connection_id, entry))
                .collect(),
        };
        children.push(self.history_node(connection_id));
        children
    }

    fn load_structure(&self, connection_id: &str) {
        self.state()
            .structures
            .entry(connection_id.to_string())
            .and_modify(|load| {
                if !load.is_loaded() {
                    *load = Load::Loading;
                }
            })
            .or_insert(Load::Loading);
        let backend = self.backend.clone();
        let state = self.state.clone();
        let id = connection_id.to_string();
        self.runner
            .fetch(format!("Loading structure of {}", id), id.clone(), async move {
                let fetched = backend.structure(&id).await;
                let mut state = lock(&state);
                match fetched {
                    Ok(entries) => {
                        state.structures.insert(id, Load::Loaded(entries));
                        Ok(())
                    }
                    Err(err) => {
                        state.structures.insert(id, Load::Failed(err.to_string()));
                        Err(err.into())
                    }
                }
            });
    }

    fn structure_node(&self, connection_id: &str, entry: &StructureEntry) -> LayoutNode {
        match entry.kind {
            StructureKind::Schema => {
                let children = entry
                    .children
                    .iter()
                    .map(|child| self.structure_node(connection_id, child))
                    .collect();
                LayoutNode::new(format!("{}/{}", connection_id, entry.name), entry.name.clone())
                    .node_type(NodeType::Schema)
                    .schema(entry.name.clone())
                    .children(children)
            }
            StructureKind::Table | StructureKind::View => {
                let schema = entry.schema.clone().unwrap_or_default();
                let node_type = if entry.kind == StructureKind::Table {
                    NodeType::Table
                } else {
                    NodeType::View
                };
                LayoutNode::new(
                    format!("{}/{}/{}", connection_id, schema, entry.name),
                    entry.name.clone(),
                )
                .node_type(node_type)
                .schema(schema)
                .database(connection_id)
                .pick(format!("Helpers for {}", entry.name), HELPER_QUERIES)
                .action(ActionSlot::First, self.helper_action(connection_id, entry))
            }
        }
    }

    fn history_node(&self, connection_id: &str) -> LayoutNode {
        let this = self.clone();
        let id = connection_id.to_string();
        LayoutNode::new(format!("{}/__history", connection_id), HISTORY_NODE_NAME)
            .node_type(NodeType::History)
            .lazy_children(move || Ok(this.history_children(&id)))
    }

    fn history_children(&self, connection_id: &str) -> Vec<LayoutNode> {
        let (history, stale) = self.read(CacheKey::History(connection_id.to_string()), |state| {
            state.history.get(connection_id)
        });
        if stale {
            self.load_history(connection_id);
        }
        match history {
            Load::NotRequested => {
                self.load_history(connection_id);
                vec![loading_leaf(&format!("{}/__history", connection_id))]
            }
            Load::Loading => vec![loading_leaf(&format!("{}/__history", connection_id))],
            Load::Failed(message) => vec![error_leaf(&format!("{}/__history", connection_id), &message)],
            Load::Loaded(calls) => calls.iter().map(|call| self.call_node(call)).collect(),
        }
    }

    fn load_history(&self, connection_id: &str) {
        self.state()
            .history
            .entry(connection_id.to_string())
            .and_modify(|load| {
                if !load.is_loaded() {
                    *load = Load::Loading;
                }
            })
            .or_insert(Load::Loading);
        let backend = self.backend.clone();
        let state = self.state.clone();
        let id = connection_id.to_string();
        self.runner
            .fetch(format!("Loading history of {}", id), id.clone(), async move {
                let fetched = backend.history(&id).await;
                let mut state = lock(&state);
                match fetched {
                    Ok(calls) => {
                        state.history.insert(id, Load::Loaded(calls));
                        Ok(())
                    }
                    Err(err) => {
                        state.history.insert(id, Load::Failed(err.to_string()));
                        Err(err.into())
                    }
                }
            });
    }

    fn call_node(&self, call: &CallRecord) -> LayoutNode {
        let name = match call.state {
            CallState::Succeeded => format!("{} {}", call.executed_at.format("%H:%M:%S"), call.query),
            CallState::Failed => format!("{} (failed) {}", call.executed_at.format("%H:%M:%S"), call.query),
        };
        LayoutNode::new(format!("{}/__call/{}", call.connection_id, call.id), name)
            .node_type(NodeType::Call)
            .database(call.connection_id.clone())
            .action(ActionSlot::First, self.execute_action(&call.connection_id, &call.query))
    }

    fn add_node(&self) -> LayoutNode {
        let this = self.clone();
        LayoutNode::new(ADD_CONNECTION_ID, NEW_CONNECTION_NODE_NAME)
            .node_type(NodeType::Add)
            .pick("Connection type", self.backend.connection_kinds())
            .action(
                ActionSlot::First,
                NodeAction::with_selection(move |done, kind| {
                    let Some(kind) = kind else {
                        return Ok(());
                    };
                    this.add_connection(kind, done);
                    Ok(())
                }),
            )
    }

    fn add_connection(&self, kind: String, done: Continuation) {
        let count = match &self.state().connections {
            Load::Loaded(connections) => connections.len(),
            _ => 0,
        };
        let args = CreateConnectionArgs {
            name: format!("{}-{}", kind, count + 1),
            url: format!("{}://localhost", kind),
            kind,
        };
        let backend = self.backend.clone();
        let state = self.state.clone();
        self.runner
            .spawn(format!("Adding connection {}", args.name), ADD_CONNECTION_ID, done, async move {
                let added = backend.add_connection(args).await?;
                log::info!("added connection {} ({})", added.name, added.id);
                let connections = backend.list_connections().await?;
                lock(&state).connections = Load::Loaded(connections);
                Ok(())
            });
    }

    fn activate_action(&self, connection_id: &str) -> NodeAction {
        let backend = self.backend.clone();
        let state = self.state.clone();
        let runner = self.runner.clone();
        let id = connection_id.to_string();
        NodeAction::new(move |done| {
            let backend = backend.clone();
            let state = state.clone();
            let id = id.clone();
            runner.spawn(format!("Activating {}", id), id.clone(), done, async move {
                backend.set_active_connection(&id).await?;
                log::info!("connection {} is now active", id);
                lock(&state).active = Some(id);
                Ok(())
            });
            Ok(())
        })
    }

    fn remove_action(&self, connection_id: &str) -> NodeAction {
        let backend = self.backend.clone();
        let state = self.state.clone();
        let runner = self.runner.clone();
        let id = connection_id.to_string();
        NodeAction::with_selection(move |done, choice| {
            if choice.as_deref() != Some("yes") {
                log::debug!("removal of {} not confirmed", id);
                return Ok(());
            }
            let backend = backend.clone();
            let state = state.clone();
            let id = id.clone();
            runner.spawn(format!("Removing {}", id), id.clone(), done, async move {
                backend.remove_connection(&id).await?;
                let connections = backend.list_connections().await?;
                let mut state = lock(&state);
                state.connections = Load::Loaded(connections);
                state.structures.remove(&id);
                state.history.remove(&id);
                if state.active.as_deref() == Some(id.as_str()) {
                    state.active = None;
                }
                Ok(())
            });
            Ok(())
        })
    }

    fn helper_action(&self, connection_id: &str, entry: &StructureEntry) -> NodeAction {
        let this = self.clone();
        let id = connection_id.to_string();
        let entry = entry.clone();
        NodeAction::with_selection(move |done, helper| {
            let helper = helper.unwrap_or_else(|| HELPER_QUERIES[0].to_string());
            let query = helper_query(&helper, entry.kind, entry.schema.as_deref(), &entry.name)
                .ok_or_else(|| anyhow::anyhow!("Unknown helper '{}'", helper))?;
            this.execute(&id, query, done);
            Ok(())
        })
    }

    fn execute_action(&self, connection_id: &str, query: &str) -> NodeAction {
        let this = self.clone();
        let id = connection_id.to_string();
        let query = query.to_string();
        NodeAction::new(move |done| {
            this.execute(&id, query.clone(), done);
            Ok(())
        })
    }

    /// Run `query` in the background and refresh the connection's history.
    fn execute(&self, connection_id: &str, query: String, done: Continuation) {
        let backend = self.backend.clone();
        let state = self.state.clone();
        let id = connection_id.to_string();
        self.runner
            .spawn(format!("Executing on {}: {}", id, query), id.clone(), done, async move {
                let call = backend.execute(&id, &query).await?;
                log::info!("executed {} on {}", call.query, id);
                let calls = backend.history(&id).await?;
                lock(&state).history.insert(id, Load::Loaded(calls));
                Ok(())
            });
    }
}

impl LayoutProvider for ConnectionsProvider {
    fn layout(&self) -> Vec<LayoutNode> {
        let (connections, stale) = self.read(CacheKey::Connections, |state| Some(&state.connections));
        if stale {
            self.reload();
        }
        let mut nodes = match connections {
            Load::NotRequested => {
                self.reload();
                vec![loading_leaf("__connections")]
            }
            Load::Loading => vec![loading_leaf("__connections")],
            Load::Failed(message) => vec![error_leaf("__connections", &message)],
            Load::Loaded(connections) => connections.iter().map(|params| self.connection_node(params)).collect(),
        };
        nodes.push(self.add_node());
        nodes
    }

    fn invalidate(&self) {
        let mut state = self.state();
        let state = &mut *state;
        if state.connections.is_failed() {
            state.connections = Load::NotRequested;
        } else if state.connections.is_loaded() {
            state.stale.insert(CacheKey::Connections);
        }
        state.structures.retain(|_, load| !load.is_failed());
        state.history.retain(|_, load| !load.is_failed());
        let structures = state
            .structures
            .iter()
            .filter(|(_, load)| load.is_loaded())
            .map(|(id, _)| CacheKey::Structure(id.clone()));
        let history = state
            .history
            .iter()
            .filter(|(_, load)| load.is_loaded())
            .map(|(id, _)| CacheKey::History(id.clone()));
        state.stale.extend(structures.chain(history));
        log::debug!("connections cache marked stale ({} entries)", state.stale.len());
    }
}

fn lock(state: &Mutex<ConnectionsState>) -> MutexGuard<'_, ConnectionsState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn loading_leaf(parent_id: &str) -> LayoutNode {
    LayoutNode::new(format!("{}__loading", parent_id), LOADING_NODE_NAME)
}

fn error_leaf(parent_id: &str, message: &str) -> LayoutNode {
    LayoutNode::new(format!("{}__error", parent_id), format!("error: {}", message))
}
