//! Scratch notes section, grouped by namespace.
//!
//! The global namespace is always shown. When a connection is active, its
//! own namespace is listed after the global one.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::constants::{GLOBAL_NAMESPACE, NEW_NOTE_NODE_NAME, NOTES_EXPAND_ONCE_KEY};
use crate::tree::{ActionSlot, LayoutNode, LayoutProvider, NodeAction, NodeType};

const REMOVE_CONFIRM: [&str; 2] = ["no", "yes"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Storage for notes. Calls are synchronous and must be cheap.
pub trait NoteStore {
    fn list(&self, namespace: &str) -> Vec<Note>;
    fn create(&self, namespace: &str, name: &str) -> anyhow::Result<Note>;
    fn remove(&self, namespace: &str, note_id: &str) -> anyhow::Result<()>;
}

/// Notes kept in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryNotes {
    namespaces: RefCell<BTreeMap<String, Vec<Note>>>,
}

impl MemoryNotes {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NoteStore for MemoryNotes {
    fn list(&self, namespace: &str) -> Vec<Note> {
        self.namespaces.borrow().get(namespace).cloned().unwrap_or_default()
    }

    fn create(&self, namespace: &str, name: &str) -> anyhow::Result<Note> {
        let note = Note {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.namespaces
            .borrow_mut()
            .entry(namespace.to_string())
            .or_default()
            .push(note.clone());
        Ok(note)
    }

    fn remove(&self, namespace: &str, note_id: &str) -> anyhow::Result<()> {
        let mut namespaces = self.namespaces.borrow_mut();
        let notes = namespaces
            .get_mut(namespace)
            .ok_or_else(|| anyhow::anyhow!("Unknown note namespace '{}'", namespace))?;
        let before = notes.len();
        notes.retain(|note| note.id != note_id);
        if notes.len() == before {
            anyhow::bail!("Note '{}' not found in '{}'", note_id, namespace);
        }
        Ok(())
    }
}

type NoteOpener = dyn Fn(&str, &Note) -> anyhow::Result<()>;
type NamespaceSource = dyn Fn() -> Option<String>;

/// Layout provider for scratch notes.
#[derive(Clone)]
pub struct NotesProvider {
    store: Rc<dyn NoteStore>,
    opener: Rc<NoteOpener>,
    current_namespace: Rc<NamespaceSource>,
}

impl NotesProvider {
    /// `opener` is called with the namespace and note when a note is opened.
    /// `current_namespace` names the extra namespace to show, if any.
    pub fn new<O, N>(store: Rc<dyn NoteStore>, opener: O, current_namespace: N) -> Self
    where
        O: Fn(&str, &Note) -> anyhow::Result<()> + 'static,
        N: Fn() -> Option<String> + 'static,
    {
        Self {
            store,
            opener: Rc::new(opener),
            current_namespace: Rc::new(current_namespace),
        }
    }

    fn namespace_node(&self, namespace: &str) -> LayoutNode {
        let mut children: Vec<LayoutNode> = self
            .store
            .list(namespace)
            .iter()
            .map(|note| self.note_node(namespace, note))
            .collect();
        children.push(self.add_node(namespace));

        let node = LayoutNode::new(format!("__notes/{}", namespace), namespace).children(children);
        if namespace == GLOBAL_NAMESPACE {
            node.expand_once(NOTES_EXPAND_ONCE_KEY)
        } else {
            node.database(namespace)
        }
    }

    fn note_node(&self, namespace: &str, note: &Note) -> LayoutNode {
        let open = {
            let opener = self.opener.clone();
            let namespace = namespace.to_string();
            let note = note.clone();
            NodeAction::new(move |done| {
                opener(&namespace, &note)?;
                done.done();
                Ok(())
            })
        };
        let remove = {
            let store = self.store.clone();
            let namespace = namespace.to_string();
            let note_id = note.id.clone();
            NodeAction::with_selection(move |done, choice| {
                if choice.as_deref() == Some("yes") {
                    store.remove(&namespace, &note_id)?;
                    log::info!("removed note {} from {}", note_id, namespace);
                    done.done();
                }
                Ok(())
            })
        };

        LayoutNode::new(format!("__notes/{}/{}", namespace, note.id), note.name.clone())
            .node_type(NodeType::Scratch)
            .pick("Remove note?", REMOVE_CONFIRM)
            .action(ActionSlot::First, open)
            .action(ActionSlot::Third, remove)
    }

    fn add_node(&self, namespace: &str) -> LayoutNode {
        let store = self.store.clone();
        let ns = namespace.to_string();
        LayoutNode::new(format!("__notes/{}/__add", namespace), NEW_NOTE_NODE_NAME)
            .node_type(NodeType::Add)
            .action(
                ActionSlot::First,
                NodeAction::new(move |done| {
                    let name = format!("note-{}", store.list(&ns).len() + 1);
                    let note = store.create(&ns, &name)?;
                    log::info!("created note {} in {}", note.name, ns);
                    done.done();
                    Ok(())
                }),
            )
    }
}

impl LayoutProvider for NotesProvider {
    fn layout(&self) -> Vec<LayoutNode> {
        let mut nodes = vec![self.namespace_node(GLOBAL_NAMESPACE)];
        if let Some(namespace) = (self.current_namespace)().filter(|ns| ns != GLOBAL_NAMESPACE) {
            nodes.push(self.namespace_node(&namespace));
        }
        nodes
    }
}
