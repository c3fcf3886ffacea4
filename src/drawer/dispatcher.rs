//! Routing of action slots to node actions.

use tokio::sync::mpsc;

use super::SelectionPrompt;
use crate::error::DrawerError;
use crate::tree::{ActionSlot, MaterializedNode};

/// Events delivered to the drawer from continuations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawerEvent {
    /// An action finished; the drawer should rebuild its forest.
    Refresh,
    /// An action failed after control had returned to the event loop.
    ActionFailed(ActionFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionFailure {
    pub node_id: String,
    pub message: String,
}

/// Completion handle passed to every action.
///
/// Cheap to clone and `Send`, so it can be moved into a background task and
/// called once the backend round-trip completes. Calling it after the drawer
/// is gone is harmless.
#[derive(Debug, Clone)]
pub struct Continuation {
    sender: mpsc::UnboundedSender<DrawerEvent>,
}

impl Continuation {
    pub fn new(sender: mpsc::UnboundedSender<DrawerEvent>) -> Self {
        Self { sender }
    }

    /// A continuation together with the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<DrawerEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }

    /// Signal completion and request a refresh.
    pub fn done(&self) {
        self.send(DrawerEvent::Refresh);
    }

    /// Report a failure for `node_id` that happened outside the dispatcher.
    pub fn fail(&self, node_id: &str, error: &anyhow::Error) {
        self.send(DrawerEvent::ActionFailed(ActionFailure {
            node_id: node_id.to_string(),
            message: format!("{:#}", error),
        }));
    }

    fn send(&self, event: DrawerEvent) {
        if self.sender.send(event).is_err() {
            log::debug!("drawer closed before continuation fired");
        }
    }
}

/// Invokes node actions, going through the selection prompt when the action
/// asks for a choice and the node offers pick items.
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    continuation: Continuation,
}

impl ActionDispatcher {
    pub fn new(continuation: Continuation) -> Self {
        Self { continuation }
    }

    pub fn continuation(&self) -> Continuation {
        self.continuation.clone()
    }

    /// Invoke `slot` on `node`.
    ///
    /// Returns `Ok(false)` when the slot is unset. When the prompt is opened
    /// the action only runs once the user picks an item; a dismissed prompt
    /// never runs it. Failures in that deferred call arrive as
    /// [`DrawerEvent::ActionFailed`].
    pub fn invoke(
        &self,
        node: &MaterializedNode,
        slot: ActionSlot,
        prompt: &mut dyn SelectionPrompt,
    ) -> Result<bool, DrawerError> {
        let Some(action) = node.action(slot) else {
            log::debug!("{} is not bound on node '{}'", slot, node.id());
            return Ok(false);
        };
        let done = self.continuation();

        match node.pick_items() {
            Some(pick_items) if action.wants_selection() => {
                let items = pick_items.resolve().map_err(|source| DrawerError::PickItems {
                    id: node.id().to_string(),
                    source,
                })?;
                let title = node.pick_title().unwrap_or_else(|| node.name()).to_string();
                let action = action.clone();
                let node_id = node.id().to_string();

                log::debug!("{} on '{}' waits for a choice among {} items", slot, node_id, items.len());
                prompt.open(
                    node.id(),
                    items,
                    &title,
                    Box::new(move |choice| {
                        if let Err(err) = action.call(done.clone(), Some(choice)) {
                            log::error!("{} on node '{}' failed: {:#}", slot, node_id, err);
                            done.fail(&node_id, &err);
                        }
                    }),
                );
            }
            _ => {
                log::debug!("invoking {} on '{}'", slot, node.id());
                action.call(done, None).map_err(|source| DrawerError::Action {
                    id: node.id().to_string(),
                    slot,
                    source,
                })?;
            }
        }
        Ok(true)
    }
}
