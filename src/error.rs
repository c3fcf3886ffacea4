//! Error types shared by the tree model and the drawer.

use crate::drawer::keymap::KeyParseError;
use crate::tree::ActionSlot;

/// Errors raised by the drawer core.
///
/// Provider and action failures keep the collaborator's own error as their
/// source so callers can render the full chain.
#[derive(Debug, thiserror::Error)]
pub enum DrawerError {
    #[error("Missing required collaborator: {0}")]
    MissingCollaborator(&'static str),

    #[error("Node not found: {0}")]
    UnknownNode(String),

    #[error("Children provider for node '{id}' failed")]
    Provider {
        id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Pick items for node '{id}' could not be resolved")]
    PickItems {
        id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{slot} on node '{id}' failed")]
    Action {
        id: String,
        slot: ActionSlot,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid key map")]
    KeyMap(#[from] KeyParseError),
}
