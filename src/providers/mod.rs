//! Layout providers shipped with the drawer.
//!
//! - [`connections`] - backend connections with lazy structure and history
//! - [`notes`] - scratch notes per namespace

pub mod connections;
pub mod notes;

pub use connections::{ConnectionsProvider, Load};
pub use notes::{MemoryNotes, Note, NoteStore, NotesProvider};
