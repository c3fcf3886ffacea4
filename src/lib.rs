//! dbdrawer - a navigation drawer for database tooling
//!
//! The drawer composes independent layout providers into one browsable tree
//! of connections, schemas, tables, call history and notes. It keeps
//! expansion state across refreshes, loads children lazily, and binds up to
//! three actions per node to configurable key sequences.
//!
//! # Modules
//!
//! * [`tree`] - Declarative layout nodes and the materialized tree model
//! * [`drawer`] - The drawer itself: refresh, key dispatch, action invocation
//! * [`providers`] - Connection and note sections
//! * [`backend`] - Async backend abstraction and the in-memory backend
//! * [`config`] - Configuration file handling
//! * [`ui`] - Terminal host built with Ratatui

/// Backend abstraction and background task execution
pub mod backend;

/// Configuration module for managing application settings
pub mod config;

/// Reserved ids, node names and layout bounds
pub mod constants;

/// Drawer core: collaborators, refresh and dispatch
pub mod drawer;

/// Error types
pub mod error;

/// Logging setup
pub mod logger;

/// Built-in layout providers
pub mod providers;

/// Icon and colour themes
pub mod theme;

/// Layout nodes and the tree model
pub mod tree;

/// Terminal user interface components and rendering
pub mod ui;

/// Small helpers
pub mod utils;

pub use drawer::{Continuation, Drawer, DrawerBuilder, DrawerSurface, Renderer, SelectionPrompt};
pub use error::DrawerError;
pub use tree::{ActionSlot, LayoutNode, LayoutProvider, NodeAction, NodeType, TreeModel};
