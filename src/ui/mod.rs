//! Terminal host for the drawer
//!
//! Renders the drawer pane next to a details panel and routes key presses to
//! the drawer, the selection prompt and the error dialog.

pub mod app;
pub mod components;
pub mod layout;
pub mod renderer;

pub use app::{run_app, App};
pub use layout::LayoutManager;
pub use renderer::ThemedRenderer;
