//! UI components for the demo host

pub mod common;
pub mod details_panel;
pub mod drawer_view;
pub mod error_dialog;
pub mod picker;
pub mod status_bar;

pub use details_panel::DetailsPanel;
pub use drawer_view::DrawerView;
pub use error_dialog::ErrorDialog;
pub use picker::PickerDialog;
pub use status_bar::StatusBar;
