//! Constants used throughout the drawer
//!
//! Reserved id prefixes, layout bounds and UI text live here so the core and
//! the demo host agree on them.

// Reserved id prefixes for generated forest entries
pub const SEPARATOR_ID_PREFIX: &str = "__separator_node__";
pub const HELP_ID_PREFIX: &str = "__help_node__";
pub const HELP_ACTION_ID_PREFIX: &str = "__help_action_";

/// One-shot key for expanding the help section on first open.
pub const HELP_EXPAND_ONCE_KEY: &str = "drawer_help_expand_once";
/// One-shot key for expanding the global notes namespace on first open.
pub const NOTES_EXPAND_ONCE_KEY: &str = "drawer_notes_global_expand_once";

// Node names
pub const HELP_NODE_NAME: &str = "help";
pub const LOADING_NODE_NAME: &str = "loading...";
pub const HISTORY_NODE_NAME: &str = "history";
pub const NEW_CONNECTION_NODE_NAME: &str = "add connection";
pub const NEW_NOTE_NODE_NAME: &str = "new note";
pub const GLOBAL_NAMESPACE: &str = "global";

// Helper queries offered on table and view nodes
pub const HELPER_QUERIES: [&str; 3] = ["Select", "Describe", "Count"];

// UI Messages
pub const CONFIG_GENERATED: &str = "✅ Generated default configuration file";
pub const DIALOG_TITLE_ERROR: &str = "❌ Error - Press 'Esc' to close";
pub const DRAWER_TITLE: &str = "Drawer";

// UI Layout Constants
/// Minimum drawer width in columns
pub const DRAWER_MIN_WIDTH: u16 = 15;
/// Maximum drawer width in columns
pub const DRAWER_MAX_WIDTH: u16 = 80;
/// Default drawer width in columns
pub const DRAWER_DEFAULT_WIDTH: u16 = 40;
/// Idle time after which a pending key prefix resolves to its exact match
pub const KEY_SEQUENCE_TIMEOUT_MS: u64 = 500;
