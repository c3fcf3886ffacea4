//! Drawer tree: declarative layouts, the materialized model, and one-shot
//! expansion flags.
//!
//! - [`layout`] - what providers hand in on every refresh
//! - [`model`] - what the drawer keeps between refreshes
//! - [`expand_once`] - registry backing `default_expand`

pub mod expand_once;
pub mod layout;
pub mod model;

pub use expand_once::ExpandOncePolicy;
pub use layout::{
    ActionSlot, Children, ChildrenProvider, ExpandOnce, LayoutNode, LayoutProvider, NodeAction, NodeType, PickItems,
    PickItemsProvider,
};
pub use model::{MaterializedNode, NodeView, TreeModel};
