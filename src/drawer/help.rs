//! Generated help section listing the configured key bindings.

use super::keymap::KeyMap;
use crate::constants::{HELP_ACTION_ID_PREFIX, HELP_EXPAND_ONCE_KEY, HELP_NODE_NAME};
use crate::tree::{LayoutNode, NodeType};

/// Build the help root with id `id`.
///
/// One child per bound command, named `"<command> = <key> (<mode>)"` and sorted
/// by id. The root expands itself the first time it is materialized.
pub fn help_section(id: String, keymap: &KeyMap) -> LayoutNode {
    let mut children: Vec<LayoutNode> = keymap
        .bindings()
        .map(|(command, binding)| {
            LayoutNode::new(
                format!("{}{}", HELP_ACTION_ID_PREFIX, command.name()),
                format!("{} = {} ({})", command.name(), binding.key, binding.mode),
            )
        })
        .collect();
    children.sort_by(|a, b| a.id.cmp(&b.id));

    LayoutNode::new(id, HELP_NODE_NAME)
        .node_type(NodeType::Help)
        .children(children)
        .expand_once(HELP_EXPAND_ONCE_KEY)
}
