//! Materialized drawer tree and its reconciliation against fresh layouts.

use std::collections::{BTreeSet, HashSet};
use std::rc::Rc;

use super::expand_once::ExpandOncePolicy;
use super::layout::{
    normalize_name, ActionSlot, Children, ChildrenProvider, LayoutNode, NodeAction, NodeType, PickItems,
};
use crate::error::DrawerError;

/// The tree model's owned, stateful copy of a [`LayoutNode`].
#[derive(Debug, Clone)]
pub struct MaterializedNode {
    id: String,
    name: String,
    node_type: NodeType,
    schema: Option<String>,
    database: Option<String>,
    getter: Option<Rc<dyn ChildrenProvider>>,
    children: Vec<MaterializedNode>,
    expanded: bool,
    pick_title: Option<String>,
    pick_items: Option<PickItems>,
    actions: [Option<NodeAction>; 3],
}

impl MaterializedNode {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    pub fn is_lazy(&self) -> bool {
        self.getter.is_some()
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Lazy nodes are always expandable; eager ones only when they have children.
    pub fn is_expandable(&self) -> bool {
        self.is_lazy() || !self.children.is_empty()
    }

    /// Children as last materialized. For a collapsed lazy node these may be
    /// stale until the next expansion.
    pub fn children(&self) -> &[MaterializedNode] {
        &self.children
    }

    pub fn pick_title(&self) -> Option<&str> {
        self.pick_title.as_deref()
    }

    pub fn pick_items(&self) -> Option<&PickItems> {
        self.pick_items.as_ref()
    }

    pub fn action(&self, slot: ActionSlot) -> Option<&NodeAction> {
        self.actions[slot.index()].as_ref()
    }
}

/// A visible row: a node and its depth below the root.
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'a> {
    pub node: &'a MaterializedNode,
    pub depth: usize,
}

/// Owns the materialized forest and the one-shot expand registry.
#[derive(Debug, Default)]
pub struct TreeModel {
    roots: Vec<MaterializedNode>,
    expand_once: ExpandOncePolicy,
}

impl TreeModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the children of `under` (or the whole forest) from `forest`.
    ///
    /// Nodes whose id already exists at the same position keep their
    /// expansion state; expanded lazy nodes have their provider invoked again.
    /// The new subtree is only swapped in once it is fully built, so a failing
    /// provider leaves the previous tree in place.
    pub fn reconcile(&mut self, forest: Vec<LayoutNode>, under: Option<&str>) -> Result<(), DrawerError> {
        match under {
            None => {
                let rebuilt = materialize(forest, &self.roots, &mut self.expand_once)?;
                self.roots = rebuilt;
            }
            Some(parent_id) => {
                let parent = find_node_mut(&mut self.roots, parent_id)
                    .ok_or_else(|| DrawerError::UnknownNode(parent_id.to_string()))?;
                let rebuilt = materialize(forest, &parent.children, &mut self.expand_once)?;
                parent.children = rebuilt;
            }
        }
        Ok(())
    }

    /// Expand `id`, loading lazy children first, then keep descending while
    /// the expanded node has exactly one child.
    ///
    /// Returns whether any visible state changed. On failure the subtree is
    /// restored to how it was before the call.
    pub fn expand(&mut self, id: &str) -> Result<bool, DrawerError> {
        let node = find_node_mut(&mut self.roots, id).ok_or_else(|| DrawerError::UnknownNode(id.to_string()))?;
        let snapshot = node.clone();
        match expand_chain(node, &mut self.expand_once) {
            Ok(changed) => Ok(changed),
            Err(err) => {
                *node = snapshot;
                Err(err)
            }
        }
    }

    /// Fold `id`. Collapsing a collapsed node is a no-op and returns `false`.
    pub fn collapse(&mut self, id: &str) -> Result<bool, DrawerError> {
        let node = find_node_mut(&mut self.roots, id).ok_or_else(|| DrawerError::UnknownNode(id.to_string()))?;
        if !node.expanded {
            return Ok(false);
        }
        node.expanded = false;
        Ok(true)
    }

    pub fn toggle(&mut self, id: &str) -> Result<bool, DrawerError> {
        let expanded = self
            .node(id)
            .map(MaterializedNode::is_expanded)
            .ok_or_else(|| DrawerError::UnknownNode(id.to_string()))?;
        if expanded {
            self.collapse(id)
        } else {
            self.expand(id)
        }
    }

    pub fn roots(&self) -> &[MaterializedNode] {
        &self.roots
    }

    /// First node with `id` in display order.
    pub fn node(&self, id: &str) -> Option<&MaterializedNode> {
        find_node(&self.roots, id)
    }

    /// Rows in display order, skipping the descendants of collapsed nodes.
    pub fn visible(&self) -> Vec<NodeView<'_>> {
        let mut rows = Vec::new();
        collect_visible(&self.roots, 0, &mut rows);
        rows
    }

    /// Ids of every expanded node, including ones hidden under a collapsed ancestor.
    pub fn expanded_ids(&self) -> BTreeSet<String> {
        let mut ids = BTreeSet::new();
        collect_expanded(&self.roots, &mut ids);
        ids
    }

    pub fn expand_once(&self) -> &ExpandOncePolicy {
        &self.expand_once
    }
}

fn materialize(
    forest: Vec<LayoutNode>,
    previous: &[MaterializedNode],
    policy: &mut ExpandOncePolicy,
) -> Result<Vec<MaterializedNode>, DrawerError> {
    let mut seen = HashSet::new();
    let mut nodes = Vec::with_capacity(forest.len());
    for layout in forest {
        let prior: &[MaterializedNode] = if seen.insert(layout.id.clone()) {
            previous
        } else {
            log::debug!("duplicate sibling id '{}', first occurrence keeps identity", layout.id);
            &[]
        };
        nodes.push(materialize_node(layout, prior, policy)?);
    }
    Ok(nodes)
}

fn materialize_node(
    layout: LayoutNode,
    previous: &[MaterializedNode],
    policy: &mut ExpandOncePolicy,
) -> Result<MaterializedNode, DrawerError> {
    let prior = previous.iter().find(|node| node.id == layout.id);
    let stale: &[MaterializedNode] = prior.map(|node| node.children.as_slice()).unwrap_or(&[]);

    let mut expanded = prior.is_some_and(|node| node.expanded);
    if !expanded {
        if let Some(flag) = &layout.default_expand {
            expanded = policy.fire(flag.key());
        }
    }

    let (getter, children) = match layout.children {
        Children::Eager(children) => (None, materialize(children, stale, policy)?),
        Children::Lazy(provider) => {
            let children = if expanded {
                let loaded = provider.children().map_err(|source| DrawerError::Provider {
                    id: layout.id.clone(),
                    source,
                })?;
                materialize(loaded, stale, policy)?
            } else {
                stale.to_vec()
            };
            (Some(provider), children)
        }
    };

    let expandable = getter.is_some() || !children.is_empty();
    Ok(MaterializedNode {
        name: normalize_name(&layout.name),
        id: layout.id,
        node_type: layout.node_type,
        schema: layout.schema,
        database: layout.database,
        getter,
        children,
        expanded: expanded && expandable,
        pick_title: layout.pick_title,
        pick_items: layout.pick_items,
        actions: layout.actions,
    })
}

fn expand_chain(node: &mut MaterializedNode, policy: &mut ExpandOncePolicy) -> Result<bool, DrawerError> {
    let mut changed = false;
    if !node.expanded && node.is_expandable() {
        if let Some(getter) = node.getter.clone() {
            let loaded = getter.children().map_err(|source| DrawerError::Provider {
                id: node.id.clone(),
                source,
            })?;
            node.children = materialize(loaded, &node.children, policy)?;
        }
        node.expanded = true;
        changed = true;
    }

    if node.expanded && node.children.len() == 1 {
        changed |= expand_chain(&mut node.children[0], policy)?;
    }
    Ok(changed)
}

fn find_node<'a>(nodes: &'a [MaterializedNode], id: &str) -> Option<&'a MaterializedNode> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_node(&node.children, id) {
            return Some(found);
        }
    }
    None
}

fn find_node_mut<'a>(nodes: &'a mut [MaterializedNode], id: &str) -> Option<&'a mut MaterializedNode> {
    for node in nodes.iter_mut() {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_node_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

fn collect_visible<'a>(nodes: &'a [MaterializedNode], depth: usize, rows: &mut Vec<NodeView<'a>>) {
    for node in nodes {
        rows.push(NodeView { node, depth });
        if node.expanded {
            collect_visible(&node.children, depth + 1, rows);
        }
    }
}

fn collect_expanded(nodes: &[MaterializedNode], ids: &mut BTreeSet<String>) {
    for node in nodes {
        if node.expanded {
            ids.insert(node.id.clone());
        }
        collect_expanded(&node.children, ids);
    }
}
