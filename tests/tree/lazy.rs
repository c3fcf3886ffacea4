use std::cell::Cell;
use std::rc::Rc;

use dbdrawer::tree::{LayoutNode, TreeModel};
use dbdrawer::DrawerError;

fn counted(calls: &Rc<Cell<usize>>) -> LayoutNode {
    let calls = calls.clone();
    LayoutNode::new("lazy", "lazy").lazy_children(move || {
        calls.set(calls.get() + 1);
        Ok(vec![LayoutNode::new("lazy/a", "a"), LayoutNode::new("lazy/b", "b")])
    })
}

#[test]
fn test_getter_not_called_while_collapsed() {
    let calls = Rc::new(Cell::new(0));
    let mut tree = TreeModel::new();
    tree.reconcile(vec![counted(&calls)], None).unwrap();
    tree.reconcile(vec![counted(&calls)], None).unwrap();

    assert_eq!(calls.get(), 0);
    assert!(tree.node("lazy").unwrap().is_expandable());
}

#[test]
fn test_getter_called_on_expand_and_each_refresh_while_expanded() {
    let calls = Rc::new(Cell::new(0));
    let mut tree = TreeModel::new();
    tree.reconcile(vec![counted(&calls)], None).unwrap();

    tree.expand("lazy").unwrap();
    assert_eq!(calls.get(), 1);
    assert_eq!(tree.node("lazy").unwrap().children().len(), 2);

    tree.reconcile(vec![counted(&calls)], None).unwrap();
    assert_eq!(calls.get(), 2);

    tree.collapse("lazy").unwrap();
    tree.reconcile(vec![counted(&calls)], None).unwrap();
    assert_eq!(calls.get(), 2);
    // Stale children are kept until the next expansion
    assert_eq!(tree.node("lazy").unwrap().children().len(), 2);
}

#[test]
fn test_lazy_children_loaded_before_chain_descent() {
    let mut tree = TreeModel::new();
    tree.reconcile(
        vec![LayoutNode::new("root", "root").lazy_children(|| {
            Ok(vec![LayoutNode::new("only", "only").children(vec![
                LayoutNode::new("x", "x"),
                LayoutNode::new("y", "y"),
            ])])
        })],
        None,
    )
    .unwrap();

    tree.expand("root").unwrap();
    assert!(tree.node("only").unwrap().is_expanded());
    assert_eq!(tree.visible().len(), 4);
}

#[test]
fn test_failing_getter_leaves_node_untouched_on_expand() {
    let mut tree = TreeModel::new();
    tree.reconcile(
        vec![LayoutNode::new("broken", "broken").lazy_children(|| anyhow::bail!("connection refused"))],
        None,
    )
    .unwrap();

    let err = tree.expand("broken").unwrap_err();
    assert!(matches!(err, DrawerError::Provider { ref id, .. } if id == "broken"));
    let node = tree.node("broken").unwrap();
    assert!(!node.is_expanded());
    assert!(node.children().is_empty());
}

#[test]
fn test_failing_getter_keeps_previous_tree_on_reconcile() {
    let fail = Rc::new(Cell::new(false));
    let layout = |fail: &Rc<Cell<bool>>| {
        let fail = fail.clone();
        vec![
            LayoutNode::new("lazy", "lazy").lazy_children(move || {
                if fail.get() {
                    anyhow::bail!("gone");
                }
                Ok(vec![LayoutNode::new("lazy/a", "a"), LayoutNode::new("lazy/b", "b")])
            }),
            LayoutNode::new("other", "other"),
        ]
    };

    let mut tree = TreeModel::new();
    tree.reconcile(layout(&fail), None).unwrap();
    tree.expand("lazy").unwrap();

    fail.set(true);
    let mut replacement = layout(&fail);
    replacement.push(LayoutNode::new("new", "new"));
    assert!(tree.reconcile(replacement, None).is_err());

    assert!(tree.node("new").is_none());
    assert!(tree.node("lazy").unwrap().is_expanded());
    assert_eq!(tree.node("lazy").unwrap().children().len(), 2);
}
