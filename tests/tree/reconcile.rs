use dbdrawer::tree::{LayoutNode, NodeType, TreeModel};

fn forest() -> Vec<LayoutNode> {
    vec![
        LayoutNode::new("conn1", "db1")
            .node_type(NodeType::Connection)
            .children(vec![
                LayoutNode::new("conn1/public", "public").children(vec![LayoutNode::new("conn1/public/users", "users")]),
                LayoutNode::new("conn1/audit", "audit"),
            ]),
        LayoutNode::new("conn2", "db2").children(vec![LayoutNode::new("conn2/main", "main")]),
    ]
}

fn rows(tree: &TreeModel) -> Vec<(String, usize)> {
    tree.visible()
        .iter()
        .map(|row| (row.node.id().to_string(), row.depth))
        .collect()
}

#[test]
fn test_reconcile_is_idempotent() {
    let mut tree = TreeModel::new();
    tree.reconcile(forest(), None).unwrap();
    tree.expand("conn1").unwrap();
    tree.expand("conn1/public").unwrap();

    let before = rows(&tree);
    let expanded_before = tree.expanded_ids();
    tree.reconcile(forest(), None).unwrap();
    tree.reconcile(forest(), None).unwrap();

    assert_eq!(rows(&tree), before);
    assert_eq!(tree.expanded_ids(), expanded_before);
}

#[test]
fn test_expansion_survives_refresh_when_id_is_kept() {
    let mut tree = TreeModel::new();
    tree.reconcile(forest(), None).unwrap();
    tree.expand("conn2").unwrap();

    // Renamed and reordered, same ids
    let renamed = vec![
        LayoutNode::new("conn2", "renamed").children(vec![LayoutNode::new("conn2/main", "main")]),
        LayoutNode::new("conn1", "db1").children(vec![LayoutNode::new("conn1/audit", "audit")]),
    ];
    tree.reconcile(renamed, None).unwrap();

    let conn2 = tree.node("conn2").unwrap();
    assert!(conn2.is_expanded());
    assert_eq!(conn2.name(), "renamed");
    assert!(!tree.node("conn1").unwrap().is_expanded());
}

#[test]
fn test_dropped_nodes_lose_state() {
    let mut tree = TreeModel::new();
    tree.reconcile(forest(), None).unwrap();
    tree.expand("conn2").unwrap();

    tree.reconcile(vec![LayoutNode::new("conn1", "db1")], None).unwrap();
    tree.reconcile(forest(), None).unwrap();

    assert!(!tree.node("conn2").unwrap().is_expanded());
}

#[test]
fn test_expand_once_fires_only_first_time() {
    let layout = || {
        vec![LayoutNode::new("help-1", "help")
            .children(vec![LayoutNode::new("child", "child")])
            .expand_once("help_once")]
    };
    let mut tree = TreeModel::new();
    tree.reconcile(layout(), None).unwrap();
    assert!(tree.node("help-1").unwrap().is_expanded());

    tree.collapse("help-1").unwrap();
    tree.reconcile(layout(), None).unwrap();
    assert!(!tree.node("help-1").unwrap().is_expanded());

    // A fresh id does not re-arm the flag
    let renamed = vec![LayoutNode::new("help-2", "help")
        .children(vec![LayoutNode::new("child", "child")])
        .expand_once("help_once")];
    tree.reconcile(renamed, None).unwrap();
    assert!(!tree.node("help-2").unwrap().is_expanded());
    assert!(tree.expand_once().is_consumed("help_once"));
}

#[test]
fn test_reconcile_under_parent_only_touches_its_children() {
    let mut tree = TreeModel::new();
    tree.reconcile(forest(), None).unwrap();
    tree.expand("conn1").unwrap();
    tree.expand("conn2").unwrap();

    tree.reconcile(
        vec![LayoutNode::new("conn1/analytics", "analytics"), LayoutNode::new("conn1/audit", "audit")],
        Some("conn1"),
    )
    .unwrap();

    let children: Vec<_> = tree.node("conn1").unwrap().children().iter().map(|n| n.id()).collect();
    assert_eq!(children, vec!["conn1/analytics", "conn1/audit"]);
    assert!(tree.node("conn2").unwrap().is_expanded());
    assert!(tree.node("conn2/main").is_some());
}

#[test]
fn test_multiline_names_are_flattened() {
    let mut tree = TreeModel::new();
    tree.reconcile(vec![LayoutNode::new("q", "select *\n  from users\r\nlimit 1")], None)
        .unwrap();
    assert!(!tree.node("q").unwrap().name().contains('\n'));
    assert!(!tree.node("q").unwrap().name().contains('\r'));
}
