use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;

use dbdrawer::drawer::{DrawerCommand, KeyBinding, KeyMap};
use dbdrawer::tree::{LayoutNode, LayoutProvider, NodeType};
use dbdrawer::{Drawer, DrawerError};

use crate::support::{harness, harness_with, visible_ids, RecordingPrompt, RecordingSurface};

fn scenario() -> crate::support::Harness {
    let keymap = KeyMap::new(vec![(DrawerCommand::Refresh, KeyBinding::normal("R"))]).unwrap();
    harness_with(
        Drawer::builder().keymap(keymap).help_enabled(true),
        vec![
            vec![LayoutNode::new("conn1", "db1").node_type(NodeType::Connection)],
            vec![LayoutNode::new("h1", "history").node_type(NodeType::History)],
        ],
    )
}

#[test]
fn test_sections_are_separated_and_followed_by_help() {
    let mut h = scenario();
    h.drawer.refresh().unwrap();

    let roots = h.drawer.tree().roots();
    let types: Vec<_> = roots.iter().map(|node| node.node_type()).collect();
    assert_eq!(
        types,
        vec![
            NodeType::Connection,
            NodeType::Separator,
            NodeType::History,
            NodeType::Separator,
            NodeType::Help
        ]
    );
    assert_eq!(roots[0].id(), "conn1");
    assert_eq!(roots[2].id(), "h1");

    let help = &roots[4];
    assert!(help.is_expanded());
    let children: Vec<_> = help.children().iter().map(|node| node.name()).collect();
    assert_eq!(children, vec!["refresh = R (n)"]);
    assert_eq!(help.children()[0].id(), "__help_action_refresh");
}

#[test]
fn test_generated_ids_never_collide_across_refreshes() {
    let mut h = scenario();
    let mut seen = HashSet::new();
    for _ in 0..5 {
        h.drawer.refresh().unwrap();
        for node in h.drawer.tree().roots() {
            if matches!(node.node_type(), NodeType::Separator | NodeType::Help) {
                assert!(seen.insert(node.id().to_string()), "id {} reused", node.id());
            }
        }
    }
    assert_eq!(seen.len(), 15);
}

#[test]
fn test_help_expands_only_on_first_refresh() {
    let mut h = scenario();
    h.drawer.refresh().unwrap();
    assert!(h.drawer.tree().roots()[4].is_expanded());

    h.drawer.refresh().unwrap();
    assert!(!h.drawer.tree().roots()[4].is_expanded());
}

#[test]
fn test_open_refreshes_only_when_buffer_is_created() {
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let surface = Rc::new(std::cell::RefCell::new(RecordingSurface::default()));
    let mut drawer = Drawer::builder()
        .help_enabled(false)
        .provider(move || {
            counter.set(counter.get() + 1);
            vec![LayoutNode::new("a", "a")]
        })
        .surface(surface.clone())
        .prompt(RecordingPrompt::default())
        .build()
        .unwrap();

    drawer.open().unwrap();
    assert_eq!(calls.get(), 1);
    assert!(drawer.is_open());

    drawer.close();
    assert!(!drawer.is_open());
    drawer.open().unwrap();
    assert_eq!(calls.get(), 1);
    assert_eq!(surface.borrow().lines, vec!["  - a".to_string()]);
}

#[test]
fn test_missing_collaborators_fail_construction() {
    let missing_surface = Drawer::builder()
        .provider(Vec::new)
        .prompt(RecordingPrompt::default())
        .build();
    assert!(matches!(missing_surface, Err(DrawerError::MissingCollaborator("surface"))));

    let missing_prompt = Drawer::builder()
        .provider(Vec::new)
        .surface(RecordingSurface::default())
        .build();
    assert!(matches!(missing_prompt, Err(DrawerError::MissingCollaborator("selection prompt"))));

    let missing_provider = Drawer::builder()
        .surface(RecordingSurface::default())
        .prompt(RecordingPrompt::default())
        .build();
    assert!(matches!(missing_provider, Err(DrawerError::MissingCollaborator("layout provider"))));
}

#[test]
fn test_cursor_follows_node_across_refresh() {
    let extra = Rc::new(Cell::new(false));
    let toggle = extra.clone();
    let surface = Rc::new(std::cell::RefCell::new(RecordingSurface::default()));
    let mut drawer = Drawer::builder()
        .help_enabled(false)
        .provider(move || {
            let mut nodes = vec![LayoutNode::new("b", "b"), LayoutNode::new("c", "c")];
            if toggle.get() {
                nodes.insert(0, LayoutNode::new("a", "a"));
            }
            nodes
        })
        .surface(surface.clone())
        .prompt(RecordingPrompt::default())
        .build()
        .unwrap();

    drawer.refresh().unwrap();
    assert!(drawer.select("c"));
    assert_eq!(drawer.cursor(), 1);

    extra.set(true);
    drawer.refresh().unwrap();
    assert_eq!(drawer.current_node().unwrap().id(), "c");
    assert_eq!(drawer.cursor(), 2);
    assert_eq!(surface.borrow().cursor, Some(2));
}

#[test]
fn test_expansion_commands_apply_to_cursor_node() {
    let mut h = harness(vec![
        LayoutNode::new("p", "p").children(vec![LayoutNode::new("p/1", "1"), LayoutNode::new("p/2", "2")]),
        LayoutNode::new("q", "q"),
    ]);
    h.drawer.refresh().unwrap();

    assert!(h.drawer.execute(DrawerCommand::Expand).unwrap());
    assert_eq!(visible_ids(&h.drawer), vec!["p", "p/1", "p/2", "q"]);

    assert!(h.drawer.execute(DrawerCommand::Toggle).unwrap());
    assert_eq!(visible_ids(&h.drawer), vec!["p", "q"]);
    assert!(!h.drawer.execute(DrawerCommand::Collapse).unwrap());
}

#[test]
fn test_set_active_marks_nodes_and_redraws() {
    let mut h = harness(vec![LayoutNode::new("conn1", "db1"), LayoutNode::new("conn2", "db2")]);
    h.drawer.refresh().unwrap();
    let before = h.surface.borrow().redraws;

    h.drawer.set_active(["conn2"]);

    assert!(h.drawer.active().contains("conn2"));
    assert!(!h.drawer.active().contains("conn1"));
    assert_eq!(h.surface.borrow().redraws, before + 1);
}

struct CountingProvider {
    invalidations: Rc<Cell<usize>>,
}

impl LayoutProvider for CountingProvider {
    fn layout(&self) -> Vec<LayoutNode> {
        vec![LayoutNode::new("n", format!("generation {}", self.invalidations.get()))]
    }

    fn invalidate(&self) {
        self.invalidations.set(self.invalidations.get() + 1);
    }
}

#[test]
fn test_refresh_command_invalidates_providers() {
    let invalidations = Rc::new(Cell::new(0));
    let mut drawer = Drawer::builder()
        .help_enabled(false)
        .provider(CountingProvider {
            invalidations: invalidations.clone(),
        })
        .surface(RecordingSurface::default())
        .prompt(RecordingPrompt::default())
        .build()
        .unwrap();

    drawer.refresh().unwrap();
    drawer.continuation().done();
    drawer.process_events().unwrap();
    assert_eq!(invalidations.get(), 0);

    assert!(drawer.execute(DrawerCommand::Refresh).unwrap());
    assert_eq!(invalidations.get(), 1);
    assert_eq!(drawer.tree().node("n").unwrap().name(), "generation 1");
}
