use std::cell::RefCell;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use dbdrawer::drawer::{DrawerCommand, KeyBinding, KeyMap, KeyMode};
use dbdrawer::tree::{ActionSlot, LayoutNode, NodeAction};
use dbdrawer::Drawer;

use crate::support::{harness_with, visible_ids, Harness};

fn press(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
}

fn slot_recorder(log: &Rc<RefCell<Vec<ActionSlot>>>, slot: ActionSlot) -> NodeAction {
    let log = log.clone();
    NodeAction::new(move |_| {
        log.borrow_mut().push(slot);
        Ok(())
    })
}

fn keyed(log: &Rc<RefCell<Vec<ActionSlot>>>) -> Harness {
    let node = LayoutNode::new("p", "parent")
        .children(vec![LayoutNode::new("p/1", "1"), LayoutNode::new("p/2", "2")])
        .action(ActionSlot::First, slot_recorder(log, ActionSlot::First))
        .action(ActionSlot::Second, slot_recorder(log, ActionSlot::Second))
        .action(ActionSlot::Third, slot_recorder(log, ActionSlot::Third));
    let mut h = harness_with(
        Drawer::builder().keymap(KeyMap::default()).help_enabled(false),
        vec![vec![node]],
    );
    h.drawer.refresh().unwrap();
    h
}

#[test]
fn test_enter_invokes_first_action() {
    let log = Rc::default();
    let mut h = keyed(&log);
    h.drawer
        .handle_key(KeyMode::Normal, &KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE))
        .unwrap();
    assert_eq!(*log.borrow(), vec![ActionSlot::First]);
}

#[test]
fn test_two_key_sequence_waits_for_second_key() {
    let log = Rc::default();
    let mut h = keyed(&log);

    h.drawer.handle_key(KeyMode::Normal, &press('d')).unwrap();
    assert!(h.drawer.has_pending_keys());
    assert!(log.borrow().is_empty());

    h.drawer.handle_key(KeyMode::Normal, &press('d')).unwrap();
    assert!(!h.drawer.has_pending_keys());
    assert_eq!(*log.borrow(), vec![ActionSlot::Third]);
}

#[test]
fn test_prefix_binding_fires_on_timeout() {
    let log = Rc::default();
    let mut h = keyed(&log);
    h.drawer.execute(DrawerCommand::Expand).unwrap();
    assert_eq!(visible_ids(&h.drawer).len(), 3);

    // "c" collapses but is also the start of "cw"
    h.drawer.handle_key(KeyMode::Normal, &press('c')).unwrap();
    assert_eq!(visible_ids(&h.drawer).len(), 3);

    assert!(h.drawer.expire_pending_keys().unwrap());
    assert_eq!(visible_ids(&h.drawer), vec!["p"]);
}

#[test]
fn test_prefix_binding_fires_when_sequence_breaks() {
    let log = Rc::default();
    let mut h = keyed(&log);

    // "c" then "e": collapse is a no-op, then expand runs
    h.drawer.handle_key(KeyMode::Normal, &press('c')).unwrap();
    h.drawer.handle_key(KeyMode::Normal, &press('e')).unwrap();
    assert_eq!(visible_ids(&h.drawer).len(), 3);

    h.drawer.handle_key(KeyMode::Normal, &press('c')).unwrap();
    h.drawer.handle_key(KeyMode::Normal, &press('w')).unwrap();
    assert_eq!(*log.borrow(), vec![ActionSlot::Second]);
    assert_eq!(visible_ids(&h.drawer).len(), 3);
}

#[test]
fn test_bindings_are_scoped_to_their_mode() {
    let log: Rc<RefCell<Vec<ActionSlot>>> = Rc::default();
    let keymap = KeyMap::new(vec![(
        DrawerCommand::Action(ActionSlot::First),
        KeyBinding::new("x", KeyMode::Visual),
    )])
    .unwrap();
    let mut h = harness_with(
        Drawer::builder().keymap(keymap).help_enabled(false),
        vec![vec![LayoutNode::new("n", "n").action(ActionSlot::First, slot_recorder(&log, ActionSlot::First))]],
    );
    h.drawer.refresh().unwrap();

    h.drawer.handle_key(KeyMode::Normal, &press('x')).unwrap();
    assert!(log.borrow().is_empty());

    h.drawer.handle_key(KeyMode::Visual, &press('x')).unwrap();
    assert_eq!(*log.borrow(), vec![ActionSlot::First]);
}

#[test]
fn test_shifted_letters_match_uppercase_bindings() {
    let keymap = KeyMap::new(vec![(DrawerCommand::Toggle, KeyBinding::normal("O"))]).unwrap();
    let mut h = harness_with(
        Drawer::builder().keymap(keymap).help_enabled(false),
        vec![vec![LayoutNode::new("p", "p").children(vec![LayoutNode::new("a", "a"), LayoutNode::new("b", "b")])]],
    );
    h.drawer.refresh().unwrap();

    h.drawer
        .handle_key(KeyMode::Normal, &KeyEvent::new(KeyCode::Char('O'), KeyModifiers::SHIFT))
        .unwrap();
    assert_eq!(visible_ids(&h.drawer).len(), 3);
}
