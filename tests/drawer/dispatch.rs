use std::cell::{Cell, RefCell};
use std::rc::Rc;

use dbdrawer::drawer::DrawerCommand;
use dbdrawer::tree::{ActionSlot, LayoutNode, NodeAction, PickItems};
use dbdrawer::{Drawer, DrawerError};

use crate::support::{harness, RecordingPrompt, RecordingSurface};

type Calls = Rc<RefCell<Vec<Option<String>>>>;

fn recording_node(calls: &Calls) -> LayoutNode {
    let first = calls.clone();
    let second = calls.clone();
    LayoutNode::new("n", "node")
        .pick("Pick one", ["a", "b"])
        .action(
            ActionSlot::First,
            NodeAction::with_selection(move |_done, selection| {
                first.borrow_mut().push(selection);
                Ok(())
            }),
        )
        .action(
            ActionSlot::Second,
            NodeAction::new(move |_done| {
                second.borrow_mut().push(None);
                Ok(())
            }),
        )
}

#[test]
fn test_selection_action_waits_for_prompt() {
    let calls: Calls = Rc::default();
    let mut h = harness(vec![recording_node(&calls)]);
    h.drawer.refresh().unwrap();

    assert!(h.drawer.invoke(ActionSlot::First).unwrap());
    assert!(calls.borrow().is_empty());
    {
        let prompt = h.prompt.borrow();
        let (anchor, items, title) = &prompt.opened[0];
        assert_eq!(anchor, "n");
        assert_eq!(items, &vec!["a".to_string(), "b".to_string()]);
        assert_eq!(title, "Pick one");
    }

    h.prompt.borrow_mut().choose("b");
    assert_eq!(*calls.borrow(), vec![Some("b".to_string())]);
}

#[test]
fn test_immediate_action_bypasses_prompt() {
    let calls: Calls = Rc::default();
    let mut h = harness(vec![recording_node(&calls)]);
    h.drawer.refresh().unwrap();

    assert!(h.drawer.invoke(ActionSlot::Second).unwrap());
    assert!(h.prompt.borrow().opened.is_empty());
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn test_dismissed_prompt_never_invokes() {
    let calls: Calls = Rc::default();
    let mut h = harness(vec![recording_node(&calls)]);
    h.drawer.refresh().unwrap();

    h.drawer.invoke(ActionSlot::First).unwrap();
    h.prompt.borrow_mut().dismiss();
    h.drawer.process_events().unwrap();

    assert!(calls.borrow().is_empty());
}

#[test]
fn test_selection_action_without_pick_items_runs_with_none() {
    let calls: Calls = Rc::default();
    let record = calls.clone();
    let mut h = harness(vec![LayoutNode::new("n", "node").action(
        ActionSlot::First,
        NodeAction::with_selection(move |_done, selection| {
            record.borrow_mut().push(selection);
            Ok(())
        }),
    )]);
    h.drawer.refresh().unwrap();

    h.drawer.invoke(ActionSlot::First).unwrap();
    assert!(h.prompt.borrow().opened.is_empty());
    assert_eq!(*calls.borrow(), vec![None]);
}

#[test]
fn test_unbound_slot_is_ignored() {
    let mut h = harness(vec![LayoutNode::new("n", "node")]);
    h.drawer.refresh().unwrap();
    assert!(!h.drawer.invoke(ActionSlot::Third).unwrap());
}

#[test]
fn test_pick_items_provider_is_resolved_at_invoke() {
    let mut h = harness(vec![LayoutNode::new("n", "node")
        .pick("Tables", PickItems::provider(|| Ok(vec!["users".to_string()])))
        .action(ActionSlot::First, NodeAction::with_selection(|_, _| Ok(())))]);
    h.drawer.refresh().unwrap();

    h.drawer.invoke(ActionSlot::First).unwrap();
    assert_eq!(h.prompt.borrow().opened[0].1, vec!["users".to_string()]);
}

#[test]
fn test_failing_pick_items_provider_is_reported() {
    let mut h = harness(vec![LayoutNode::new("n", "node")
        .pick("Tables", PickItems::provider(|| anyhow::bail!("offline")))
        .action(ActionSlot::First, NodeAction::with_selection(|_, _| Ok(())))]);
    h.drawer.refresh().unwrap();

    let err = h.drawer.invoke(ActionSlot::First).unwrap_err();
    assert!(matches!(err, DrawerError::PickItems { ref id, .. } if id == "n"));
    assert!(h.prompt.borrow().opened.is_empty());
}

#[test]
fn test_immediate_failure_is_returned() {
    let mut h = harness(vec![LayoutNode::new("n", "node")
        .action(ActionSlot::Second, NodeAction::new(|_| anyhow::bail!("boom")))]);
    h.drawer.refresh().unwrap();

    let err = h.drawer.invoke(ActionSlot::Second).unwrap_err();
    assert!(matches!(err, DrawerError::Action { slot: ActionSlot::Second, .. }));
}

#[test]
fn test_deferred_failure_is_collected() {
    let mut h = harness(vec![LayoutNode::new("n", "node")
        .pick("Confirm", ["no", "yes"])
        .action(ActionSlot::Third, NodeAction::with_selection(|_, _| anyhow::bail!("denied")))]);
    h.drawer.refresh().unwrap();

    h.drawer.invoke(ActionSlot::Third).unwrap();
    h.prompt.borrow_mut().choose("yes");
    h.drawer.process_events().unwrap();

    let failures = h.drawer.take_failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].node_id, "n");
    assert!(failures[0].message.contains("denied"));
    assert!(h.drawer.take_failures().is_empty());
}

#[test]
fn test_repeated_done_calls_coalesce_into_one_refresh() {
    let layouts = Rc::new(Cell::new(0));
    let counter = layouts.clone();
    let mut drawer = Drawer::builder()
        .help_enabled(false)
        .provider(move || {
            counter.set(counter.get() + 1);
            vec![LayoutNode::new("n", "node").action(
                ActionSlot::First,
                NodeAction::new(|done| {
                    done.done();
                    done.done();
                    done.done();
                    Ok(())
                }),
            )]
        })
        .surface(RecordingSurface::default())
        .prompt(RecordingPrompt::default())
        .build()
        .unwrap();
    drawer.refresh().unwrap();
    assert_eq!(layouts.get(), 1);

    assert!(drawer.execute(DrawerCommand::Action(ActionSlot::First)).unwrap());
    assert_eq!(layouts.get(), 2);
    assert!(!drawer.process_events().unwrap());
}

#[tokio::test]
async fn test_continuation_from_another_thread_triggers_refresh() {
    let layouts = Rc::new(Cell::new(0));
    let counter = layouts.clone();
    let mut drawer = Drawer::builder()
        .help_enabled(false)
        .provider(move || {
            counter.set(counter.get() + 1);
            vec![LayoutNode::new("n", "node")]
        })
        .surface(RecordingSurface::default())
        .prompt(RecordingPrompt::default())
        .build()
        .unwrap();
    drawer.refresh().unwrap();

    let done = drawer.continuation();
    std::thread::spawn(move || done.done()).join().unwrap();

    assert!(drawer.settle().await.unwrap());
    assert_eq!(layouts.get(), 2);
}

#[test]
fn test_deferred_completion_still_counts_as_invoked() {
    let parked = Rc::new(RefCell::new(None));
    let slot = parked.clone();
    let mut h = harness(vec![LayoutNode::new("n", "node").action(
        ActionSlot::First,
        NodeAction::new(move |done| {
            *slot.borrow_mut() = Some(done);
            Ok(())
        }),
    )]);
    h.drawer.refresh().unwrap();
    let redraws = h.surface.borrow().redraws;

    assert!(h.drawer.invoke(ActionSlot::First).unwrap());
    assert_eq!(h.surface.borrow().redraws, redraws);

    parked.borrow_mut().take().unwrap().done();
    assert!(h.drawer.process_events().unwrap());
    assert_eq!(h.surface.borrow().redraws, redraws + 1);
}
