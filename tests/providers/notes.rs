use std::cell::RefCell;
use std::rc::Rc;

use dbdrawer::providers::{MemoryNotes, NoteStore, NotesProvider};
use dbdrawer::tree::{ActionSlot, NodeType};
use dbdrawer::Drawer;

use crate::support::{visible_ids, Harness, RecordingPrompt, RecordingSurface};

struct Setup {
    h: Harness,
    store: Rc<MemoryNotes>,
    opened: Rc<RefCell<Vec<String>>>,
}

fn setup(namespace: Option<&str>) -> Setup {
    let store = Rc::new(MemoryNotes::new());
    let opened: Rc<RefCell<Vec<String>>> = Rc::default();
    let record = opened.clone();
    let namespace = namespace.map(str::to_string);
    let provider = NotesProvider::new(
        store.clone(),
        move |ns, note| {
            record.borrow_mut().push(format!("{}/{}", ns, note.name));
            Ok(())
        },
        move || namespace.clone(),
    );

    let surface = Rc::new(RefCell::new(RecordingSurface::default()));
    let prompt = Rc::new(RefCell::new(RecordingPrompt::default()));
    let mut drawer = Drawer::builder()
        .help_enabled(false)
        .provider(provider)
        .surface(surface.clone())
        .prompt(prompt.clone())
        .build()
        .unwrap();
    drawer.refresh().unwrap();
    Setup {
        h: Harness { drawer, surface, prompt },
        store,
        opened,
    }
}

#[test]
fn test_global_namespace_opens_expanded() {
    let s = setup(None);
    assert_eq!(visible_ids(&s.h.drawer), vec!["__notes/global", "__notes/global/__add"]);
    assert!(s.h.drawer.tree().node("__notes/global").unwrap().is_expanded());
}

#[test]
fn test_active_namespace_listed_after_global() {
    let s = setup(Some("c1"));
    let roots: Vec<_> = s.h.drawer.tree().roots().iter().map(|n| n.id().to_string()).collect();
    assert_eq!(roots, vec!["__notes/global", "__notes/c1"]);
    assert_eq!(s.h.drawer.tree().node("__notes/c1").unwrap().database(), Some("c1"));
}

#[test]
fn test_add_open_and_remove_note() {
    let mut s = setup(None);

    assert!(s.h.drawer.select("__notes/global/__add"));
    assert!(s.h.drawer.invoke(ActionSlot::First).unwrap());
    let notes = s.store.list("global");
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].name, "note-1");

    let note_id = format!("__notes/global/{}", notes[0].id);
    let node = s.h.drawer.tree().node(&note_id).unwrap();
    assert_eq!(node.node_type(), NodeType::Scratch);

    assert!(s.h.drawer.select(&note_id));
    s.h.drawer.invoke(ActionSlot::First).unwrap();
    assert_eq!(*s.opened.borrow(), vec!["global/note-1".to_string()]);

    s.h.drawer.invoke(ActionSlot::Third).unwrap();
    s.h.prompt.borrow_mut().choose("yes");
    assert!(s.h.drawer.process_events().unwrap());
    assert!(s.store.list("global").is_empty());
    assert!(s.h.drawer.tree().node(&note_id).is_none());
}
