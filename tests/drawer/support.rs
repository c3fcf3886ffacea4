//! Recording collaborators shared by the drawer tests.

use std::cell::RefCell;
use std::rc::Rc;

use dbdrawer::drawer::{DrawerSurface, KeyMap, OnChoice, SelectionPrompt};
use dbdrawer::tree::LayoutNode;
use dbdrawer::{Drawer, DrawerBuilder};
use ratatui::text::Line;

#[derive(Default)]
pub struct RecordingSurface {
    pub open: bool,
    pub created: bool,
    pub lines: Vec<String>,
    pub cursor: Option<usize>,
    pub redraws: usize,
}

impl DrawerSurface for RecordingSurface {
    fn open(&mut self) -> bool {
        self.open = true;
        !std::mem::replace(&mut self.created, true)
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn redraw(&mut self, lines: Vec<Line<'static>>, cursor: Option<usize>) {
        self.lines = lines.iter().map(ToString::to_string).collect();
        self.cursor = cursor;
        self.redraws += 1;
    }
}

pub struct OpenPrompt {
    pub anchor: String,
    pub items: Vec<String>,
    pub title: String,
    on_choice: OnChoice,
}

#[derive(Default)]
pub struct RecordingPrompt {
    pub opened: Vec<(String, Vec<String>, String)>,
    pub current: Option<OpenPrompt>,
}

impl RecordingPrompt {
    /// Pick `item` in the open prompt.
    pub fn choose(&mut self, item: &str) {
        let prompt = self.current.take().expect("no prompt open");
        (prompt.on_choice)(item.to_string());
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }
}

impl SelectionPrompt for RecordingPrompt {
    fn open(&mut self, anchor: &str, items: Vec<String>, title: &str, on_choice: OnChoice) {
        self.opened.push((anchor.to_string(), items.clone(), title.to_string()));
        self.current = Some(OpenPrompt {
            anchor: anchor.to_string(),
            items,
            title: title.to_string(),
            on_choice,
        });
    }
}

pub struct Harness {
    pub drawer: Drawer,
    pub surface: Rc<RefCell<RecordingSurface>>,
    pub prompt: Rc<RefCell<RecordingPrompt>>,
}

/// Drawer over one section with recording collaborators.
pub fn harness(nodes: Vec<LayoutNode>) -> Harness {
    harness_with(Drawer::builder().keymap(KeyMap::default()).help_enabled(false), vec![nodes])
}

pub fn harness_with(builder: DrawerBuilder, sections: Vec<Vec<LayoutNode>>) -> Harness {
    let surface = Rc::new(RefCell::new(RecordingSurface::default()));
    let prompt = Rc::new(RefCell::new(RecordingPrompt::default()));
    let builder = sections
        .into_iter()
        .fold(builder, |builder, nodes| builder.provider(move || nodes.clone()));
    let drawer = builder
        .surface(surface.clone())
        .prompt(prompt.clone())
        .build()
        .expect("drawer builds");
    Harness { drawer, surface, prompt }
}

pub fn visible_ids(drawer: &Drawer) -> Vec<String> {
    drawer
        .tree()
        .visible()
        .iter()
        .map(|row| row.node.id().to_string())
        .collect()
}
