//! The drawer: composes layout providers, owns the tree model, and routes
//! commands to node actions.
//!
//! The host supplies three collaborators:
//!
//! - a [`DrawerSurface`] that shows prepared lines,
//! - a [`SelectionPrompt`] used when an action asks for a choice,
//! - optionally a [`Renderer`] (defaults to the themed renderer).
//!
//! Actions never call back into the drawer directly. They receive a
//! [`Continuation`] that queues a [`DrawerEvent`]; the host drains the queue
//! with [`Drawer::process_events`] on its own event loop, so the tree is only
//! ever mutated from that loop.

pub mod dispatcher;
pub mod help;
pub mod keymap;

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crossterm::event::KeyEvent;
use ratatui::text::Line;
use tokio::sync::mpsc;

pub use dispatcher::{ActionDispatcher, ActionFailure, Continuation, DrawerEvent};
pub use keymap::{DrawerCommand, KeyBinding, KeyMap, KeyMode, KeyStroke};

use crate::constants::{HELP_ID_PREFIX, SEPARATOR_ID_PREFIX};
use crate::error::DrawerError;
use crate::theme::Theme;
use crate::tree::{ActionSlot, LayoutNode, LayoutProvider, MaterializedNode, NodeType, NodeView, TreeModel};
use crate::ui::renderer::ThemedRenderer;

/// Callback handed to the selection prompt; called with the picked item.
pub type OnChoice = Box<dyn FnOnce(String)>;

/// Host window or buffer the drawer draws into.
pub trait DrawerSurface {
    /// Show the surface. Returns `true` when the underlying buffer was
    /// created by this call.
    fn open(&mut self) -> bool;
    fn close(&mut self);
    fn is_open(&self) -> bool;
    /// Replace the displayed lines. `cursor` is the selected row, if any.
    fn redraw(&mut self, lines: Vec<Line<'static>>, cursor: Option<usize>);
}

/// Modal that asks the user to pick one string.
///
/// Exactly one of two things happens per `open`: `on_choice` is called once,
/// or the prompt is dismissed and `on_choice` is dropped uncalled.
pub trait SelectionPrompt {
    fn open(&mut self, anchor: &str, items: Vec<String>, title: &str, on_choice: OnChoice);
}

/// Turns a visible row into a display line.
pub trait Renderer {
    fn prepare(&self, row: &NodeView<'_>, theme: &Theme, active: &HashSet<String>) -> Line<'static>;
}

impl<T: DrawerSurface> DrawerSurface for Rc<RefCell<T>> {
    fn open(&mut self) -> bool {
        self.borrow_mut().open()
    }

    fn close(&mut self) {
        self.borrow_mut().close();
    }

    fn is_open(&self) -> bool {
        self.borrow().is_open()
    }

    fn redraw(&mut self, lines: Vec<Line<'static>>, cursor: Option<usize>) {
        self.borrow_mut().redraw(lines, cursor);
    }
}

impl<T: SelectionPrompt> SelectionPrompt for Rc<RefCell<T>> {
    fn open(&mut self, anchor: &str, items: Vec<String>, title: &str, on_choice: OnChoice) {
        self.borrow_mut().open(anchor, items, title, on_choice);
    }
}

/// Monotonic id source for generated entries.
///
/// Ids never repeat for the lifetime of the generator, however quickly they
/// are requested.
#[derive(Debug, Default)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self, prefix: &str) -> String {
        self.next += 1;
        format!("{}{}", prefix, self.next)
    }
}

/// Collects collaborators for a [`Drawer`].
pub struct DrawerBuilder {
    providers: Vec<Box<dyn LayoutProvider>>,
    surface: Option<Box<dyn DrawerSurface>>,
    prompt: Option<Box<dyn SelectionPrompt>>,
    renderer: Option<Box<dyn Renderer>>,
    keymap: KeyMap,
    theme: Theme,
    help_enabled: bool,
    sender: mpsc::UnboundedSender<DrawerEvent>,
    receiver: mpsc::UnboundedReceiver<DrawerEvent>,
}

impl Default for DrawerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawerBuilder {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            providers: Vec::new(),
            surface: None,
            prompt: None,
            renderer: None,
            keymap: KeyMap::default(),
            theme: Theme::default(),
            help_enabled: true,
            sender,
            receiver,
        }
    }

    /// Continuation wired to the drawer being built. Providers that create
    /// actions need it before the drawer exists.
    pub fn continuation(&self) -> Continuation {
        Continuation::new(self.sender.clone())
    }

    /// Append a provider section. Sections are shown in the order added.
    pub fn provider(mut self, provider: impl LayoutProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn surface(mut self, surface: impl DrawerSurface + 'static) -> Self {
        self.surface = Some(Box::new(surface));
        self
    }

    pub fn prompt(mut self, prompt: impl SelectionPrompt + 'static) -> Self {
        self.prompt = Some(Box::new(prompt));
        self
    }

    pub fn renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn keymap(mut self, keymap: KeyMap) -> Self {
        self.keymap = keymap;
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn help_enabled(mut self, enabled: bool) -> Self {
        self.help_enabled = enabled;
        self
    }

    /// Fails when the surface, the prompt, or every provider is missing.
    pub fn build(self) -> Result<Drawer, DrawerError> {
        let surface = self.surface.ok_or(DrawerError::MissingCollaborator("surface"))?;
        let prompt = self.prompt.ok_or(DrawerError::MissingCollaborator("selection prompt"))?;
        if self.providers.is_empty() {
            return Err(DrawerError::MissingCollaborator("layout provider"));
        }

        Ok(Drawer {
            providers: self.providers,
            surface,
            prompt,
            renderer: self.renderer.unwrap_or_else(|| Box::new(ThemedRenderer)),
            keymap: self.keymap,
            theme: self.theme,
            help_enabled: self.help_enabled,
            tree: TreeModel::new(),
            dispatcher: ActionDispatcher::new(Continuation::new(self.sender)),
            events: self.receiver,
            ids: IdGenerator::new(),
            cursor: 0,
            active: HashSet::new(),
            failures: Vec::new(),
        })
    }
}

/// Navigation drawer.
pub struct Drawer {
    providers: Vec<Box<dyn LayoutProvider>>,
    surface: Box<dyn DrawerSurface>,
    prompt: Box<dyn SelectionPrompt>,
    renderer: Box<dyn Renderer>,
    keymap: KeyMap,
    theme: Theme,
    help_enabled: bool,
    tree: TreeModel,
    dispatcher: ActionDispatcher,
    events: mpsc::UnboundedReceiver<DrawerEvent>,
    ids: IdGenerator,
    cursor: usize,
    active: HashSet<String>,
    failures: Vec<ActionFailure>,
}

impl Drawer {
    pub fn builder() -> DrawerBuilder {
        DrawerBuilder::new()
    }

    /// Rebuild the forest from every provider, reconcile, and redraw.
    pub fn refresh(&mut self) -> Result<(), DrawerError> {
        let cursor_id = self.current_node().map(|node| node.id().to_string());
        let forest = self.build_forest();
        log::debug!("refreshing drawer with {} top-level nodes", forest.len());

        self.tree.reconcile(forest, None)?;
        self.restore_cursor(cursor_id.as_deref());
        self.redraw();
        Ok(())
    }

    /// Invalidate every provider's cache, then refresh.
    pub fn reload(&mut self) -> Result<(), DrawerError> {
        log::debug!("reloading {} providers", self.providers.len());
        for provider in &self.providers {
            provider.invalidate();
        }
        self.refresh()
    }

    /// Open the surface. Only a newly created buffer triggers a refresh.
    pub fn open(&mut self) -> Result<(), DrawerError> {
        if self.surface.open() {
            log::info!("drawer buffer created");
            self.refresh()
        } else {
            self.redraw();
            Ok(())
        }
    }

    pub fn close(&mut self) {
        self.surface.close();
    }

    pub fn is_open(&self) -> bool {
        self.surface.is_open()
    }

    /// Run `command` against the node under the cursor. Returns whether the
    /// drawer redrew.
    pub fn execute(&mut self, command: DrawerCommand) -> Result<bool, DrawerError> {
        match command {
            DrawerCommand::Refresh => {
                self.reload()?;
                Ok(true)
            }
            DrawerCommand::Action(slot) => self.invoke(slot),
            DrawerCommand::Expand => self.change_current(TreeModel::expand),
            DrawerCommand::Collapse => self.change_current(TreeModel::collapse),
            DrawerCommand::Toggle => self.change_current(TreeModel::toggle),
        }
    }

    /// Invoke `slot` on the node under the cursor, then apply any refresh its
    /// continuation already requested.
    ///
    /// Returns whether the slot was bound. An action waiting on the selection
    /// prompt or on a background task still counts as invoked.
    pub fn invoke(&mut self, slot: ActionSlot) -> Result<bool, DrawerError> {
        let invoked = {
            let rows = self.tree.visible();
            match rows.get(self.cursor) {
                Some(row) => self.dispatcher.invoke(row.node, slot, self.prompt.as_mut())?,
                None => false,
            }
        };
        if !invoked {
            return Ok(false);
        }
        self.process_events()?;
        Ok(true)
    }

    /// Feed a key event through the key map and execute what it completes.
    pub fn handle_key(&mut self, mode: KeyMode, event: &KeyEvent) -> Result<bool, DrawerError> {
        let commands = self.keymap.feed(mode, KeyStroke::from_event(event));
        let mut redrawn = false;
        for command in commands {
            redrawn |= self.execute(command)?;
        }
        Ok(redrawn)
    }

    /// Resolve a pending key prefix after the host's key timeout.
    pub fn expire_pending_keys(&mut self) -> Result<bool, DrawerError> {
        match self.keymap.expire() {
            Some(command) => self.execute(command),
            None => Ok(false),
        }
    }

    pub fn has_pending_keys(&self) -> bool {
        self.keymap.is_pending()
    }

    /// Drain queued events. Any number of refresh requests collapse into a
    /// single refresh. Returns whether a refresh ran.
    ///
    /// Deferred failures are logged and kept for [`Drawer::take_failures`].
    pub fn process_events(&mut self) -> Result<bool, DrawerError> {
        self.drain(false)
    }

    /// Wait for the next event, then drain the rest of the queue.
    pub async fn settle(&mut self) -> Result<bool, DrawerError> {
        let Some(event) = self.events.recv().await else {
            return Ok(false);
        };
        let wants_refresh = self.record(event);
        self.drain(wants_refresh)
    }

    pub fn take_failures(&mut self) -> Vec<ActionFailure> {
        std::mem::take(&mut self.failures)
    }

    /// Continuation feeding this drawer's event queue.
    pub fn continuation(&self) -> Continuation {
        self.dispatcher.continuation()
    }

    /// Mark the nodes the renderer should highlight as active.
    pub fn set_active<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.active = ids.into_iter().map(Into::into).collect();
        self.redraw();
    }

    pub fn active(&self) -> &HashSet<String> {
        &self.active
    }

    pub fn move_down(&mut self) -> bool {
        let len = self.tree.visible().len();
        if self.cursor + 1 >= len {
            return false;
        }
        self.cursor += 1;
        self.redraw();
        true
    }

    pub fn move_up(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.redraw();
        true
    }

    /// Put the cursor on the first visible node with `id`.
    pub fn select(&mut self, id: &str) -> bool {
        let position = self.tree.visible().iter().position(|row| row.node.id() == id);
        match position {
            Some(index) => {
                self.cursor = index;
                self.redraw();
                true
            }
            None => false,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current_node(&self) -> Option<&MaterializedNode> {
        self.tree.visible().get(self.cursor).map(|row| row.node)
    }

    pub fn tree(&self) -> &TreeModel {
        &self.tree
    }

    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn theme_mut(&mut self) -> &mut Theme {
        &mut self.theme
    }

    /// Redraw without rebuilding the forest.
    pub fn redraw(&mut self) {
        let rows = self.tree.visible();
        let lines: Vec<Line<'static>> = rows
            .iter()
            .map(|row| self.renderer.prepare(row, &self.theme, &self.active))
            .collect();
        let cursor = (!rows.is_empty()).then_some(self.cursor);
        self.surface.redraw(lines, cursor);
    }

    fn build_forest(&mut self) -> Vec<LayoutNode> {
        let mut forest = Vec::new();
        for (index, provider) in self.providers.iter().enumerate() {
            if index > 0 {
                forest.push(separator(self.ids.next_id(SEPARATOR_ID_PREFIX)));
            }
            forest.extend(provider.layout());
        }
        if self.help_enabled {
            forest.push(separator(self.ids.next_id(SEPARATOR_ID_PREFIX)));
            forest.push(help::help_section(self.ids.next_id(HELP_ID_PREFIX), &self.keymap));
        }
        forest
    }

    fn drain(&mut self, mut wants_refresh: bool) -> Result<bool, DrawerError> {
        while let Ok(event) = self.events.try_recv() {
            wants_refresh |= self.record(event);
        }
        if wants_refresh {
            self.refresh()?;
        }
        Ok(wants_refresh)
    }

    fn record(&mut self, event: DrawerEvent) -> bool {
        match event {
            DrawerEvent::Refresh => true,
            DrawerEvent::ActionFailed(failure) => {
                log::error!("action on '{}' failed: {}", failure.node_id, failure.message);
                self.failures.push(failure);
                false
            }
        }
    }

    fn change_current(
        &mut self,
        change: fn(&mut TreeModel, &str) -> Result<bool, DrawerError>,
    ) -> Result<bool, DrawerError> {
        let Some(id) = self.current_node().map(|node| node.id().to_string()) else {
            return Ok(false);
        };
        let changed = change(&mut self.tree, &id)?;
        if changed {
            self.restore_cursor(Some(&id));
            self.redraw();
        }
        Ok(changed)
    }

    fn restore_cursor(&mut self, id: Option<&str>) {
        let rows = self.tree.visible();
        if let Some(index) = id.and_then(|id| rows.iter().position(|row| row.node.id() == id)) {
            self.cursor = index;
            return;
        }
        self.cursor = self.cursor.min(rows.len().saturating_sub(1));
    }
}

fn separator(id: String) -> LayoutNode {
    LayoutNode::new(id, "").node_type(NodeType::Separator)
}
