//! Drawer pane: the host surface the drawer draws into.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, BorderType, Borders, List, ListItem, ListState},
    Frame,
};

use crate::constants::DRAWER_TITLE;
use crate::drawer::DrawerSurface;

/// Holds the lines last prepared by the drawer and tracks whether the pane
/// has ever been created.
#[derive(Debug, Default)]
pub struct DrawerView {
    lines: Vec<Line<'static>>,
    cursor: Option<usize>,
    open: bool,
    created: bool,
    redraws: usize,
}

impl DrawerView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[Line<'static>] {
        &self.lines
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Number of redraws received so far
    pub fn redraw_count(&self) -> usize {
        self.redraws
    }

    /// Render the pane into `area`
    pub fn render(&self, f: &mut Frame, area: Rect, focused: bool) {
        let border_color = if focused { Color::Cyan } else { Color::DarkGray };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(format!(" {} ", DRAWER_TITLE))
            .border_style(Style::default().fg(border_color));

        let items: Vec<ListItem> = self.lines.iter().cloned().map(ListItem::new).collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

        let mut state = ListState::default();
        state.select(self.cursor);
        f.render_stateful_widget(list, area, &mut state);
    }
}

impl DrawerSurface for DrawerView {
    fn open(&mut self) -> bool {
        self.open = true;
        if self.created {
            return false;
        }
        self.created = true;
        true
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn redraw(&mut self, lines: Vec<Line<'static>>, cursor: Option<usize>) {
        self.lines = lines;
        self.cursor = cursor;
        self.redraws += 1;
    }
}
