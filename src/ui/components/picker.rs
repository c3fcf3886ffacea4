//! Selection prompt dialog.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Clear, List, ListItem, ListState},
    Frame,
};

use super::common::{create_dialog_block, create_instructions_paragraph, shortcuts};
use crate::drawer::{OnChoice, SelectionPrompt};
use crate::ui::layout::LayoutManager;

struct PickerState {
    anchor: String,
    title: String,
    items: Vec<String>,
    selected: usize,
    on_choice: OnChoice,
}

/// Modal list implementing [`SelectionPrompt`]. Enter picks the highlighted
/// item; Esc dismisses without calling back.
#[derive(Default)]
pub struct PickerDialog {
    state: Option<PickerState>,
}

impl PickerDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    /// Node id the open prompt belongs to
    pub fn anchor(&self) -> Option<&str> {
        self.state.as_ref().map(|state| state.anchor.as_str())
    }

    pub fn items(&self) -> &[String] {
        self.state.as_ref().map(|state| state.items.as_slice()).unwrap_or(&[])
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.as_ref().map(|state| state.selected)
    }

    pub fn select_next(&mut self) {
        if let Some(state) = &mut self.state {
            if !state.items.is_empty() {
                state.selected = (state.selected + 1) % state.items.len();
            }
        }
    }

    pub fn select_previous(&mut self) {
        if let Some(state) = &mut self.state {
            if !state.items.is_empty() {
                state.selected = state.selected.checked_sub(1).unwrap_or(state.items.len() - 1);
            }
        }
    }

    /// Close the prompt and hand the highlighted item to the callback.
    /// Returns the chosen item.
    pub fn choose(&mut self) -> Option<String> {
        let state = self.state.take()?;
        let choice = state.items.get(state.selected).cloned()?;
        log::debug!("picked '{}' for '{}'", choice, state.anchor);
        (state.on_choice)(choice.clone());
        Some(choice)
    }

    /// Close the prompt without calling back.
    pub fn dismiss(&mut self) {
        if let Some(state) = self.state.take() {
            log::debug!("prompt for '{}' dismissed", state.anchor);
        }
    }

    /// Handle a key while open. Returns whether the key was consumed.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if !self.is_open() {
            return false;
        }
        match key.code {
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => self.select_next(),
            KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => self.select_previous(),
            KeyCode::Enter => {
                self.choose();
            }
            KeyCode::Esc | KeyCode::Char('q') => self.dismiss(),
            _ => {}
        }
        true
    }

    /// Render the dialog if open
    pub fn render(&self, f: &mut Frame) {
        let Some(state) = &self.state else {
            return;
        };
        let height = (state.items.len() as u16).saturating_add(4).min(f.area().height);
        let area = LayoutManager::centered_rect_lines(50, height, f.area());
        f.render_widget(Clear, area);

        let title = format!(" {} ", state.title);
        let block = create_dialog_block(&title, Color::Cyan);
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        let items: Vec<ListItem> = state.items.iter().map(|item| ListItem::new(item.as_str())).collect();
        let list = List::new(items)
            .style(Style::default().fg(Color::White))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD));
        let mut list_state = ListState::default();
        list_state.select(Some(state.selected));
        f.render_stateful_widget(list, chunks[0], &mut list_state);

        let instructions = create_instructions_paragraph(&[
            shortcuts::ENTER_CHOOSE,
            shortcuts::SEPARATOR,
            shortcuts::ESC_CANCEL,
        ]);
        f.render_widget(instructions, chunks[1]);
    }
}

impl SelectionPrompt for PickerDialog {
    fn open(&mut self, anchor: &str, items: Vec<String>, title: &str, on_choice: OnChoice) {
        if items.is_empty() {
            log::warn!("nothing to pick for '{}'", anchor);
            return;
        }
        if let Some(previous) = self.state.take() {
            log::debug!("prompt for '{}' replaced", previous.anchor);
        }
        self.state = Some(PickerState {
            anchor: anchor.to_string(),
            title: title.to_string(),
            items,
            selected: 0,
            on_choice,
        });
    }
}
