//! Error dialog component

use ratatui::{
    layout::Alignment,
    style::{Color, Style},
    widgets::{Clear, Paragraph, Wrap},
    Frame,
};

use super::common::create_dialog_block;
use crate::constants::DIALOG_TITLE_ERROR;
use crate::ui::layout::LayoutManager;

pub struct ErrorDialog;

impl ErrorDialog {
    /// Render `message` in a centred modal
    pub fn render(f: &mut Frame, message: &str) {
        let area = LayoutManager::centered_rect(60, 20, f.area());
        f.render_widget(Clear, area);
        let title = format!(" {} ", DIALOG_TITLE_ERROR);
        let paragraph = Paragraph::new(message)
            .block(create_dialog_block(&title, Color::Red))
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }
}
