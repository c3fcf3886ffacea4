//! Status bar component

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

pub struct StatusBar;

impl StatusBar {
    /// Render `status`, or the key hints when it is empty
    pub fn render(f: &mut Frame, area: Rect, status: &str, has_error: bool) {
        let text = if status.is_empty() {
            "j/k: move • Tab: drawer • i: icons • q: quit"
        } else {
            status
        };
        let color = if has_error { Color::Red } else { Color::Gray };
        let bar = Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(color));
        f.render_widget(bar, area);
    }
}
