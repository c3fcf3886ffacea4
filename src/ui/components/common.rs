use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

/// Rounded dialog frame in the given accent colour
pub fn create_dialog_block<'a>(title: &'a str, theme_color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title)
        .title_style(Style::default().fg(theme_color).add_modifier(Modifier::BOLD))
        .border_style(Style::default().fg(theme_color))
}

/// Shortcut hint: (key, colour, description)
pub type InstructionShortcut = (&'static str, Color, &'static str);

/// One centred line of colour-coded shortcut hints
pub fn create_instructions_paragraph<'a>(instructions: &[InstructionShortcut]) -> Paragraph<'a> {
    let spans: Vec<Span> = instructions
        .iter()
        .flat_map(|(key, color, desc)| {
            [
                Span::styled(*key, Style::default().fg(*color).add_modifier(Modifier::BOLD)),
                Span::styled(*desc, Style::default().fg(Color::Gray)),
            ]
        })
        .collect();

    Paragraph::new(Line::from(spans)).alignment(Alignment::Center)
}

pub mod shortcuts {
    use super::*;

    pub const SEPARATOR: InstructionShortcut = (" • ", Color::Gray, "");
    pub const ENTER_CHOOSE: InstructionShortcut = ("Enter", Color::Green, " Choose");
    pub const ESC_CANCEL: InstructionShortcut = ("Esc", Color::Red, " Cancel");
}
