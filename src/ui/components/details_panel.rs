//! Right-hand panel: the node under the cursor and recent log lines.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

use crate::tree::{ActionSlot, MaterializedNode};

pub struct DetailsPanel;

impl DetailsPanel {
    pub fn render(f: &mut Frame, area: Rect, node: Option<&MaterializedNode>, logs: &[String]) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(9), Constraint::Min(0)])
            .split(area);

        let details = Paragraph::new(node.map(describe).unwrap_or_default())
            .block(panel(" Node "))
            .wrap(Wrap { trim: false });
        f.render_widget(details, chunks[0]);

        let visible = chunks[1].height.saturating_sub(2) as usize;
        let log_lines: Vec<Line> = logs
            .iter()
            .take(visible)
            .map(|entry| Line::from(Span::styled(entry.clone(), Style::default().fg(Color::Gray))))
            .collect();
        let log_view = Paragraph::new(log_lines).block(panel(" Log ")).wrap(Wrap { trim: true });
        f.render_widget(log_view, chunks[1]);
    }
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title)
        .border_style(Style::default().fg(Color::DarkGray))
}

fn describe(node: &MaterializedNode) -> Vec<Line<'static>> {
    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let field = |name: &'static str, value: String| Line::from(vec![Span::styled(name, label), Span::raw(value)]);

    let actions: Vec<String> = ActionSlot::ALL
        .iter()
        .filter(|slot| node.action(**slot).is_some())
        .map(ToString::to_string)
        .collect();

    vec![
        field("name:     ", node.name().to_string()),
        field("id:       ", node.id().to_string()),
        field("type:     ", node.node_type().as_str().to_string()),
        field("schema:   ", node.schema().unwrap_or("-").to_string()),
        field("database: ", node.database().unwrap_or("-").to_string()),
        field("actions:  ", if actions.is_empty() { "-".to_string() } else { actions.join(", ") }),
        field("pick:     ", node.pick_title().unwrap_or("-").to_string()),
    ]
}
