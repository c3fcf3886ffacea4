//! Line composition for drawer rows.

use std::collections::HashSet;

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::drawer::Renderer;
use crate::theme::Theme;
use crate::tree::{NodeType, NodeView};

const INDENT: &str = "  ";

/// Renders rows as `<indent><disclosure> <icon> <name>`.
///
/// Leaves get blank space where the disclosure glyph would be so names line
/// up. Active nodes are drawn bold and underlined.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThemedRenderer;

impl Renderer for ThemedRenderer {
    fn prepare(&self, row: &NodeView<'_>, theme: &Theme, active: &HashSet<String>) -> Line<'static> {
        let node = row.node;
        if node.node_type() == NodeType::Separator {
            return Line::default();
        }

        let mut spans = vec![Span::raw(INDENT.repeat(row.depth))];
        if node.is_expandable() {
            let disclosure = theme.disclosure(node.is_expanded());
            spans.push(Span::styled(format!("{} ", disclosure.icon), disclosure.style()));
        } else {
            spans.push(Span::raw(INDENT));
        }

        let candy = theme.node_candy(node.node_type(), node.is_expandable());
        if !candy.icon.is_empty() {
            spans.push(Span::styled(format!("{} ", candy.icon), candy.style()));
        }

        let mut name_style = Style::default();
        if active.contains(node.id()) {
            name_style = name_style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        }
        spans.push(Span::styled(node.name().to_string(), name_style));

        Line::from(spans)
    }
}
