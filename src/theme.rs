//! Node theming for the drawer
//!
//! A [`Theme`] maps node types to a [`Candy`]: the icon drawn in front of the
//! node name and an optional colour. Built-in tables exist for each
//! [`IconTheme`]; user overrides from configuration take precedence.
//!
//! Lookup keys are the node type names (`"table"`, `"history"`, ...) plus four
//! reserved keys: `none` and `none_dir` for untyped leaves and branches, and
//! `node_expanded` / `node_closed` for the disclosure glyph.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use ratatui::style::{Color, Style};
use serde::{Deserialize, Serialize};

use crate::tree::NodeType;
use crate::utils::color::parse_color;

pub const KEY_NONE: &str = "none";
pub const KEY_NONE_DIR: &str = "none_dir";
pub const KEY_NODE_EXPANDED: &str = "node_expanded";
pub const KEY_NODE_CLOSED: &str = "node_closed";

/// Icon theme variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconTheme {
    /// Emoji icons (colorful, modern look)
    Emoji,
    /// Unicode symbols (clean, native look)
    Unicode,
    /// ASCII characters (maximum compatibility)
    #[default]
    Ascii,
}

impl IconTheme {
    /// Next theme in the sequence: Ascii -> Unicode -> Emoji -> Ascii
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Ascii => Self::Unicode,
            Self::Unicode => Self::Emoji,
            Self::Emoji => Self::Ascii,
        }
    }
}

/// Icon and colour for one theme key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Candy {
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Candy {
    pub fn new(icon: impl Into<String>, color: Option<&str>) -> Self {
        Self {
            icon: icon.into(),
            color: color.map(str::to_string),
        }
    }

    #[must_use]
    pub fn style(&self) -> Style {
        match self.color.as_deref().map(parse_color) {
            Some(Color::Reset) | None => Style::default(),
            Some(color) => Style::default().fg(color),
        }
    }
}

type CandyTable = HashMap<&'static str, (&'static str, Option<&'static str>)>;

static ASCII: Lazy<CandyTable> = Lazy::new(|| {
    HashMap::from([
        (KEY_NONE, ("-", None)),
        (KEY_NONE_DIR, ("+", None)),
        (KEY_NODE_EXPANDED, ("v", None)),
        (KEY_NODE_CLOSED, (">", None)),
        ("connection", ("@", Some("cyan"))),
        ("schema", ("#", Some("blue"))),
        ("table", ("T", Some("green"))),
        ("view", ("V", Some("green"))),
        ("history", ("H", Some("yellow"))),
        ("call", ("*", Some("gray"))),
        ("scratch", ("~", Some("magenta"))),
        ("add", ("+", Some("green"))),
        ("edit", ("e", Some("yellow"))),
        ("remove", ("x", Some("red"))),
        ("help", ("?", Some("blue"))),
        ("separator", ("", None)),
    ])
});

static UNICODE: Lazy<CandyTable> = Lazy::new(|| {
    HashMap::from([
        (KEY_NONE, ("•", None)),
        (KEY_NONE_DIR, ("▪", None)),
        (KEY_NODE_EXPANDED, ("▾", None)),
        (KEY_NODE_CLOSED, ("▸", None)),
        ("connection", ("◉", Some("cyan"))),
        ("schema", ("◇", Some("blue"))),
        ("table", ("▦", Some("green"))),
        ("view", ("◫", Some("green"))),
        ("history", ("↺", Some("yellow"))),
        ("call", ("›", Some("gray"))),
        ("scratch", ("✎", Some("magenta"))),
        ("add", ("＋", Some("green"))),
        ("edit", ("✐", Some("yellow"))),
        ("remove", ("✕", Some("red"))),
        ("help", ("?", Some("blue"))),
        ("separator", ("", None)),
    ])
});

static EMOJI: Lazy<CandyTable> = Lazy::new(|| {
    HashMap::from([
        (KEY_NONE, ("📄", None)),
        (KEY_NONE_DIR, ("📁", None)),
        (KEY_NODE_EXPANDED, ("▾", None)),
        (KEY_NODE_CLOSED, ("▸", None)),
        ("connection", ("🔌", Some("cyan"))),
        ("schema", ("🗂️", Some("blue"))),
        ("table", ("📋", Some("green"))),
        ("view", ("👁️", Some("green"))),
        ("history", ("🕘", Some("yellow"))),
        ("call", ("▶️", Some("gray"))),
        ("scratch", ("📝", Some("magenta"))),
        ("add", ("➕", Some("green"))),
        ("edit", ("✏️", Some("yellow"))),
        ("remove", ("❌", Some("red"))),
        ("help", ("💡", Some("blue"))),
        ("separator", ("", None)),
    ])
});

/// Theme used by the renderer to decorate nodes.
#[derive(Debug, Clone, Default)]
pub struct Theme {
    icon_theme: IconTheme,
    overrides: HashMap<String, Candy>,
}

impl Theme {
    #[must_use]
    pub fn new(icon_theme: IconTheme) -> Self {
        Self {
            icon_theme,
            overrides: HashMap::new(),
        }
    }

    /// Replace built-in entries; keys not present keep their built-in value.
    #[must_use]
    pub fn with_overrides(mut self, overrides: HashMap<String, Candy>) -> Self {
        self.overrides = overrides;
        self
    }

    #[must_use]
    pub fn icon_theme(&self) -> IconTheme {
        self.icon_theme
    }

    pub fn set_icon_theme(&mut self, icon_theme: IconTheme) {
        self.icon_theme = icon_theme;
    }

    pub fn cycle_icon_theme(&mut self) {
        self.icon_theme = self.icon_theme.next();
    }

    /// Look up a single key, overrides first.
    #[must_use]
    pub fn candy(&self, key: &str) -> Option<Candy> {
        if let Some(candy) = self.overrides.get(key) {
            return Some(candy.clone());
        }
        let table = match self.icon_theme {
            IconTheme::Ascii => &ASCII,
            IconTheme::Unicode => &UNICODE,
            IconTheme::Emoji => &EMOJI,
        };
        table.get(key).map(|(icon, color)| Candy::new(*icon, *color))
    }

    /// Candy for a node, falling back to `none` / `none_dir` for untyped or
    /// unknown types.
    #[must_use]
    pub fn node_candy(&self, node_type: NodeType, is_branch: bool) -> Candy {
        let fallback = if is_branch { KEY_NONE_DIR } else { KEY_NONE };
        let key = match node_type {
            NodeType::None => fallback,
            other => other.as_str(),
        };
        self.candy(key)
            .or_else(|| self.candy(fallback))
            .unwrap_or_default()
    }

    /// Disclosure glyph for an expandable node.
    #[must_use]
    pub fn disclosure(&self, expanded: bool) -> Candy {
        let key = if expanded { KEY_NODE_EXPANDED } else { KEY_NODE_CLOSED };
        self.candy(key).unwrap_or_default()
    }
}
