//! Key bindings for drawer commands.
//!
//! Bindings are written as key specifications such as `"o"`, `"dd"`,
//! `"enter"`, `"ctrl+r"` or vim-style `"<CR>"`. Plain words that are not
//! named keys are read as a sequence of characters, so `"cw"` means `c` then
//! `w`. Unbound commands (empty key) are simply not wired.

use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};

use crate::tree::ActionSlot;

/// Commands the drawer can execute in response to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DrawerCommand {
    Refresh,
    Action(ActionSlot),
    Expand,
    Collapse,
    Toggle,
}

impl DrawerCommand {
    pub const ALL: [DrawerCommand; 7] = [
        DrawerCommand::Refresh,
        DrawerCommand::Action(ActionSlot::First),
        DrawerCommand::Action(ActionSlot::Second),
        DrawerCommand::Action(ActionSlot::Third),
        DrawerCommand::Expand,
        DrawerCommand::Collapse,
        DrawerCommand::Toggle,
    ];

    /// Configuration name of the command, e.g. `"action_2"`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Refresh => "refresh",
            Self::Action(ActionSlot::First) => "action_1",
            Self::Action(ActionSlot::Second) => "action_2",
            Self::Action(ActionSlot::Third) => "action_3",
            Self::Expand => "expand",
            Self::Collapse => "collapse",
            Self::Toggle => "toggle",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.name() == name)
    }
}

impl fmt::Display for DrawerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Host interaction mode a binding applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum KeyMode {
    #[default]
    #[serde(rename = "n", alias = "normal")]
    Normal,
    #[serde(rename = "v", alias = "visual")]
    Visual,
}

impl fmt::Display for KeyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => f.write_str("n"),
            Self::Visual => f.write_str("v"),
        }
    }
}

/// A key specification as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    pub key: String,
    #[serde(default)]
    pub mode: KeyMode,
}

impl KeyBinding {
    pub fn new(key: impl Into<String>, mode: KeyMode) -> Self {
        Self { key: key.into(), mode }
    }

    pub fn normal(key: impl Into<String>) -> Self {
        Self::new(key, KeyMode::Normal)
    }

    pub fn is_unbound(&self) -> bool {
        self.key.trim().is_empty()
    }
}

/// A single key press, normalized so that it compares equal to the
/// corresponding crossterm event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyStroke {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyStroke {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }.normalized()
    }

    pub fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    pub fn from_event(event: &KeyEvent) -> Self {
        Self::new(event.code, event.modifiers)
    }

    // Shift is already encoded in the character itself.
    fn normalized(mut self) -> Self {
        if let KeyCode::Char(c) = self.code {
            if self.modifiers.contains(KeyModifiers::SHIFT) {
                self.code = KeyCode::Char(c.to_ascii_uppercase());
                self.modifiers.remove(KeyModifiers::SHIFT);
            }
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyParseError {
    #[error("Key specification is empty")]
    Empty,

    #[error("Unknown key '{0}'")]
    UnknownKey(String),

    #[error("Unknown drawer action '{0}'")]
    UnknownCommand(String),

    #[error("'{first}' and '{second}' are both bound to '{key}' in mode '{mode}'")]
    Conflict {
        first: DrawerCommand,
        second: DrawerCommand,
        key: String,
        mode: KeyMode,
    },
}

/// Parse a key specification into the strokes that trigger it.
pub fn parse_key_sequence(spec: &str) -> Result<Vec<KeyStroke>, KeyParseError> {
    let mut strokes = Vec::new();
    for token in spec.split_whitespace() {
        strokes.extend(parse_token(token)?);
    }
    if strokes.is_empty() {
        return Err(KeyParseError::Empty);
    }
    Ok(strokes)
}

fn parse_token(token: &str) -> Result<Vec<KeyStroke>, KeyParseError> {
    if let Some(inner) = token.strip_prefix('<').and_then(|rest| rest.strip_suffix('>')) {
        return parse_bracketed(inner).map(|stroke| vec![stroke]);
    }
    if token.len() > 1 && token.contains('+') {
        return parse_chord(token).map(|stroke| vec![stroke]);
    }
    if let Some(code) = named_key(&token.to_ascii_lowercase()) {
        return Ok(vec![KeyStroke::new(code, KeyModifiers::NONE)]);
    }
    Ok(token.chars().map(KeyStroke::char).collect())
}

fn parse_chord(token: &str) -> Result<KeyStroke, KeyParseError> {
    let mut parts: Vec<&str> = token.split('+').collect();
    let key = parts.pop().unwrap_or_default();
    let mut modifiers = KeyModifiers::NONE;
    for part in parts {
        modifiers |= match part.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => KeyModifiers::CONTROL,
            "alt" | "meta" => KeyModifiers::ALT,
            "shift" => KeyModifiers::SHIFT,
            _ => return Err(KeyParseError::UnknownKey(token.to_string())),
        };
    }
    single_key(key, modifiers).ok_or_else(|| KeyParseError::UnknownKey(token.to_string()))
}

fn parse_bracketed(inner: &str) -> Result<KeyStroke, KeyParseError> {
    let lower = inner.to_ascii_lowercase();
    let special = match lower.as_str() {
        "cr" | "return" => Some(KeyCode::Enter),
        "bs" => Some(KeyCode::Backspace),
        "del" => Some(KeyCode::Delete),
        other => named_key(other),
    };
    if let Some(code) = special {
        return Ok(KeyStroke::new(code, KeyModifiers::NONE));
    }

    if let Some((prefix, key)) = inner.split_once('-') {
        let modifiers = match prefix.to_ascii_lowercase().as_str() {
            "c" => KeyModifiers::CONTROL,
            "a" | "m" => KeyModifiers::ALT,
            "s" => KeyModifiers::SHIFT,
            _ => return Err(KeyParseError::UnknownKey(format!("<{}>", inner))),
        };
        let key = if modifiers == KeyModifiers::CONTROL { key.to_ascii_lowercase() } else { key.to_string() };
        if let Some(stroke) = single_key(&key, modifiers) {
            return Ok(stroke);
        }
    }
    Err(KeyParseError::UnknownKey(format!("<{}>", inner)))
}

fn single_key(key: &str, modifiers: KeyModifiers) -> Option<KeyStroke> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeyStroke::new(KeyCode::Char(c), modifiers)),
        _ => named_key(&key.to_ascii_lowercase()).map(|code| KeyStroke::new(code, modifiers)),
    }
}

fn named_key(name: &str) -> Option<KeyCode> {
    let code = match name {
        "enter" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "space" => KeyCode::Char(' '),
        "backspace" => KeyCode::Backspace,
        "delete" => KeyCode::Delete,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        _ => {
            let number = name.strip_prefix('f')?.parse::<u8>().ok()?;
            if (1..=12).contains(&number) {
                KeyCode::F(number)
            } else {
                return None;
            }
        }
    };
    Some(code)
}

#[derive(Debug, Clone)]
struct Binding {
    command: DrawerCommand,
    spec: KeyBinding,
    strokes: Vec<KeyStroke>,
}

/// Resolved key map with a buffer for multi-key sequences.
#[derive(Debug, Clone)]
pub struct KeyMap {
    bindings: Vec<Binding>,
    pending: Vec<KeyStroke>,
    pending_mode: KeyMode,
}

impl KeyMap {
    /// Build a key map, skipping unbound commands and rejecting bindings that
    /// share a key sequence within one mode.
    pub fn new(bindings: impl IntoIterator<Item = (DrawerCommand, KeyBinding)>) -> Result<Self, KeyParseError> {
        let mut resolved: Vec<Binding> = Vec::new();
        for (command, spec) in bindings {
            if spec.is_unbound() {
                continue;
            }
            let strokes = parse_key_sequence(&spec.key)?;
            if let Some(existing) = resolved
                .iter()
                .find(|binding| binding.spec.mode == spec.mode && binding.strokes == strokes)
            {
                return Err(KeyParseError::Conflict {
                    first: existing.command,
                    second: command,
                    key: spec.key.clone(),
                    mode: spec.mode,
                });
            }
            resolved.push(Binding { command, spec, strokes });
        }
        Ok(Self {
            bindings: resolved,
            pending: Vec::new(),
            pending_mode: KeyMode::Normal,
        })
    }

    pub fn empty() -> Self {
        Self {
            bindings: Vec::new(),
            pending: Vec::new(),
            pending_mode: KeyMode::Normal,
        }
    }

    pub fn default_bindings() -> Vec<(DrawerCommand, KeyBinding)> {
        vec![
            (DrawerCommand::Refresh, KeyBinding::normal("r")),
            (DrawerCommand::Action(ActionSlot::First), KeyBinding::normal("enter")),
            (DrawerCommand::Action(ActionSlot::Second), KeyBinding::normal("cw")),
            (DrawerCommand::Action(ActionSlot::Third), KeyBinding::normal("dd")),
            (DrawerCommand::Collapse, KeyBinding::normal("c")),
            (DrawerCommand::Expand, KeyBinding::normal("e")),
            (DrawerCommand::Toggle, KeyBinding::normal("o")),
        ]
    }

    pub fn bindings(&self) -> impl Iterator<Item = (DrawerCommand, &KeyBinding)> {
        self.bindings.iter().map(|binding| (binding.command, &binding.spec))
    }

    pub fn binding(&self, command: DrawerCommand) -> Option<&KeyBinding> {
        self.bindings
            .iter()
            .find(|binding| binding.command == command)
            .map(|binding| &binding.spec)
    }

    /// Whether a partial sequence is waiting for more keys.
    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Feed one stroke and return the commands it completes.
    ///
    /// A sequence that is both complete and the prefix of a longer binding
    /// stays pending until the next stroke or [`KeyMap::expire`]. When a
    /// stroke cannot extend the pending sequence, the longest complete prefix
    /// fires and the strokes after it are replayed one at a time. Without a
    /// complete prefix the first stroke is dropped instead.
    pub fn feed(&mut self, mode: KeyMode, stroke: KeyStroke) -> Vec<DrawerCommand> {
        if self.pending_mode != mode {
            self.pending.clear();
            self.pending_mode = mode;
        }
        self.pending.push(stroke);

        let extends = self.bindings.iter().any(|binding| {
            binding.spec.mode == mode
                && binding.strokes.len() > self.pending.len()
                && binding.strokes.starts_with(&self.pending)
        });
        if extends {
            return Vec::new();
        }

        if let Some(command) = self.lookup(mode, &self.pending) {
            self.pending.clear();
            return vec![command];
        }

        let stalled = std::mem::take(&mut self.pending);
        let mut fired = Vec::new();
        let prefix = (1..stalled.len())
            .rev()
            .find_map(|len| self.lookup(mode, &stalled[..len]).map(|command| (len, command)));
        let consumed = match prefix {
            Some((len, command)) => {
                fired.push(command);
                len
            }
            None => 1,
        };
        for &replayed in &stalled[consumed..] {
            fired.extend(self.feed(mode, replayed));
        }
        fired
    }

    /// Resolve a pending sequence after the host's key timeout.
    pub fn expire(&mut self) -> Option<DrawerCommand> {
        let pending = std::mem::take(&mut self.pending);
        self.lookup(self.pending_mode, &pending)
    }

    fn lookup(&self, mode: KeyMode, strokes: &[KeyStroke]) -> Option<DrawerCommand> {
        self.bindings
            .iter()
            .find(|binding| binding.spec.mode == mode && binding.strokes == strokes)
            .map(|binding| binding.command)
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::new(Self::default_bindings()).unwrap_or_else(|err| {
            log::error!("default key map is invalid: {}", err);
            Self::empty()
        })
    }
}
