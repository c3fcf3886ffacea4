//! Configuration management for the drawer
//!
//! This module handles loading, parsing, and validation of configuration files.

use crate::constants::{CONFIG_GENERATED, DRAWER_DEFAULT_WIDTH, DRAWER_MAX_WIDTH, DRAWER_MIN_WIDTH};
use crate::drawer::keymap::{DrawerCommand, KeyBinding, KeyMap, KeyParseError};
use crate::theme::{Candy, IconTheme, Theme};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub drawer: DrawerConfig,
    /// Action name -> key binding. Entries override the defaults; an empty
    /// key unbinds the action.
    pub keymap: BTreeMap<String, KeyBinding>,
    /// Node type (or reserved key) -> icon and colour override
    pub theme: HashMap<String, Candy>,
    pub logging: LoggingConfig,
    pub sources: SourcesConfig,
}

/// Drawer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawerConfig {
    /// Show the generated key binding help section
    pub help_enabled: bool,
    /// Drawer width in columns
    pub width: u16,
    /// Built-in icon set: "ascii", "unicode" or "emoji"
    pub icon_theme: IconTheme,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write logs to a file in the data directory
    pub enabled: bool,
    /// Level filter: "error", "warn", "info", "debug" or "trace"
    pub level: String,
}

/// Where connection definitions come from
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SourcesConfig {
    /// JSON file with connection definitions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connections_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            drawer: DrawerConfig::default(),
            keymap: KeyMap::default_bindings()
                .into_iter()
                .map(|(command, binding)| (command.name().to_string(), binding))
                .collect(),
            theme: HashMap::new(),
            logging: LoggingConfig::default(),
            sources: SourcesConfig::default(),
        }
    }
}

impl Default for DrawerConfig {
    fn default() -> Self {
        Self {
            help_enabled: true,
            width: DRAWER_DEFAULT_WIDTH,
            icon_theme: IconTheme::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Parsed level filter
    pub fn level_filter(&self) -> Result<log::LevelFilter> {
        log::LevelFilter::from_str(&self.level).with_context(|| format!("Invalid log level '{}'", self.level))
    }
}

impl Config {
    /// Load configuration from file or return defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::find_config_file()?;

        if let Some(path) = config_path {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in order of precedence
    fn find_config_file() -> Result<Option<PathBuf>> {
        // 1. Check current directory
        let current_dir_config = PathBuf::from("dbdrawer.toml");
        if current_dir_config.exists() {
            return Ok(Some(current_dir_config));
        }

        // 2. Check XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("dbdrawer").join("config.toml");
            if xdg_config.exists() {
                return Ok(Some(xdg_config));
            }
        }

        Ok(None)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.drawer.width < DRAWER_MIN_WIDTH || self.drawer.width > DRAWER_MAX_WIDTH {
            anyhow::bail!(
                "drawer width must be between {} and {} columns, got {}",
                DRAWER_MIN_WIDTH,
                DRAWER_MAX_WIDTH,
                self.drawer.width
            );
        }

        self.logging.level_filter()?;
        self.key_map().context("Invalid [keymap] section")?;

        Ok(())
    }

    /// Default bindings overlaid with the configured ones.
    pub fn key_bindings(&self) -> Result<Vec<(DrawerCommand, KeyBinding)>, KeyParseError> {
        let mut bindings: BTreeMap<DrawerCommand, KeyBinding> = KeyMap::default_bindings().into_iter().collect();
        for (name, binding) in &self.keymap {
            let command = DrawerCommand::from_name(name).ok_or_else(|| KeyParseError::UnknownCommand(name.clone()))?;
            bindings.insert(command, binding.clone());
        }
        Ok(bindings.into_iter().collect())
    }

    /// Resolved key map.
    pub fn key_map(&self) -> Result<KeyMap, KeyParseError> {
        KeyMap::new(self.key_bindings()?)
    }

    /// Theme with the configured icon set and overrides.
    pub fn theme(&self) -> Theme {
        Theme::new(self.drawer.icon_theme).with_overrides(self.theme.clone())
    }

    /// Generate default configuration file
    pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let config = Self::default();
        let toml_content = toml::to_string_pretty(&config).context("Failed to serialize default config")?;

        // Add header comment
        let header = format!(
            "# dbdrawer Configuration File\n# Generated on {}\n\n",
            chrono::Local::now().format("%Y-%m-%d")
        );

        let full_content = header + &toml_content;

        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        std::fs::write(&path, full_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        println!("{}: {}", CONFIG_GENERATED, path.as_ref().display());
        Ok(())
    }

    /// Get the XDG config directory path
    pub fn get_xdg_config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
            .map(|dir| dir.join("dbdrawer"))
    }

    /// Get the default config file path
    pub fn get_default_config_path() -> Result<PathBuf> {
        Ok(Self::get_xdg_config_dir()?.join("config.toml"))
    }

    /// Directory for logs and other runtime data
    pub fn get_data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
            .map(|dir| dir.join("dbdrawer"))
    }
}
