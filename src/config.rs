//! Configuration for the Carch tools
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (carch.toml)
//! - Environment variables (CARCH__*)
//!
//! ## Example config file (carch.toml):
//! ```toml
//! [lint]
//! strict = false
//! max_struct_fields = 50
//! max_variant_alternatives = 20
//! max_enum_values = 100
//! max_nesting_depth = 4
//!
//! [format]
//! style = "auto"
//! indent = 4
//! max_width = 80
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CarchError, Result};

/// Main configuration for the Carch tools
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CarchConfig {
    /// Lint settings
    #[serde(default)]
    pub lint: LintConfig,

    /// Formatter settings
    #[serde(default)]
    pub format: FormatConfig,
}

/// Lint thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintConfig {
    /// Report warnings as errors
    #[serde(default)]
    pub strict: bool,

    #[serde(default = "default_max_struct_fields")]
    pub max_struct_fields: usize,

    #[serde(default = "default_max_variant_alternatives")]
    pub max_variant_alternatives: usize,

    #[serde(default = "default_max_enum_values")]
    pub max_enum_values: usize,

    /// Deepest allowed inline nesting of bodies and containers
    #[serde(default = "default_max_nesting_depth")]
    pub max_nesting_depth: usize,
}

/// Formatter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatConfig {
    #[serde(default)]
    pub style: FormatStyle,

    /// Spaces per indentation level in expanded layout
    #[serde(default = "default_indent")]
    pub indent: usize,

    /// Widest compact line `auto` keeps on one line
    #[serde(default = "default_max_width")]
    pub max_width: usize,
}

/// Layout used when rendering definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FormatStyle {
    /// One definition per line
    Compact,
    /// One member per line with trailing commas
    Expanded,
    /// Compact when it fits in `max_width`
    #[default]
    Auto,
}

impl std::str::FromStr for FormatStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "compact" => Ok(FormatStyle::Compact),
            "expanded" => Ok(FormatStyle::Expanded),
            "auto" => Ok(FormatStyle::Auto),
            other => Err(format!("unknown format style '{}' (expected compact, expanded or auto)", other)),
        }
    }
}

// Default value functions
fn default_max_struct_fields() -> usize {
    50
}

fn default_max_variant_alternatives() -> usize {
    20
}

fn default_max_enum_values() -> usize {
    100
}

fn default_max_nesting_depth() -> usize {
    4
}

fn default_indent() -> usize {
    4
}

fn default_max_width() -> usize {
    80
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            strict: false,
            max_struct_fields: default_max_struct_fields(),
            max_variant_alternatives: default_max_variant_alternatives(),
            max_enum_values: default_max_enum_values(),
            max_nesting_depth: default_max_nesting_depth(),
        }
    }
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            style: FormatStyle::Auto,
            indent: default_indent(),
            max_width: default_max_width(),
        }
    }
}

impl CarchConfig {
    /// Load configuration from default locations
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding `config_path` (which must exist) on top of
    /// the default locations
    pub fn load_from(config_path: Option<&Path>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder();

        for location in ["carch.toml", ".carch.toml", "config/carch.toml"] {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(dirs) = directories::ProjectDirs::from("dev", "carch", "carch") {
            let xdg_config = dirs.config_dir().join("carch.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        // CARCH__LINT__STRICT=true, CARCH__FORMAT__STYLE=compact, ...
        builder = builder.add_source(
            Environment::with_prefix("CARCH")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| CarchError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
