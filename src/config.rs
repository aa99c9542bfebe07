//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/docsect/docsect.toml`
//! 3. Local config: `<project_dir>/.docsect.toml`
//! 4. Environment variables: `DOCSECT_*` prefix (`__` separates nested keys)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::application::document::DEFAULT_AUTHOR;
use crate::domain::Formatting;

/// Unified configuration for docsect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Revision author (default: $USER, $USERNAME or "docsect")
    pub author: String,
    /// Record edits as tracked changes by default
    pub track_changes: bool,
    /// Run formatting for inserted paragraphs
    pub formatting: Formatting,
}

impl Default for Settings {
    fn default() -> Self {
        let author = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| DEFAULT_AUTHOR.into());

        Self {
            author,
            track_changes: false,
            formatting: Formatting::default(),
        }
    }
}

/// Get the XDG config directory for docsect.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "docsect").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("docsect.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".docsect.toml")
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional directory holding a local `.docsect.toml`
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("author", defaults.author.clone())
            .map_err(config_err)?
            .set_default("track_changes", defaults.track_changes)
            .map_err(config_err)?;

        if let Some(global_path) = global_config_path() {
            debug!("load: global config {}", global_path.display());
            builder = builder.add_source(File::from(global_path).required(false));
        }
        if let Some(dir) = project_dir {
            let local_path = local_config_path(dir);
            debug!("load: local config {}", local_path.display());
            builder = builder.add_source(File::from(local_path).required(false));
        }
        builder = builder.add_source(
            Environment::with_prefix("DOCSECT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;
        config.try_deserialize().map_err(config_err)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# docsect configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/docsect/docsect.toml
#   Local:  <project_dir>/.docsect.toml
#   Env:    DOCSECT_* environment variables, e.g. DOCSECT_TRACK_CHANGES=true,
#           DOCSECT_FORMATTING__BOLD=true

# Author recorded on tracked changes
# author = "jane"

# Record insertions and deletions as tracked changes
# track_changes = false

[formatting]
# Run formatting applied to inserted paragraphs
# bold = false
# italic = false
# underline = false
# strike = false
# size = 11.0            # points
# font_family = "Calibri"
# color = "1F3864"       # hex RGB
# highlight = "yellow"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_template_when_parsed_then_yields_defaults() {
        let parsed: Settings = toml::from_str(&Settings::template()).expect("parse template");
        assert!(!parsed.track_changes);
        assert!(parsed.formatting.is_plain());
    }

    #[test]
    fn given_settings_when_serialized_then_round_trips() {
        let settings = Settings {
            author: "reviewer".into(),
            track_changes: true,
            formatting: Formatting {
                italic: true,
                size: Some(12.0),
                ..Formatting::default()
            },
        };
        let toml = settings.to_toml().expect("serialize");
        let back: Settings = toml::from_str(&toml).expect("parse");
        assert_eq!(back, settings);
    }
}
