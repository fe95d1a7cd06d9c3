//! Configuration management for termgrid using the prefer crate.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::grid::{default_grids, GridDefinition};

/// Default path of the fragment endpoint.
pub const DEFAULT_AJAX_PATH: &str = "/ajax";

/// Default thumbnail, served by the web server itself.
pub const DEFAULT_IMAGE_URL: &str = "/static/default-term.svg";

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Database filename.
    pub database_filename: String,
    /// Base URL prepended to term links.
    pub site_url: String,
    /// Image used for terms without a thumbnail.
    pub default_image_url: String,
    /// Path of the fragment endpoint.
    pub ajax_path: String,
    /// Configured grids.
    pub grids: Vec<GridDefinition>,
}

impl Default for Settings {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("termgrid");

        Self {
            data_dir,
            database_filename: "termgrid.db".to_string(),
            site_url: String::new(),
            default_image_url: DEFAULT_IMAGE_URL.to_string(),
            ajax_path: DEFAULT_AJAX_PATH.to_string(),
            grids: default_grids(),
        }
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            ..Default::default()
        }
    }

    /// Get the full path to the database.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_filename)
    }

    /// Ensure all directories exist.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.data_dir)
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Target directory for data.
    #[serde(default)]
    pub target: Option<String>,
    /// Database filename.
    #[serde(default)]
    pub database: Option<String>,
    /// Base URL for term links.
    #[serde(default)]
    pub site_url: Option<String>,
    /// Fallback thumbnail URL.
    #[serde(default)]
    pub default_image_url: Option<String>,
    /// Fragment endpoint path.
    #[serde(default)]
    pub ajax_path: Option<String>,
    /// Grid definitions. Replaces the built-in grids when present.
    #[serde(default)]
    pub grids: Option<Vec<GridDefinition>>,
}

impl Config {
    /// Load configuration using prefer crate.
    /// Automatically discovers termgrid config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("termgrid").await {
            Ok(pref_config) => Self::from_prefer(&pref_config),
            Err(_) => {
                // No config file found, use defaults
                Self::default()
            }
        }
    }

    /// Extract values from a loaded prefer config. Keys that are missing or
    /// fail to convert are left unset.
    pub fn from_prefer(pref_config: &prefer::Config) -> Self {
        let grids = match pref_config.get::<Option<Vec<GridDefinition>>>("grids") {
            Ok(grids) => grids,
            Err(prefer::Error::KeyNotFound(_)) => None,
            Err(e) => {
                tracing::warn!("Ignoring invalid grid definitions in config: {}", e);
                None
            }
        };

        Config {
            target: pref_config.get("target").ok(),
            database: pref_config.get("database").ok(),
            site_url: pref_config.get("site_url").ok(),
            default_image_url: pref_config.get("default_image_url").ok(),
            ajax_path: pref_config.get("ajax_path").ok(),
            grids,
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(ref target) = self.target {
            let path = shellexpand::tilde(target);
            settings.data_dir = PathBuf::from(path.as_ref());
        }
        if let Some(ref database) = self.database {
            settings.database_filename = database.clone();
        }
        if let Some(ref site_url) = self.site_url {
            settings.site_url = site_url.trim_end_matches('/').to_string();
        }
        if let Some(ref url) = self.default_image_url {
            settings.default_image_url = url.clone();
        }
        if let Some(ref path) = self.ajax_path {
            settings.ajax_path = normalize_path(path);
        }
        if let Some(ref grids) = self.grids {
            if grids.is_empty() {
                tracing::warn!("Config defines an empty grid list; keeping built-in grids");
            } else {
                settings.grids = grids.clone();
            }
        }
    }
}

/// Ensure a route path starts with a single slash.
fn normalize_path(path: &str) -> String {
    format!("/{}", path.trim().trim_start_matches('/'))
}

/// Load settings from configuration (async version).
pub async fn load_settings() -> Settings {
    let config = Config::load().await;
    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings);
    settings
}
