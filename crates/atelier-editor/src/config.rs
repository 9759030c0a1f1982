//! Layered editor configuration
//!
//! Config is loaded with four layers of precedence (highest wins):
//! 1. Environment variables: `ATELIER_MIN_WRITE_INTERVAL_MS`, `ATELIER_QUICK_INTERACTION_MS`
//! 2. Project-local: `.atelier/config.toml`
//! 3. Global: `~/.atelier/config.toml`
//! 4. Built-in defaults

use crate::transform_editor::TransformEditorConfig;
use atelier_core::{AtelierError, Result};
use atelier_scene::IdentityPolicy;
use atelier_sync::SyncConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_MIN_WRITE_INTERVAL: &str = "ATELIER_MIN_WRITE_INTERVAL_MS";
pub const ENV_QUICK_INTERACTION: &str = "ATELIER_QUICK_INTERACTION_MS";

/// `[editor]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorSection {
    #[serde(default = "default_quick_interaction_ms")]
    pub quick_interaction_window_ms: u64,
    #[serde(default = "default_min_write_interval_ms")]
    pub min_write_interval_ms: u64,
    #[serde(default = "default_true")]
    pub flush_on_release: bool,
}

impl Default for EditorSection {
    fn default() -> Self {
        Self {
            quick_interaction_window_ms: default_quick_interaction_ms(),
            min_write_interval_ms: default_min_write_interval_ms(),
            flush_on_release: true,
        }
    }
}

fn default_quick_interaction_ms() -> u64 {
    500
}
fn default_min_write_interval_ms() -> u64 {
    50
}
fn default_true() -> bool {
    true
}

/// `[sync]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSection {
    #[serde(default = "default_true")]
    pub skip_initial_pass: bool,
    #[serde(default)]
    pub identity_policy: IdentityPolicy,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            skip_initial_pass: true,
            identity_policy: IdentityPolicy::default(),
        }
    }
}

/// One config file as written on disk. Absent keys leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigLayer {
    #[serde(default)]
    editor: EditorLayer,
    #[serde(default)]
    sync: SyncLayer,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct EditorLayer {
    quick_interaction_window_ms: Option<u64>,
    min_write_interval_ms: Option<u64>,
    flush_on_release: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SyncLayer {
    skip_initial_pass: Option<bool>,
    identity_policy: Option<IdentityPolicy>,
}

/// Resolved editor configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default)]
    pub editor: EditorSection,
    #[serde(default)]
    pub sync: SyncSection,
}

impl EditorConfig {
    /// Load config with layered precedence: defaults < global < project < env vars
    pub fn load() -> Result<Self> {
        let mut config = EditorConfig::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                config.merge(Self::load_layer(&global_path)?);
            }
        }

        let local_path = PathBuf::from(".atelier/config.toml");
        if local_path.exists() {
            config.merge(Self::load_layer(&local_path)?);
        }

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load config from a specific file path only, plus env overrides
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = EditorConfig::default();
        config.merge(Self::load_layer(path)?);
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a config document over the defaults, without env overrides
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config = EditorConfig::default();
        config.merge(toml::from_str(content)?);
        Ok(config)
    }

    pub fn transform_editor_config(&self) -> TransformEditorConfig {
        TransformEditorConfig {
            quick_interaction_window: Duration::from_millis(self.editor.quick_interaction_window_ms),
            min_write_interval: Duration::from_millis(self.editor.min_write_interval_ms),
            flush_on_release: self.editor.flush_on_release,
        }
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            skip_initial_pass: self.sync.skip_initial_pass,
        }
    }

    pub fn identity_policy(&self) -> IdentityPolicy {
        self.sync.identity_policy
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".atelier").join("config.toml"))
    }

    fn load_layer(path: &Path) -> Result<ConfigLayer> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            AtelierError::ConfigError(format!("Failed to parse config {}: {}", path.display(), e))
        })
    }

    fn merge(&mut self, layer: ConfigLayer) {
        if let Some(ms) = layer.editor.quick_interaction_window_ms {
            self.editor.quick_interaction_window_ms = ms;
        }
        if let Some(ms) = layer.editor.min_write_interval_ms {
            self.editor.min_write_interval_ms = ms;
        }
        if let Some(flush) = layer.editor.flush_on_release {
            self.editor.flush_on_release = flush;
        }
        if let Some(skip) = layer.sync.skip_initial_pass {
            self.sync.skip_initial_pass = skip;
        }
        if let Some(policy) = layer.sync.identity_policy {
            self.sync.identity_policy = policy;
        }
    }

    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup(ENV_MIN_WRITE_INTERVAL) {
            self.editor.min_write_interval_ms = parse_ms(ENV_MIN_WRITE_INTERVAL, &value)?;
        }
        if let Some(value) = lookup(ENV_QUICK_INTERACTION) {
            self.editor.quick_interaction_window_ms = parse_ms(ENV_QUICK_INTERACTION, &value)?;
        }
        Ok(())
    }
}

fn parse_ms(key: &str, value: &str) -> Result<u64> {
    value.trim().parse().map_err(|_| {
        AtelierError::ConfigError(format!("{} must be milliseconds, got '{}'", key, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_config(content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("atelier_config_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        let editor = config.transform_editor_config();
        assert_eq!(editor.quick_interaction_window, Duration::from_millis(500));
        assert_eq!(editor.min_write_interval, Duration::from_millis(50));
        assert!(editor.flush_on_release);
        assert!(config.sync_config().skip_initial_pass);
        assert_eq!(config.identity_policy(), IdentityPolicy::Mutable);
    }

    #[test]
    fn test_load_config_from_file() {
        let path = temp_config(
            r#"
[editor]
flush_on_release = false

[sync]
skip_initial_pass = false
identity_policy = "reserved"
"#,
        );
        let config = EditorConfig::load_from_file(&path).unwrap();

        assert!(!config.editor.flush_on_release);
        assert!(!config.sync.skip_initial_pass);
        assert_eq!(config.identity_policy(), IdentityPolicy::Reserved);

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_layers_only_override_present_keys() {
        let mut config = EditorConfig::from_toml_str(
            r#"
[editor]
min_write_interval_ms = 120
quick_interaction_window_ms = 300
"#,
        )
        .unwrap();
        config.merge(toml::from_str("[editor]\nquick_interaction_window_ms = 250").unwrap());

        assert_eq!(config.editor.min_write_interval_ms, 120);
        assert_eq!(config.editor.quick_interaction_window_ms, 250);
        assert!(config.editor.flush_on_release);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = EditorConfig::default();
        config
            .apply_env_overrides(|key| match key {
                ENV_MIN_WRITE_INTERVAL => Some("16".to_string()),
                ENV_QUICK_INTERACTION => Some(" 250 ".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.editor.min_write_interval_ms, 16);
        assert_eq!(config.editor.quick_interaction_window_ms, 250);

        let bad = config.apply_env_overrides(|key| {
            (key == ENV_MIN_WRITE_INTERVAL).then(|| "fast".to_string())
        });
        assert!(matches!(bad, Err(AtelierError::ConfigError(_))));
    }

    #[test]
    fn test_invalid_policy_is_rejected() {
        let err = EditorConfig::from_toml_str("[sync]\nidentity_policy = \"sometimes\"");
        assert!(err.is_err());
    }
}
