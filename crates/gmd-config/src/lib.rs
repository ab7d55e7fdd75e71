//! Configuration management for the GMD renderer.
//!
//! Parses `gmd.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [renderer]
//! gfm = true
//! breaks = true
//! heading_ids = "github"
//! form_components = ["input", "textarea", "select", "checkbox", "radio"]
//!
//! [renderer.links]
//! anchor_class = "anchor"
//! legacy_prefix = "/#!/"
//!
//! [limits]
//! max_input_bytes = 4194304
//! ```

use std::path::{Path, PathBuf};

use gmd_renderer::{Limits, RendererOptions};
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override GFM extensions flag.
    pub gfm: Option<bool>,
    /// Override line break rendering.
    pub breaks: Option<bool>,
    /// Override bare URL autolinking.
    pub autolinks: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "gmd.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Renderer options.
    pub renderer: RendererOptions,
    /// Resource limits applied to every render call.
    pub limits: Limits,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a limit to be greater than zero.
fn require_positive(value: usize, field: &str) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Validation(format!(
            "{field} must be greater than 0"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `gmd.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// CLI settings are applied after loading, so CLI arguments take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, or if reading,
    /// parsing or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let discovered = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Some(path.to_path_buf())
            }
            None => std::env::current_dir()
                .ok()
                .and_then(|cwd| Self::discover_config(&cwd)),
        };

        let mut config = match discovered {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Renderer options with the configured limits applied.
    #[must_use]
    pub fn renderer_options(&self) -> RendererOptions {
        RendererOptions {
            limits: self.limits,
            ..self.renderer.clone()
        }
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(gfm) = settings.gfm {
            self.renderer.gfm = gfm;
        }
        if let Some(breaks) = settings.breaks {
            self.renderer.breaks = breaks;
        }
        if let Some(autolinks) = settings.autolinks {
            self.renderer.autolinks = autolinks;
        }
    }

    /// Search for a config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_renderer()?;
        self.validate_limits()?;
        Ok(())
    }

    fn validate_renderer(&self) -> Result<(), ConfigError> {
        for name in &self.renderer.form_components {
            require_non_empty(name, "renderer.form_components")?;
        }
        require_non_empty(
            &self.renderer.links.legacy_prefix,
            "renderer.links.legacy_prefix",
        )?;
        Ok(())
    }

    fn validate_limits(&self) -> Result<(), ConfigError> {
        require_positive(self.limits.max_input_bytes, "limits.max_input_bytes")?;
        require_positive(self.limits.max_blocks, "limits.max_blocks")?;
        require_positive(self.limits.max_nesting_depth, "limits.max_nesting_depth")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use gmd_renderer::HeadingIds;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.renderer.gfm);
        assert!(config.renderer.breaks);
        assert_eq!(config.renderer.heading_ids, HeadingIds::Github);
        assert_eq!(config.renderer.links.legacy_prefix, "/#!/");
        assert_eq!(config.limits, Limits::default());
        assert!(config.config_path.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.renderer, RendererOptions::default());
        assert_eq!(config.limits, Limits::default());
    }

    #[test]
    fn test_parse_renderer_config() {
        let toml = r#"
[renderer]
gfm = false
breaks = false
heading_ids = "none"
html_roundtrip = false
form_components = ["input", "slider"]

[renderer.links]
anchor_class = "in-page"
legacy_prefix = "/#/"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(!config.renderer.gfm);
        assert!(!config.renderer.breaks);
        assert!(config.renderer.autolinks);
        assert!(!config.renderer.html_roundtrip);
        assert_eq!(config.renderer.heading_ids, HeadingIds::Disabled);
        assert_eq!(config.renderer.form_components, vec!["input", "slider"]);
        assert_eq!(config.renderer.links.anchor_class, "in-page");
        assert_eq!(config.renderer.links.legacy_prefix, "/#/");
    }

    #[test]
    fn test_parse_limits_config() {
        let toml = r"
[limits]
max_input_bytes = 1024
max_blocks = 5
";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.limits.max_input_bytes, 1024);
        assert_eq!(config.limits.max_blocks, 5);
        assert_eq!(
            config.limits.max_nesting_depth,
            Limits::default().max_nesting_depth
        );
    }

    #[test]
    fn test_parse_unknown_heading_ids_fails() {
        let result: Result<Config, _> = toml::from_str("[renderer]\nheading_ids = \"gitlab\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_renderer_options_carry_limits() {
        let config: Config = toml::from_str("[limits]\nmax_blocks = 3\n").unwrap();
        let options = config.renderer_options();
        assert_eq!(options.limits.max_blocks, 3);
        assert!(options.gfm);
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default();
        let overrides = CliSettings {
            breaks: Some(false),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert!(!config.renderer.breaks);
        assert!(config.renderer.gfm); // Unchanged
        assert!(config.renderer.autolinks); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_multiple() {
        let mut config = Config::default();
        let overrides = CliSettings {
            gfm: Some(false),
            breaks: Some(false),
            autolinks: Some(false),
        };

        config.apply_cli_settings(&overrides);

        assert!(!config.renderer.gfm);
        assert!(!config.renderer.breaks);
        assert!(!config.renderer.autolinks);
    }

    #[test]
    fn test_validate_empty_component_name() {
        let config: Config =
            toml::from_str("[renderer]\nform_components = [\"input\", \" \"]\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        assert!(err.to_string().contains("renderer.form_components"));
    }

    #[test]
    fn test_validate_empty_legacy_prefix() {
        let config: Config =
            toml::from_str("[renderer.links]\nlegacy_prefix = \"\"\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("legacy_prefix"));
    }

    #[test]
    fn test_validate_zero_limits() {
        for field in ["max_input_bytes", "max_blocks", "max_nesting_depth"] {
            let config: Config = toml::from_str(&format!("[limits]\n{field} = 0\n")).unwrap();
            let err = config.validate().unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("Configuration error: limits.{field} must be greater than 0")
            );
        }
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[renderer]\nbreaks = false\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert!(!config.renderer.breaks);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_applies_cli_settings_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gmd.toml");
        std::fs::write(&path, "[renderer]\ngfm = true\nbreaks = true\n").unwrap();
        let settings = CliSettings {
            gfm: Some(false),
            ..Default::default()
        };

        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert!(!config.renderer.gfm);
        assert!(config.renderer.breaks);
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gmd.toml");
        std::fs::write(&path, "[renderer\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_validates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gmd.toml");
        std::fs::write(&path, "[limits]\nmax_blocks = 0\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_discover_config_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("docs").join("guides");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();

        assert_eq!(
            Config::discover_config(&nested),
            Some(dir.path().join(CONFIG_FILENAME))
        );
    }

    #[test]
    fn test_discover_config_prefers_nearest() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("docs");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();
        std::fs::write(nested.join(CONFIG_FILENAME), "").unwrap();

        assert_eq!(
            Config::discover_config(&nested),
            Some(nested.join(CONFIG_FILENAME))
        );
    }
}
