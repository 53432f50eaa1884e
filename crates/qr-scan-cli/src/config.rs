//! Configuration file support for qr-scan.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/qr-scan/config.toml` (lowest priority)
//! - Project-local: `.qr-scan.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

/// Name of the project-local config file.
pub const PROJECT_CONFIG_NAME: &str = ".qr-scan.toml";

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General options.
    pub general: GeneralConfig,
    /// Detection engine settings.
    pub engine: EngineConfig,
    /// Raster decoder limits.
    pub decoder: DecoderConfig,
    /// Output formatting settings.
    pub output: OutputConfig,
}

/// General configuration options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
    /// Worker threads for a batch.
    pub jobs: Option<usize>,
}

/// Detection engine configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine instances shared by all workers.
    pub instances: Option<usize>,
    /// White margin added around each raster before detection, in pixels.
    pub quiet_zone: Option<u32>,
}

/// Raster decoder limits.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Maximum accepted image width.
    pub max_image_width: Option<u32>,
    /// Maximum accepted image height.
    pub max_image_height: Option<u32>,
    /// Maximum decoder allocation in MiB.
    pub max_alloc_mb: Option<u64>,
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json" or "jsonl".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
    /// Print the metrics snapshot after a batch.
    pub metrics: Option<bool>,
    /// Metrics scope: "all" or "qrcode".
    pub metrics_scope: Option<String>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/qr-scan/config.toml`
    /// 2. Project-local: `.qr-scan.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are reported as
    /// warnings and fall back to defaults when applied.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        if let Err(e) = config.validate() {
            eprintln!("warning: {e}");
        }

        config
    }

    /// Validate configuration values are within acceptable ranges.
    fn validate(&self) -> Result<(), String> {
        if self.general.jobs == Some(0) {
            return Err("general.jobs must be at least 1, got 0".to_string());
        }
        if self.engine.instances == Some(0) {
            return Err("engine.instances must be at least 1, got 0".to_string());
        }
        if self.decoder.max_alloc_mb == Some(0) {
            return Err("decoder.max_alloc_mb must be at least 1, got 0".to_string());
        }

        if let Some(ref f) = self.output.format {
            if f != "json" && f != "jsonl" {
                return Err(format!(
                    "output.format must be 'json' or 'jsonl', got '{f}'"
                ));
            }
        }
        if let Some(ref s) = self.output.metrics_scope {
            if s != "all" && s != "qrcode" {
                return Err(format!(
                    "output.metrics_scope must be 'all' or 'qrcode', got '{s}'"
                ));
            }
        }

        Ok(())
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        // General
        self.general.recursive = other.general.recursive.or(self.general.recursive);
        self.general.jobs = other.general.jobs.or(self.general.jobs);

        // Engine
        self.engine.instances = other.engine.instances.or(self.engine.instances);
        self.engine.quiet_zone = other.engine.quiet_zone.or(self.engine.quiet_zone);

        // Decoder
        self.decoder.max_image_width = other
            .decoder
            .max_image_width
            .or(self.decoder.max_image_width);
        self.decoder.max_image_height = other
            .decoder
            .max_image_height
            .or(self.decoder.max_image_height);
        self.decoder.max_alloc_mb = other.decoder.max_alloc_mb.or(self.decoder.max_alloc_mb);

        // Output
        self.output.format = other.output.format.or_else(|| self.output.format.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.progress = other.output.progress.or(self.output.progress);
        self.output.metrics = other.output.metrics.or(self.output.metrics);
        self.output.metrics_scope = other
            .output
            .metrics_scope
            .or_else(|| self.output.metrics_scope.take());
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("qr-scan").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.qr-scan.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(PROJECT_CONFIG_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.general.jobs.is_none());
        assert!(config.engine.instances.is_none());
        assert!(config.output.format.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: AppConfig = toml::from_str("").expect("parse empty config");
        assert!(config.engine.quiet_zone.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r"
[general]
recursive = true
jobs = 4

[engine]
instances = 2
quiet_zone = 12

[decoder]
max_image_width = 8000
max_image_height = 6000
max_alloc_mb = 256

[output]
format = 'json'
pretty = true
progress = false
metrics = true
metrics_scope = 'qrcode'
";
        let config: AppConfig = toml::from_str(toml).expect("parse full config");

        assert_eq!(config.general.recursive, Some(true));
        assert_eq!(config.general.jobs, Some(4));
        assert_eq!(config.engine.instances, Some(2));
        assert_eq!(config.engine.quiet_zone, Some(12));
        assert_eq!(config.decoder.max_image_width, Some(8000));
        assert_eq!(config.decoder.max_alloc_mb, Some(256));
        assert_eq!(config.output.format, Some("json".to_string()));
        assert_eq!(config.output.metrics, Some(true));
        assert_eq!(config.output.metrics_scope, Some("qrcode".to_string()));
    }

    #[test]
    fn test_merge_configs() {
        let mut base: AppConfig = toml::from_str(
            r"
[engine]
instances = 2

[decoder]
max_image_width = 4000
",
        )
        .expect("parse base");

        let override_config: AppConfig = toml::from_str(
            r"
[engine]
instances = 6

[output]
pretty = true
",
        )
        .expect("parse override");

        base.merge(override_config);

        assert_eq!(base.engine.instances, Some(6));
        assert_eq!(base.decoder.max_image_width, Some(4000));
        assert_eq!(base.output.pretty, Some(true));
    }

    #[test]
    fn test_merge_preserves_base_when_override_is_none() {
        let mut base: AppConfig = toml::from_str(
            r"
[engine]
instances = 3
quiet_zone = 4

[output]
format = 'jsonl'
metrics_scope = 'all'
",
        )
        .expect("parse base");

        let override_config: AppConfig = toml::from_str(
            r"
[engine]
quiet_zone = 16
",
        )
        .expect("parse override");

        base.merge(override_config);

        assert_eq!(base.engine.quiet_zone, Some(16));
        assert_eq!(base.engine.instances, Some(3));
        assert_eq!(base.output.format, Some("jsonl".to_string()));
        assert_eq!(base.output.metrics_scope, Some("all".to_string()));
    }

    #[test]
    fn test_merge_empty_override_preserves_base() {
        let mut base: AppConfig = toml::from_str(
            r"
[general]
jobs = 8
",
        )
        .expect("parse base");

        base.merge(AppConfig::default());

        assert_eq!(base.general.jobs, Some(8));
    }

    #[test]
    fn test_partial_decoder_config() {
        let toml = r"
[decoder]
max_alloc_mb = 64
";
        let config: AppConfig = toml::from_str(toml).expect("parse partial decoder");

        assert_eq!(config.decoder.max_alloc_mb, Some(64));
        assert!(config.decoder.max_image_width.is_none());
        assert!(config.decoder.max_image_height.is_none());
    }

    #[test]
    fn test_invalid_toml_syntax_handled() {
        let toml = r"
[engine
instances = 2
";
        let result: Result<AppConfig, _> = toml::from_str(toml);
        assert!(result.is_err(), "invalid TOML should return error");
    }

    #[test]
    fn test_invalid_field_type_handled() {
        let toml = r#"
[general]
jobs = "many"
"#;
        let result: Result<AppConfig, _> = toml::from_str(toml);
        assert!(result.is_err(), "type mismatch should return error");
    }

    #[test]
    fn test_negative_count_rejected_by_parser() {
        let toml = r"
[engine]
instances = -1
";
        let result: Result<AppConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_zero_jobs() {
        let mut config = AppConfig::default();
        config.general.jobs = Some(0);

        let result = config.validate();
        assert!(result.unwrap_err().contains("general.jobs"));
    }

    #[test]
    fn test_validate_zero_instances() {
        let mut config = AppConfig::default();
        config.engine.instances = Some(0);

        let result = config.validate();
        assert!(result.unwrap_err().contains("engine.instances"));
    }

    #[test]
    fn test_validate_output_format_invalid() {
        let mut config = AppConfig::default();
        config.output.format = Some("xml".to_string());

        let result = config.validate();
        assert!(result.unwrap_err().contains("output.format"));
    }

    #[test]
    fn test_validate_metrics_scope_invalid() {
        let mut config = AppConfig::default();
        config.output.metrics_scope = Some("jvm".to_string());

        let result = config.validate();
        assert!(result.unwrap_err().contains("output.metrics_scope"));
    }

    #[test]
    fn test_validate_empty_config_passes() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_find_config_in_parents() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(PROJECT_CONFIG_NAME), "").unwrap();

        let found = find_config_in_parents(&nested).unwrap();
        assert_eq!(found, dir.path().join(PROJECT_CONFIG_NAME));
    }
}
