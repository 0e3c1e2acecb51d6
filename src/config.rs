use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timing::parse_logged_at;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub compare: CompareConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub reconcile: ReconcileConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_format")]
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareConfig {
    #[serde(default = "default_true")]
    pub fail_on_drift: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_true")]
    pub configured: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReconcileConfig {
    /// RFC 3339 instant used for unusable timestamps; empty means "now".
    #[serde(default)]
    pub fallback_timestamp: String,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub output_format: Option<String>,
    pub fail_on_drift: Option<bool>,
    pub fallback_timestamp: Option<String>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/interaction-contract/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(format) = overrides.output_format {
            self.output.format = format;
        }
        if let Some(fail_on_drift) = overrides.fail_on_drift {
            self.compare.fail_on_drift = fail_on_drift;
        }
        if let Some(fallback) = overrides.fallback_timestamp {
            self.reconcile.fallback_timestamp = fallback;
        }
    }

    /// The configured fallback instant, or `now` when none is set.
    pub fn resolved_fallback(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let raw = self.reconcile.fallback_timestamp.trim();
        if raw.is_empty() {
            return Ok(now);
        }
        parse_logged_at(raw).ok_or_else(|| anyhow!("invalid fallback timestamp: {raw}"))
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn default_template() -> String {
        let template = r#"[output]
format = "table"

[compare]
fail_on_drift = true

[engine]
configured = true

[reconcile]
fallback_timestamp = ""
"#;
        template.to_string()
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_output_format(),
        }
    }
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            fail_on_drift: true,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { configured: true }
    }
}

fn default_output_format() -> String {
    "table".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn template_parses_to_defaults() {
        let parsed: Config = toml::from_str(&Config::default_template()).expect("template parses");
        assert_eq!(parsed.output.format, "table");
        assert!(parsed.compare.fail_on_drift);
        assert!(parsed.engine.configured);
        assert!(parsed.reconcile.fallback_timestamp.is_empty());
    }

    #[test]
    fn partial_file_keeps_section_defaults() {
        let parsed: Config = toml::from_str("[compare]\nfail_on_drift = false\n").expect("parses");
        assert!(!parsed.compare.fail_on_drift);
        assert_eq!(parsed.output.format, "table");
    }

    #[test]
    fn overrides_replace_loaded_values() {
        let mut config = Config::default();
        config.apply_overrides(ConfigOverrides {
            output_format: Some("json".to_string()),
            fail_on_drift: Some(false),
            fallback_timestamp: Some("2024-05-01T00:00:00Z".to_string()),
        });
        assert_eq!(config.output.format, "json");
        assert!(!config.compare.fail_on_drift);
        let now = Utc::now();
        let resolved = config.resolved_fallback(now).expect("valid fallback");
        assert_eq!(
            resolved,
            Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).single().expect("valid")
        );
    }

    #[test]
    fn empty_fallback_means_now_and_garbage_is_rejected() {
        let mut config = Config::default();
        let now = Utc::now();
        assert_eq!(config.resolved_fallback(now).expect("now"), now);
        config.reconcile.fallback_timestamp = "soon".to_string();
        assert!(config.resolved_fallback(now).is_err());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let config = Config::load(Some(Path::new("/nonexistent/interaction-contract.toml")))
            .expect("defaults");
        assert!(config.engine.configured);
    }
}
