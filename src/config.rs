//! Service settings layered from defaults, a TOML file, `.env` and the process environment.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::agents::vision::DEFAULT_VISION_MODEL;
use crate::generator::jobs::{DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL};

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_REPLICATE_BASE_URL: &str = "https://api.replicate.com";
pub const DEFAULT_SETTINGS_REL_PATH: &str = "config/enhance.settings.toml";
pub const VISION_TIMEOUT: Duration = Duration::from_secs(30);
pub const GENERATION_TIMEOUT: Duration = Duration::from_secs(120);
pub const IMAGE_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_REPLICATE_API_TOKEN: &str = "REPLICATE_API_TOKEN";
pub const ENV_BIND: &str = "ENHANCE_BACKEND_BIND";
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_REPLICATE_BASE_URL: &str = "REPLICATE_BASE_URL";
pub const ENV_POLL_INTERVAL_MS: &str = "ENHANCE_POLL_INTERVAL_MS";
pub const ENV_MAX_POLL_ATTEMPTS: &str = "ENHANCE_MAX_POLL_ATTEMPTS";
pub const ENV_SETTINGS_PATH: &str = "ENHANCE_SETTINGS_PATH";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("failed to read settings '{path}': {message}")]
    ReadFile { path: String, message: String },
    #[error("failed to parse settings TOML '{path}': {message}")]
    ParseToml { path: String, message: String },
    #[error("setting '{key}' has invalid value '{value}'")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub bind: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub vision_model: String,
    pub replicate_api_token: Option<String>,
    pub replicate_base_url: String,
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
    pub vision_timeout: Duration,
    pub generation_timeout: Duration,
    pub image_fetch_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: String::from(DEFAULT_BIND),
            openai_api_key: None,
            openai_base_url: String::from(DEFAULT_OPENAI_BASE_URL),
            vision_model: String::from(DEFAULT_VISION_MODEL),
            replicate_api_token: None,
            replicate_base_url: String::from(DEFAULT_REPLICATE_BASE_URL),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            vision_timeout: VISION_TIMEOUT,
            generation_timeout: GENERATION_TIMEOUT,
            image_fetch_timeout: IMAGE_FETCH_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SettingsFile {
    server: ServerSection,
    vision: VisionSection,
    generation: GenerationSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ServerSection {
    bind: Option<String>,
    image_fetch_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct VisionSection {
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct GenerationSection {
    base_url: Option<String>,
    poll_interval_ms: Option<u64>,
    max_poll_attempts: Option<u32>,
    timeout_secs: Option<u64>,
}

impl ServiceConfig {
    /// Resolves settings for `app_root` against the live process environment.
    pub fn load(app_root: &Path) -> Result<Self, ConfigError> {
        let env: HashMap<String, String> = std::env::vars().collect();
        Self::load_with_env(app_root, &env)
    }

    /// Same as [`ServiceConfig::load`] with an explicit environment map.
    pub fn load_with_env(
        app_root: &Path,
        env: &HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let dotenv = load_dotenv_map(app_root)?;
        let lookup = |key: &str| -> Option<String> {
            env.get(key)
                .or_else(|| dotenv.get(key))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let settings_path = resolve_settings_path(app_root, lookup(ENV_SETTINGS_PATH).as_deref());
        let file = load_settings_file(settings_path.as_path())?;

        let mut config = Self::default();
        config.apply_file(file);

        if let Some(bind) = lookup(ENV_BIND) {
            config.bind = bind;
        }
        config.openai_api_key = lookup(ENV_OPENAI_API_KEY);
        config.replicate_api_token = lookup(ENV_REPLICATE_API_TOKEN);
        if let Some(url) = lookup(ENV_OPENAI_BASE_URL) {
            config.openai_base_url = url;
        }
        if let Some(url) = lookup(ENV_REPLICATE_BASE_URL) {
            config.replicate_base_url = url;
        }
        if let Some(raw) = lookup(ENV_POLL_INTERVAL_MS) {
            let millis = parse_number(ENV_POLL_INTERVAL_MS, raw.as_str())?;
            config.poll_interval = Duration::from_millis(millis);
        }
        if let Some(raw) = lookup(ENV_MAX_POLL_ATTEMPTS) {
            let attempts: u32 = parse_number(ENV_MAX_POLL_ATTEMPTS, raw.as_str())?;
            if attempts == 0 {
                return Err(ConfigError::InvalidValue {
                    key: String::from(ENV_MAX_POLL_ATTEMPTS),
                    value: raw,
                });
            }
            config.max_poll_attempts = attempts;
        }
        Ok(config)
    }

    fn apply_file(&mut self, file: SettingsFile) {
        if let Some(bind) = non_empty(file.server.bind) {
            self.bind = bind;
        }
        if let Some(secs) = file.server.image_fetch_timeout_secs {
            self.image_fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(url) = non_empty(file.vision.base_url) {
            self.openai_base_url = url;
        }
        if let Some(model) = non_empty(file.vision.model) {
            self.vision_model = model;
        }
        if let Some(secs) = file.vision.timeout_secs {
            self.vision_timeout = Duration::from_secs(secs);
        }
        if let Some(url) = non_empty(file.generation.base_url) {
            self.replicate_base_url = url;
        }
        if let Some(ms) = file.generation.poll_interval_ms {
            self.poll_interval = Duration::from_millis(ms);
        }
        if let Some(attempts) = file.generation.max_poll_attempts.filter(|a| *a > 0) {
            self.max_poll_attempts = attempts;
        }
        if let Some(secs) = file.generation.timeout_secs {
            self.generation_timeout = Duration::from_secs(secs);
        }
    }

    pub fn has_vision_credential(&self) -> bool {
        self.openai_api_key.is_some()
    }

    pub fn has_generation_credential(&self) -> bool {
        self.replicate_api_token.is_some()
    }
}

fn resolve_settings_path(app_root: &Path, explicit: Option<&str>) -> PathBuf {
    match explicit.map(PathBuf::from) {
        Some(path) if path.is_absolute() => path,
        Some(path) => app_root.join(path),
        None => app_root.join(DEFAULT_SETTINGS_REL_PATH),
    }
}

fn load_settings_file(path: &Path) -> Result<SettingsFile, ConfigError> {
    if !path.exists() {
        return Ok(SettingsFile::default());
    }
    let raw = fs::read_to_string(path).map_err(|error| ConfigError::ReadFile {
        path: path.display().to_string(),
        message: error.to_string(),
    })?;
    toml::from_str::<SettingsFile>(raw.as_str()).map_err(|error| ConfigError::ParseToml {
        path: path.display().to_string(),
        message: error.to_string(),
    })
}

fn load_dotenv_map(app_root: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let path = app_root.join(".env");
    if !path.is_file() {
        return Ok(HashMap::new());
    }
    let raw = fs::read_to_string(path.as_path()).map_err(|error| ConfigError::ReadFile {
        path: path.display().to_string(),
        message: error.to_string(),
    })?;
    Ok(parse_dotenv_content(raw.as_str()))
}

pub(crate) fn parse_dotenv_content(raw: &str) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for line in raw.lines() {
        let mut entry = line.trim();
        if entry.is_empty() || entry.starts_with('#') {
            continue;
        }
        if let Some(rest) = entry.strip_prefix("export ") {
            entry = rest.trim_start();
        }
        let Some((key_raw, value_raw)) = entry.split_once('=') else {
            continue;
        };
        let key = key_raw.trim();
        if key.is_empty() {
            continue;
        }
        let mut value = value_raw.trim().to_string();
        let quoted = value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')));
        if quoted {
            value = value[1..value.len() - 1].to_string();
        } else if let Some((before_comment, _)) = value.split_once(" #") {
            value = before_comment.trim_end().to_string();
        }
        out.insert(key.to_string(), value);
    }
    out
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.parse::<T>().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_root(label: &str) -> PathBuf {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should be monotonic")
            .as_nanos();
        let root = std::env::temp_dir().join(format!("enhance_config_{label}_{stamp}"));
        fs::create_dir_all(root.join("config")).expect("config dir");
        root
    }

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parses_dotenv_lines() {
        let parsed = parse_dotenv_content(
            "# comment\nexport OPENAI_API_KEY=\"sk-1\"\nREPLICATE_API_TOKEN=r8 # inline\nBAD\n=nokey\nQUOTED='a b'\n",
        );
        assert_eq!(parsed.get("OPENAI_API_KEY").map(String::as_str), Some("sk-1"));
        assert_eq!(parsed.get("REPLICATE_API_TOKEN").map(String::as_str), Some("r8"));
        assert_eq!(parsed.get("QUOTED").map(String::as_str), Some("a b"));
        assert_eq!(parsed.len(), 3);
    }

    #[test]
    fn defaults_apply_without_any_sources() {
        let root = temp_root("defaults");
        let config = ServiceConfig::load_with_env(root.as_path(), &HashMap::new())
            .expect("defaults should load");
        assert_eq!(config, ServiceConfig::default());
        assert!(!config.has_vision_credential());
        assert!(!config.has_generation_credential());
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn layers_override_in_order() {
        let root = temp_root("layers");
        fs::write(
            root.join(DEFAULT_SETTINGS_REL_PATH),
            r#"[server]
bind = "0.0.0.0:9000"

[vision]
model = "gpt-4o"

[generation]
poll_interval_ms = 500
max_poll_attempts = 10
"#,
        )
        .expect("settings write");
        fs::write(
            root.join(".env"),
            "ENHANCE_BACKEND_BIND=0.0.0.0:9100\nOPENAI_API_KEY=sk-dotenv\nENHANCE_MAX_POLL_ATTEMPTS=20\n",
        )
        .expect("dotenv write");

        let config = ServiceConfig::load_with_env(
            root.as_path(),
            &env(&[("OPENAI_API_KEY", "sk-env"), ("REPLICATE_API_TOKEN", "   ")]),
        )
        .expect("layered config should load");

        assert_eq!(config.bind, "0.0.0.0:9100");
        assert_eq!(config.vision_model, "gpt-4o");
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.max_poll_attempts, 20);
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-env"));
        assert_eq!(config.replicate_api_token, None, "blank token counts as absent");
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn explicit_settings_path_is_relative_to_root() {
        let root = temp_root("explicit");
        fs::write(root.join("custom.toml"), "[server]\nbind = \"10.0.0.1:1\"\n")
            .expect("settings write");
        let config = ServiceConfig::load_with_env(
            root.as_path(),
            &env(&[(ENV_SETTINGS_PATH, "custom.toml")]),
        )
        .expect("explicit settings should load");
        assert_eq!(config.bind, "10.0.0.1:1");
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn rejects_bad_toml_and_bad_numbers() {
        let root = temp_root("invalid");
        fs::write(root.join(DEFAULT_SETTINGS_REL_PATH), "[server\nbind=")
            .expect("settings write");
        let err = ServiceConfig::load_with_env(root.as_path(), &HashMap::new())
            .expect_err("broken toml should fail");
        assert!(matches!(err, ConfigError::ParseToml { .. }));

        fs::remove_file(root.join(DEFAULT_SETTINGS_REL_PATH)).expect("remove settings");
        let err = ServiceConfig::load_with_env(
            root.as_path(),
            &env(&[(ENV_POLL_INTERVAL_MS, "soon")]),
        )
        .expect_err("non-numeric interval should fail");
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: String::from(ENV_POLL_INTERVAL_MS),
                value: String::from("soon"),
            }
        );
        let err = ServiceConfig::load_with_env(
            root.as_path(),
            &env(&[(ENV_MAX_POLL_ATTEMPTS, "0")]),
        )
        .expect_err("zero attempts should fail");
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        let _ = fs::remove_dir_all(root);
    }
}
