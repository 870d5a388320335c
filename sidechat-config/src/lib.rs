//! Loader for automation configuration with YAML + environment overlays.
//!
//! Sources merge in order: YAML file (if any), then `SIDECHAT`-prefixed
//! environment variables (`SIDECHAT__HEADLESS=true`), then recursive `${VAR}`
//! expansion over every string value before the typed struct materialises.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Everything the automation binary needs that is not per-site.
#[derive(Debug, Clone, Deserialize)]
pub struct SidechatConfig {
    /// WebDriver endpoint the browser session attaches to.
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    /// Run the browser without a visible window.
    #[serde(default)]
    pub headless: bool,
    /// Type character-by-character with randomized pauses instead of filling
    /// the input in one script call.
    #[serde(default)]
    pub humanized_typing: bool,
    /// Separator line between prompts in a replay file.
    #[serde(default = "default_batch_separator")]
    pub batch_separator: String,
    /// Explicit log directory; falls back to `SIDECHAT_LOG_DIR`, then the
    /// user data dir.
    #[serde(default)]
    pub log_dir: Option<String>,
    /// Completion-poll ceiling override in milliseconds, all sites.
    #[serde(default)]
    pub max_wait_ms: Option<u64>,
    /// Completion-poll interval override in milliseconds, all sites.
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,
}

impl Default for SidechatConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            headless: false,
            humanized_typing: false,
            batch_separator: default_batch_separator(),
            log_dir: None,
            max_wait_ms: None,
            poll_interval_ms: None,
        }
    }
}

fn default_webdriver_url() -> String {
    "http://localhost:9515".into()
}

fn default_batch_separator() -> String {
    "NEXT_PROMPT".into()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct SidechatConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for SidechatConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SidechatConfigLoader {
    /// Start with no file sources; loading then applies `SIDECHAT` env
    /// overrides, and any field nothing sets falls back to its default.
    ///
    /// ```
    /// use sidechat_config::SidechatConfigLoader;
    ///
    /// let config = SidechatConfigLoader::new().load().expect("valid config");
    /// assert_eq!(config.webdriver_url, "http://localhost:9515");
    /// assert_eq!(config.batch_separator, "NEXT_PROMPT");
    /// assert!(!config.headless);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by
    /// suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self.builder.add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Merge an inline YAML snippet; used by tests and `--config -`.
    ///
    /// ```
    /// use sidechat_config::SidechatConfigLoader;
    ///
    /// let config = SidechatConfigLoader::new()
    ///     .with_yaml_str("headless: true\nbatch_separator: NEW_PROMPT")
    ///     .load()
    ///     .unwrap();
    /// assert!(config.headless);
    /// assert_eq!(config.batch_separator, "NEW_PROMPT");
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Merge the sources, expand `${VAR}` placeholders recursively, and
    /// deserialize into the typed config.
    ///
    /// The env source is attached here so `SIDECHAT__*` variables always beat
    /// file values regardless of the order builder methods were called in.
    pub fn load(self) -> Result<SidechatConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("SIDECHAT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}
