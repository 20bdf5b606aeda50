use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use faqchat_schema::DEFAULT_GREETING;
use serde::{Deserialize, Serialize};

pub const API_BASE_ENV: &str = "FAQCHAT_API_BASE";
pub const FALLBACK_API_BASE: &str = "http://localhost:8000";

/// Base address baked in at compile time, like a bundler's `VITE_*` value.
pub const BUILD_API_BASE: Option<&str> = option_env!("FAQCHAT_API_BASE");

fn default_greeting() -> String {
    DEFAULT_GREETING.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WidgetConfig {
    #[serde(default)]
    pub api_base: Option<String>,
    /// No timeout unless set.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default = "default_greeting")]
    pub greeting: String,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            api_base: None,
            request_timeout_secs: None,
            greeting: default_greeting(),
            log_dir: None,
        }
    }
}

impl WidgetConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Replaces `${VAR}` placeholders with environment values (empty if unset).
pub fn resolve_env_var(raw: &str) -> String {
    let mut output = String::new();
    let mut rest = raw;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);

        let candidate = &rest[start + 2..];
        let Some(end) = candidate.find('}') else {
            output.push_str(&rest[start..]);
            return output;
        };

        let key = &candidate[..end];
        output.push_str(&std::env::var(key).unwrap_or_default());
        rest = &candidate[end + 1..];
    }

    output.push_str(rest);
    output
}

/// Expands a leading `~` to `$HOME`.
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), std::env::var_os("HOME")) {
        (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    }
}

/// Reads the YAML config. A missing file yields defaults unless `required`.
pub fn load_config(path: &Path, required: bool) -> Result<WidgetConfig> {
    if !path.exists() {
        if required {
            return Err(anyhow!("config file not found: {}", path.display()));
        }
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(WidgetConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let mut config: WidgetConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse yaml file: {}", path.display()))?;

    config.api_base = config.api_base.as_deref().map(resolve_env_var);
    config.log_dir = config.log_dir.as_deref().map(expand_home);

    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &WidgetConfig) -> Result<()> {
    if let Some(api_base) = &config.api_base {
        if !api_base.is_empty() {
            url::Url::parse(api_base)
                .with_context(|| format!("api_base is not a valid url: {api_base}"))?;
        }
    }
    if config.request_timeout_secs == Some(0) {
        return Err(anyhow!("request_timeout_secs must be greater than zero"));
    }
    if config.greeting.trim().is_empty() {
        return Err(anyhow!("greeting must not be empty"));
    }
    Ok(())
}

/// Picks the service address: flag, then environment, then config file,
/// then the build-time value, then the local default. Blank values are skipped.
pub fn resolve_api_base(
    flag: Option<&str>,
    env: Option<&str>,
    config: &WidgetConfig,
) -> String {
    [flag, env, config.api_base.as_deref(), BUILD_API_BASE]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|candidate| !candidate.is_empty())
        .unwrap_or(FALLBACK_API_BASE)
        .to_string()
}
