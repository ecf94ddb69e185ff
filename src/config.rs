//! YAML configuration
//!
//! Environment variables (`$VAR`, `${VAR}`) are expanded in the raw text
//! before parsing, so secrets such as API keys can stay out of the file.
//! Every section is optional and falls back to its defaults.

use crate::graph::GraphConfig;
use crate::memory::{EncodingConfig, MemoryConfig};
use crate::oracle::{CallPolicy, LanguagePair};
use crate::workflow::FailurePolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "DISCOGRAPH_CONFIG";

/// Config path used when nothing else is given
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub language: LanguageSection,
    /// Endpoint for segmentation, edge, and memory calls
    #[serde(default)]
    pub processing: EndpointSection,
    /// Endpoint for generation calls
    #[serde(default)]
    pub translation: EndpointSection,
    /// Optional modules (`terminology`, `rag`) the run requires
    #[serde(default)]
    pub modules: Vec<String>,
    #[serde(default)]
    pub graph: GraphSection,
    #[serde(default)]
    pub memory: MemorySection,
    #[serde(default)]
    pub oracle: OracleSection,
    #[serde(default)]
    pub failure: FailureSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LanguageSection {
    /// Language names as handed to oracles
    pub source: String,
    pub target: String,
    pub source_code: String,
    pub target_code: String,
}

impl Default for LanguageSection {
    fn default() -> Self {
        Self {
            source: "English".to_string(),
            target: "German".to_string(),
            source_code: "en".to_string(),
            target_code: "de".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointSection {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model_name: String,
}

impl Default for EndpointSection {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/v1".to_string(),
            api_key: None,
            model_name: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GraphSection {
    pub max_discourse_length: usize,
    pub edge_concurrency: usize,
}

impl Default for GraphSection {
    fn default() -> Self {
        let defaults = GraphConfig::default();
        Self {
            max_discourse_length: defaults.max_discourse_length,
            edge_concurrency: defaults.edge_concurrency,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MemorySection {
    pub summary_window: usize,
    pub summary_budget: usize,
}

impl Default for MemorySection {
    fn default() -> Self {
        Self {
            summary_window: 3,
            summary_budget: 200,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OracleSection {
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub backoff_ms: u64,
    pub max_completion_tokens: u32,
}

impl Default for OracleSection {
    fn default() -> Self {
        Self {
            timeout_secs: 120,
            max_attempts: 1,
            backoff_ms: 500,
            max_completion_tokens: 4096,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    #[default]
    Drop,
    Placeholder,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FailureSection {
    pub policy: FailureMode,
    /// Target text for failed units under the placeholder policy
    pub placeholder: String,
    /// Mark the run incomplete once more units than this fail
    pub max_failed_units: Option<usize>,
}

impl Default for FailureSection {
    fn default() -> Self {
        Self {
            policy: FailureMode::Drop,
            placeholder: "[untranslated]".to_string(),
            max_failed_units: None,
        }
    }
}

impl AppConfig {
    /// Parse YAML text after expanding environment variables in it.
    pub fn from_yaml(text: &str, origin: &Path) -> ConfigResult<Self> {
        let expanded = expand_env(text);
        let config: AppConfig =
            serde_yaml::from_str(&expanded).map_err(|source| ConfigError::Parse {
                path: origin.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.graph.max_discourse_length == 0 {
            return Err(ConfigError::Invalid("graph.max_discourse_length must be positive".into()));
        }
        if self.memory.summary_window == 0 {
            return Err(ConfigError::Invalid("memory.summary_window must be positive".into()));
        }
        if self.oracle.timeout_secs == 0 {
            return Err(ConfigError::Invalid("oracle.timeout_secs must be positive".into()));
        }
        if self.failure.policy == FailureMode::Placeholder && self.failure.placeholder.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "failure.placeholder must not be empty under the placeholder policy".into(),
            ));
        }
        Ok(())
    }

    pub fn language_pair(&self) -> LanguagePair {
        LanguagePair::new(&self.language.source, &self.language.target)
    }

    pub fn graph_config(&self) -> GraphConfig {
        GraphConfig {
            max_discourse_length: self.graph.max_discourse_length,
            edge_concurrency: self.graph.edge_concurrency.max(1),
        }
    }

    pub fn memory_config(&self) -> MemoryConfig {
        MemoryConfig {
            summary_window: self.memory.summary_window,
            encoding: EncodingConfig {
                summary_budget: self.memory.summary_budget,
                ..EncodingConfig::default()
            },
        }
    }

    pub fn call_policy(&self) -> CallPolicy {
        CallPolicy::default()
            .with_timeout(Duration::from_secs(self.oracle.timeout_secs))
            .with_retries(
                self.oracle.max_attempts,
                Duration::from_millis(self.oracle.backoff_ms),
            )
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        match self.failure.policy {
            FailureMode::Drop => FailurePolicy::Drop,
            FailureMode::Placeholder => FailurePolicy::Placeholder(self.failure.placeholder.clone()),
        }
    }

    #[cfg(feature = "http")]
    pub fn processing_endpoint(&self) -> crate::oracle::ChatEndpoint {
        self.endpoint(&self.processing)
    }

    #[cfg(feature = "http")]
    pub fn translation_endpoint(&self) -> crate::oracle::ChatEndpoint {
        self.endpoint(&self.translation)
    }

    #[cfg(feature = "http")]
    fn endpoint(&self, section: &EndpointSection) -> crate::oracle::ChatEndpoint {
        crate::oracle::ChatEndpoint {
            base_url: section.base_url.clone(),
            api_key: section.api_key.clone().filter(|k| !k.is_empty()),
            model: section.model_name.clone(),
            max_completion_tokens: self.oracle.max_completion_tokens,
        }
    }
}

/// Read and parse a config file.
pub fn load_config(path: &Path) -> ConfigResult<AppConfig> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    AppConfig::from_yaml(&text, path)
}

/// Pick the config file: an explicit path, then `$DISCOGRAPH_CONFIG`, then
/// `config/config.yaml` if it exists, then the user config directory.
/// `None` means run on defaults.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    let local = PathBuf::from(DEFAULT_CONFIG_PATH);
    if local.exists() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join("discograph").join("config.yaml"))
        .filter(|path| path.exists())
}

/// Replace `$VAR` and `${VAR}` with the variable's value. Unset variables
/// and a lone `$` are left untouched.
pub fn expand_env(text: &str) -> String {
    expand_with(text, |name| std::env::var(name).ok())
}

fn expand_with(text: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => ("", 0),
            }
        } else {
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            (&after[..end], end)
        };

        match (!name.is_empty()).then(|| lookup(name)).flatten() {
            Some(value) => {
                out.push_str(&value);
                rest = &after[consumed..];
            }
            None => {
                out.push('$');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "API_KEY" => Some("sk-test".to_string()),
            "HOST" => Some("gpu01".to_string()),
            _ => None,
        }
    }

    #[test]
    fn expands_plain_and_braced_variables() {
        assert_eq!(expand_with("key: $API_KEY", lookup), "key: sk-test");
        assert_eq!(
            expand_with("url: http://${HOST}:8000/v1", lookup),
            "url: http://gpu01:8000/v1"
        );
    }

    #[test]
    fn leaves_unknown_and_malformed_references() {
        assert_eq!(expand_with("a: $MISSING", lookup), "a: $MISSING");
        assert_eq!(expand_with("b: ${MISSING}", lookup), "b: ${MISSING}");
        assert_eq!(expand_with("c: ${HOST", lookup), "c: ${HOST");
        assert_eq!(expand_with("cost: 5$", lookup), "cost: 5$");
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = AppConfig::from_yaml("{}", Path::new("inline.yaml")).unwrap();
        assert_eq!(config.graph_config(), GraphConfig::default());
        assert_eq!(config.memory_config(), MemoryConfig::default());
        assert_eq!(config.failure_policy(), FailurePolicy::Drop);
        assert_eq!(config.call_policy().max_attempts, 1);
        assert!(config.modules.is_empty());
    }

    #[test]
    fn parses_full_config() {
        let yaml = r#"
language:
  source: English
  target: Korean
  source_code: en
  target_code: ko
processing:
  base_url: http://localhost:8001/v1
  api_key: none
  model_name: small-model
translation:
  base_url: http://localhost:8002/v1
  model_name: big-model
modules: [terminology]
graph:
  max_discourse_length: 1024
  edge_concurrency: 4
memory:
  summary_window: 2
  summary_budget: 80
oracle:
  timeout_secs: 30
  max_attempts: 3
  backoff_ms: 100
failure:
  policy: placeholder
  placeholder: "[missing]"
  max_failed_units: 5
paths:
  base_dir: data
"#;
        let config = AppConfig::from_yaml(yaml, Path::new("inline.yaml")).unwrap();
        assert_eq!(config.language_pair(), LanguagePair::new("English", "Korean"));
        assert_eq!(config.language.target_code, "ko");
        assert_eq!(config.translation.model_name, "big-model");
        assert_eq!(config.modules, vec!["terminology"]);
        assert_eq!(config.graph_config().max_discourse_length, 1024);
        assert_eq!(config.graph_config().edge_concurrency, 4);
        assert_eq!(config.memory_config().summary_window, 2);
        assert_eq!(config.memory_config().encoding.summary_budget, 80);

        let policy = config.call_policy();
        assert_eq!(policy.timeout, Duration::from_secs(30));
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff, Duration::from_millis(100));

        assert_eq!(config.failure_policy(), FailurePolicy::Placeholder("[missing]".into()));
        assert_eq!(config.failure.max_failed_units, Some(5));
    }

    #[test]
    fn zero_length_cap_is_rejected() {
        let err = AppConfig::from_yaml("graph:\n  max_discourse_length: 0\n", Path::new("x.yaml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = AppConfig::from_yaml("oracle:\n  timeout_secs: 0\n", Path::new("x.yaml"))
            .unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn empty_placeholder_is_rejected() {
        let yaml = "failure:\n  policy: placeholder\n  placeholder: \"  \"\n";
        let err = AppConfig::from_yaml(yaml, Path::new("x.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let dropped = AppConfig::from_yaml("failure:\n  placeholder: \"\"\n", Path::new("x.yaml"))
            .unwrap();
        assert_eq!(dropped.failure_policy(), FailurePolicy::Drop);
    }

    #[test]
    fn bad_yaml_reports_path() {
        let err = AppConfig::from_yaml("graph: [", Path::new("broken.yaml")).unwrap_err();
        assert!(err.to_string().contains("broken.yaml"));
    }

    #[test]
    fn load_config_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "memory:\n  summary_window: 5\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.memory.summary_window, 5);
        assert!(matches!(
            load_config(&dir.path().join("absent.yaml")),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn explicit_config_path_wins() {
        let path = Path::new("/etc/discograph.yaml");
        assert_eq!(resolve_config_path(Some(path)), Some(path.to_path_buf()));
    }
}
