//! Layered configuration and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` + `config.<env>.toml`
//! + `APP_*` env vars (`__` separates nested keys, e.g. `APP_TOPICS__MAX_TOPICS`).
//! Provides helpers to expand `~` and `${VAR}` and to resolve relative paths
//! against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SorterConfig {
    pub paths: PathsConfig,
    pub discovery: DiscoveryConfig,
    pub extraction: ExtractionConfig,
    pub language: LanguageConfig,
    pub topics: TopicConfig,
    pub placement: PlacementConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub input_dir: String,
    pub output_dir: String,
    /// Defaults to `<output_dir>/logs`.
    pub log_dir: Option<String>,
    /// Relative names land inside `output_dir`.
    pub index_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: "./pdfs".to_string(),
            output_dir: "./sorted_pdfs".to_string(),
            log_dir: None,
            index_file: "index.txt".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub recursive: bool,
    pub extensions: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self { recursive: false, extensions: vec!["pdf".to_string()] }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// 0 reads every page; otherwise the first and last `n / 2` pages.
    pub sample_pages: usize,
    /// 0 sizes the worker pool to the number of CPUs.
    pub max_workers: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageNaming {
    Name,
    Code,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    pub min_chars: usize,
    pub min_confidence: f64,
    pub max_sample_chars: usize,
    pub naming: LanguageNaming,
    /// ISO 639-3 codes to decide between when open detection is not reliable
    /// (short text, close trigram scores). Empty keeps the open guess.
    pub preferred: Vec<String>,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            min_chars: 10,
            min_confidence: 0.0,
            max_sample_chars: 10_000,
            naming: LanguageNaming::Name,
            preferred: vec!["eng".to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmbedderKind {
    Hashing,
    BgeM3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicConfig {
    pub embedder: EmbedderKind,
    pub model_dir: Option<String>,
    pub hashing_dim: usize,
    pub max_topics: usize,
    pub min_corpus: usize,
    pub min_chars: usize,
    pub label_keywords: usize,
    pub max_iterations: usize,
    pub default_label: String,
    pub unclassified_label: String,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            embedder: EmbedderKind::Hashing,
            model_dir: None,
            hashing_dim: 512,
            max_topics: 8,
            min_corpus: 4,
            min_chars: 100,
            label_keywords: 1,
            max_iterations: 50,
            default_label: "general".to_string(),
            unclassified_label: "unclassified".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub keep_originals: bool,
    pub max_topic_len: usize,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self { keep_originals: false, max_topic_len: 50 }
    }
}

impl SorterConfig {
    /// Load from the working directory: `config.toml`, `config.<RUST_ENV>.toml`,
    /// then `APP_*`, then `extra` when given.
    pub fn load_with(extra: Option<&Path>) -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(SorterConfig::default())).merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));
        if let Some(path) = extra {
            if !path.is_file() {
                return Err(Error::NotFound(format!("config file {}", path.display())));
            }
            figment = figment.merge(Toml::file(path));
        }

        Self::from_figment(&figment)
    }

    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let config: Self = figment.extract().map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.discovery.extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(Error::InvalidConfig("discovery.extensions must name at least one extension".into()));
        }
        if self.topics.max_topics < 2 {
            return Err(Error::InvalidConfig("topics.max_topics must be at least 2".into()));
        }
        if self.topics.label_keywords == 0 {
            return Err(Error::InvalidConfig("topics.label_keywords must be at least 1".into()));
        }
        if self.topics.hashing_dim == 0 {
            return Err(Error::InvalidConfig("topics.hashing_dim must be non-zero".into()));
        }
        if self.placement.max_topic_len == 0 {
            return Err(Error::InvalidConfig("placement.max_topic_len must be non-zero".into()));
        }
        if self.paths.index_file.trim().is_empty() {
            return Err(Error::InvalidConfig("paths.index_file must not be empty".into()));
        }
        Ok(())
    }

    pub fn input_dir(&self) -> PathBuf {
        expand_path(&self.paths.input_dir)
    }

    pub fn output_dir(&self) -> PathBuf {
        expand_path(&self.paths.output_dir)
    }

    pub fn log_dir(&self) -> PathBuf {
        match &self.paths.log_dir {
            Some(dir) => expand_path(dir),
            None => self.output_dir().join("logs"),
        }
    }

    pub fn index_path(&self) -> PathBuf {
        resolve_with_base(&self.output_dir(), &self.paths.index_file)
    }

    pub fn model_dir(&self) -> Option<PathBuf> {
        self.topics.model_dir.as_deref().map(expand_path)
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
