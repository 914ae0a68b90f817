//! Configuration management for recall
//!
//! Settings come from a TOML file, then environment variables, then
//! command-line flags (applied by the caller).

use recall_core::{Error, Result};
use recall_retrieval::encoder::{DEFAULT_HOST, DEFAULT_MODEL, DEFAULT_PORT, ollama_url};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const ENV_EMBEDDING_MODEL: &str = "EMBEDDING_MODEL";
const ENV_OLLAMA_HOST: &str = "OLLAMA_HOST";
const ENV_VECTORS: &str = "RECALL_VECTORS";

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "recall.toml";

/// Complete recall configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecallConfig {
    /// Artifact and ranking settings
    pub retrieval: RetrievalConfig,
    /// Embedding model settings
    pub encoder: EncoderConfig,
    /// Interactive session settings
    pub session: SessionConfig,
}

/// Artifact and ranking settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Path of the embedding artifact
    pub vectors: PathBuf,
    /// Number of results per question
    pub top_k: usize,
    /// Maximum snippet length in characters
    pub snippet_chars: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            vectors: PathBuf::from("vectors.json"),
            top_k: 5,
            snippet_chars: 250,
        }
    }
}

/// Embedding model settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Ollama model name
    pub model: String,
    /// Ollama host, `http://` assumed when no scheme is given
    pub host: String,
    /// Ollama port, used when `host` names none
    pub port: u16,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_owned(),
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
        }
    }
}

/// Interactive session settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Questions suggested when the session starts
    pub sample_questions: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sample_questions: [
                "Explain Python functions with an example",
                "What are loops in Python?",
                "How do conditional statements work?",
                "What is list comprehension in Python?",
                "Explain the use of dictionaries in Python",
                "What is recursion?",
                "How do you handle exceptions in Python?",
                "Explain object-oriented programming concepts",
                "What is the difference between tuples and lists?",
                "Explain how 'for' and 'while' loops differ",
            ]
            .iter()
            .map(|question| (*question).to_owned())
            .collect(),
        }
    }
}

impl RecallConfig {
    /// Load configuration, then apply environment overrides.
    ///
    /// An explicit path must exist. Without one, `./recall.toml` and then
    /// `~/.recall/config.toml` are tried before falling back to defaults.
    ///
    /// # Errors
    /// Returns an error if a config file cannot be read, parsed or validated
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from_file(path)?,
            None => match Self::default_paths().into_iter().find(|path| path.is_file()) {
                Some(path) => Self::load_from_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env_with(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load config from a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn load_from_file(path: &Path) -> Result<Self> {
        use toml::from_str;
        let contents = fs::read_to_string(path).map_err(|error| {
            Error::Config(format!("Failed to read {}: {error}", path.display()))
        })?;
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(from_str(&contents)?)
    }

    /// Candidate configuration files, in lookup order
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".recall").join("config.toml"));
        }
        paths
    }

    /// Apply environment overrides read through `lookup`
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(model) = lookup(ENV_EMBEDDING_MODEL) {
            self.encoder.model = model;
        }
        if let Some(host) = lookup(ENV_OLLAMA_HOST) {
            self.encoder.host = host;
        }
        if let Some(vectors) = lookup(ENV_VECTORS) {
            self.retrieval.vectors = PathBuf::from(vectors);
        }
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns an error if a count is zero, the model name is empty or the
    /// host is not an HTTP address
    pub fn validate(&self) -> Result<()> {
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("top_k must be at least 1".into()));
        }
        if self.retrieval.snippet_chars == 0 {
            return Err(Error::Config("snippet_chars must be at least 1".into()));
        }
        if self.encoder.model.trim().is_empty() {
            return Err(Error::Config("encoder model must not be empty".into()));
        }
        ollama_url(&self.encoder.host, self.encoder.port)?;
        Ok(())
    }
}
