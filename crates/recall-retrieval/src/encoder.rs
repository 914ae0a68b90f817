//! Query encoding using a local Ollama embedding model.

use ollama_rs::Ollama;
use ollama_rs::generation::embeddings::request::GenerateEmbeddingsRequest;
use recall_core::{Error, Result};
use reqwest::Url;
use std::future::Future;
use std::process::Command;

/// A single embedding vector
pub type Embedding = Vec<f32>;

/// Default Ollama host
pub const DEFAULT_HOST: &str = "http://localhost";

/// Default Ollama port
pub const DEFAULT_PORT: u16 = 11434;

/// Default embedding model (all-MiniLM-L6-v2, 384 dimensions)
pub const DEFAULT_MODEL: &str = "all-minilm";

/// Trait for turning text into embedding vectors
pub trait Encoder: Send + Sync {
    /// Ensure the encoder can serve requests
    ///
    /// # Errors
    /// Returns an error if the model is not available or cannot be loaded
    fn ensure_ready(&self) -> impl Future<Output = Result<()>> + Send;

    /// Generate the embedding for one text
    ///
    /// # Errors
    /// Returns an error if embedding generation fails
    fn encode(&self, text: &str) -> impl Future<Output = Result<Embedding>> + Send;
}

/// Ollama embedding encoder
pub struct OllamaEncoder {
    ollama: Ollama,
    model: String,
}

/// Build the Ollama base URL from a host setting and a fallback port.
///
/// Accepts `http://host`, `https://host:port`, `host:port` and bare `host`.
/// Without a scheme `http://` is assumed; without a port `port` is used.
///
/// # Errors
/// Returns [`Error::Config`] if the host cannot be parsed as an HTTP URL
pub fn ollama_url(host: &str, port: u16) -> Result<Url> {
    let trimmed = host.trim();
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_owned()
    } else {
        format!("http://{trimmed}")
    };

    let invalid = |reason: &str| Error::Config(format!("Invalid Ollama host '{host}': {reason}"));

    let mut url = Url::parse(&with_scheme).map_err(|error| invalid(&error.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host name"));
    }
    if url.port().is_none() {
        url.set_port(Some(port))
            .map_err(|()| invalid("cannot set port"))?;
    }
    Ok(url)
}

impl OllamaEncoder {
    /// Create an encoder for `model` served at `host`, using `port` unless
    /// the host names its own
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the host is not a valid HTTP address
    pub fn new(host: &str, port: u16, model: impl Into<String>) -> Result<Self> {
        Ok(Self::from_url(ollama_url(host, port)?, model))
    }

    /// Create an encoder for `model` served at `url`
    pub fn from_url(url: Url, model: impl Into<String>) -> Self {
        Self {
            ollama: Ollama::from_url(url),
            model: model.into(),
        }
    }

    /// Name of the embedding model
    pub fn model(&self) -> &str {
        &self.model
    }

    fn pull_model(&self) -> Result<()> {
        tracing::info!("Embedding model '{}' not found", self.model);
        tracing::info!("Pulling model from Ollama (this may take a few minutes)...");

        let status = Command::new("ollama")
            .args(["pull", &self.model])
            .status()
            .map_err(|error| {
                Error::Encoder(format!(
                    "Failed to run 'ollama pull {}': {error}. Is Ollama installed?",
                    self.model
                ))
            })?;

        if !status.success() {
            return Err(Error::Encoder(format!(
                "Failed to pull model '{}'. Check Ollama is running.",
                self.model
            )));
        }

        tracing::info!("Pulled embedding model '{}'", self.model);
        Ok(())
    }
}

impl Encoder for OllamaEncoder {
    async fn ensure_ready(&self) -> Result<()> {
        let models = self.ollama.list_local_models().await.map_err(|error| {
            Error::Encoder(format!(
                "Failed to connect to Ollama: {error}.\n\nPlease ensure Ollama is installed and running:\n  - Install from: https://ollama.ai\n  - Start with: ollama serve"
            ))
        })?;

        if models
            .iter()
            .any(|model| same_model(&model.name, &self.model))
        {
            return Ok(());
        }

        self.pull_model()
    }

    async fn encode(&self, text: &str) -> Result<Embedding> {
        let request = GenerateEmbeddingsRequest::new(self.model.clone(), text.to_owned().into());

        let response = self
            .ollama
            .generate_embeddings(request)
            .await
            .map_err(|error| {
                let error_str = format!("{error:?}");
                if error_str.contains("model") && error_str.contains("not found") {
                    Error::Encoder(format!(
                        "Embedding model '{}' not found. Run: ollama pull {}",
                        self.model, self.model
                    ))
                } else {
                    Error::Encoder(format!("Embedding generation failed: {error}"))
                }
            })?;

        response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| Error::Encoder("No embeddings returned".into()))
    }
}

/// Compare model names, treating a missing tag as `:latest`
fn same_model(installed: &str, wanted: &str) -> bool {
    fn with_tag(name: &str) -> (&str, &str) {
        name.rsplit_once(':')
            .filter(|(_, tag)| !tag.contains('/'))
            .unwrap_or((name, "latest"))
    }
    with_tag(installed) == with_tag(wanted)
}
