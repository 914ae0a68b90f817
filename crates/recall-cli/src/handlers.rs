//! Command handlers for CLI operations

use anyhow::{Context as _, Result};
use recall_cli::{RecallConfig, Session, SessionOptions};
use recall_retrieval::{EmbeddingStore, Encoder as _, OllamaEncoder, Retriever, format_result};
use std::io::{self, Write as _};
use tokio::io::{BufReader, stdin};

use crate::cli::GlobalArgs;

/// Load the configuration and apply command-line overrides
///
/// # Errors
/// Returns an error if the configuration cannot be loaded or is invalid
pub fn resolve_config(args: &GlobalArgs) -> Result<RecallConfig> {
    let mut config = RecallConfig::load(args.config.as_deref())?;

    if let Some(vectors) = &args.vectors {
        config.retrieval.vectors.clone_from(vectors);
    }
    if let Some(top_k) = args.top_k {
        config.retrieval.top_k = top_k;
    }
    if let Some(snippet_chars) = args.snippet_chars {
        config.retrieval.snippet_chars = snippet_chars;
    }
    if let Some(model) = &args.model {
        config.encoder.model.clone_from(model);
    }

    config.validate()?;
    Ok(config)
}

/// Load the artifact, build the index, and connect the encoder
///
/// # Errors
/// Returns an error if the artifact fails to load or the encoder is unavailable
async fn build_retriever(config: &RecallConfig) -> Result<Retriever<OllamaEncoder>> {
    let path = &config.retrieval.vectors;
    let error_context = || format!("Error loading {}", path.display());

    let store = EmbeddingStore::load(path).await.with_context(error_context)?;
    let encoder = OllamaEncoder::new(
        &config.encoder.host,
        config.encoder.port,
        config.encoder.model.clone(),
    )?;
    let retriever = Retriever::from_store(store, encoder).with_context(error_context)?;

    tracing::info!("Checking embedding model '{}'...", config.encoder.model);
    retriever
        .encoder()
        .ensure_ready()
        .await
        .context("Embedding model unavailable")?;

    Ok(retriever)
}

/// Handle the interactive session
///
/// # Errors
/// Returns an error if startup fails or terminal IO fails
pub async fn handle_chat(config: &RecallConfig) -> Result<()> {
    let retriever = build_retriever(config).await?;

    let options = SessionOptions {
        top_k: config.retrieval.top_k,
        snippet_chars: config.retrieval.snippet_chars,
        sample_questions: config.session.sample_questions.clone(),
    };
    let mut session = Session::new(&retriever, options);
    let mut stdout = io::stdout().lock();

    session.write_intro(&mut stdout)?;
    session.run(BufReader::new(stdin()), &mut stdout).await?;
    Ok(())
}

/// Handle a single question
///
/// # Errors
/// Returns an error if startup or retrieval fails
pub async fn handle_ask(config: &RecallConfig, question: &str) -> Result<()> {
    let retriever = build_retriever(config).await?;
    let results = retriever
        .retrieve(question.trim(), config.retrieval.top_k)
        .await
        .with_context(|| format!("Could not answer {question:?}"))?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "\nTop matches:\n")?;
    for chunk in &results {
        writeln!(stdout, "{}", format_result(chunk, config.retrieval.snippet_chars))?;
    }
    Ok(())
}

/// Handle artifact inspection; never contacts the encoder
///
/// # Errors
/// Returns an error if the artifact fails to load
pub async fn handle_inspect(config: &RecallConfig) -> Result<()> {
    let path = &config.retrieval.vectors;
    let store = EmbeddingStore::load(path)
        .await
        .with_context(|| format!("Error loading {}", path.display()))?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "Artifact:  {}", path.display())?;
    writeln!(stdout, "Chunks:    {}", store.len())?;
    writeln!(stdout, "Dimension: {}", store.dimension())?;
    writeln!(
        stdout,
        "Average chunk length: {:.1} chars",
        store.average_text_chars()
    )?;
    Ok(())
}
