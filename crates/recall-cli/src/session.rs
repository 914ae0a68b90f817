//! Interactive question loop.

use anyhow::Result;
use console::style;
use recall_retrieval::{Encoder, Retriever, SearchIndex, format_result};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt as _};

/// Prompt shown before every question
pub const PROMPT: &str = "Ask your question: ";

const SEPARATOR: &str = "---------------------------------------------";

/// Whether the loop is still accepting questions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the next question
    Running,
    /// Exit command or end of input seen
    Terminated,
}

/// Classified line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// `exit` or `quit`, any case
    Exit,
    /// Nothing but whitespace
    Blank,
    /// Text to search for, trimmed
    Question(String),
}

impl Input {
    /// Classify a raw input line
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            Self::Blank
        } else if is_exit_command(trimmed) {
            Self::Exit
        } else {
            Self::Question(trimmed.to_owned())
        }
    }
}

/// True for `exit` and `quit` in any letter case
pub fn is_exit_command(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit")
}

/// Display settings for a session
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Results per question
    pub top_k: usize,
    /// Maximum snippet length in characters
    pub snippet_chars: usize,
    /// Questions listed in the introduction
    pub sample_questions: Vec<String>,
}

/// Counters reported when the loop ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Questions that produced results
    pub answered: usize,
    /// Questions whose retrieval failed
    pub failed: usize,
}

/// Interactive session over a retriever built at startup
pub struct Session<'session, E: Encoder, I: SearchIndex> {
    retriever: &'session Retriever<E, I>,
    options: SessionOptions,
    state: SessionState,
    summary: SessionSummary,
}

impl<'session, E: Encoder, I: SearchIndex> Session<'session, E, I> {
    /// Create a session in the running state
    pub fn new(retriever: &'session Retriever<E, I>, options: SessionOptions) -> Self {
        Self {
            retriever,
            options,
            state: SessionState::Running,
            summary: SessionSummary::default(),
        }
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Print the introduction and sample questions
    ///
    /// # Errors
    /// Returns an error if writing to `output` fails
    pub fn write_intro<W: Write>(&self, output: &mut W) -> Result<()> {
        writeln!(
            output,
            "\n{}",
            style("Welcome to your RAG-based teaching assistant!").bold()
        )?;
        writeln!(
            output,
            "This assistant retrieves relevant transcript chunks ({} indexed).",
            self.retriever.len()
        )?;
        writeln!(output, "{SEPARATOR}")?;

        if !self.options.sample_questions.is_empty() {
            writeln!(output, "\nTry asking one of these sample questions:\n")?;
            for question in &self.options.sample_questions {
                writeln!(output, "  \u{27a4} {question}")?;
            }
        }
        writeln!(output, "\n(Type 'exit' or 'quit' anytime to stop.)")?;
        Ok(())
    }

    /// Run until an exit command or end of input
    ///
    /// Retrieval failures are reported on `output` and the loop continues.
    ///
    /// # Errors
    /// Returns an error if reading input or writing output fails
    pub async fn run<R, W>(&mut self, input: R, output: &mut W) -> Result<SessionSummary>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();

        while self.state == SessionState::Running {
            write!(output, "\n{PROMPT}")?;
            output.flush()?;

            let Some(line) = lines.next_line().await? else {
                writeln!(output)?;
                self.state = SessionState::Terminated;
                break;
            };

            match Input::parse(&line) {
                Input::Exit => {
                    writeln!(output, "\nExiting assistant. Goodbye!")?;
                    self.state = SessionState::Terminated;
                }
                Input::Blank => {}
                Input::Question(question) => self.answer(&question, output).await?,
            }
        }

        tracing::info!(
            "Session ended: {} answered, {} failed",
            self.summary.answered,
            self.summary.failed
        );
        Ok(self.summary)
    }

    async fn answer<W: Write>(&mut self, question: &str, output: &mut W) -> Result<()> {
        match self.retriever.retrieve(question, self.options.top_k).await {
            Ok(results) => {
                self.summary.answered += 1;
                writeln!(output, "\nTop relevant transcript snippets:\n")?;
                for chunk in &results {
                    writeln!(output, "{}", format_result(chunk, self.options.snippet_chars))?;
                }
                writeln!(output, "\n{SEPARATOR}")?;
            }
            Err(error) => {
                self.summary.failed += 1;
                tracing::warn!("Retrieval failed for {question:?}: {error}");
                writeln!(output, "\nCould not answer that question: {error}")?;
            }
        }
        Ok(())
    }
}
