//! Yes/no confirmation as an injectable capability, so interactive
//! reconciliation never binds the engine to a real terminal.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::io;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

/// Affirmative answers are case-insensitive `y` or `yes`; everything else,
/// including an empty line, declines.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[async_trait]
pub trait Confirmer: Send + Sync {
    /// Pose a question and wait for an answer line. `Ok(None)` means the
    /// input stream ended; callers treat that as declining everything that
    /// remains.
    async fn ask(&self, prompt: &str) -> io::Result<Option<String>>;
}

/// Confirmer over the process stdin/stdout.
pub struct StdioConfirmer {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl StdioConfirmer {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }
}

impl Default for StdioConfirmer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Confirmer for StdioConfirmer {
    async fn ask(&self, prompt: &str) -> io::Result<Option<String>> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;

        self.lines.lock().await.next_line().await
    }
}

/// Replays a fixed list of answers, then reports end-of-input. Used by
/// tests and scripted invocations.
pub struct ScriptedConfirmer {
    answers: Mutex<VecDeque<String>>,
}

impl ScriptedConfirmer {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
        }
    }
}

#[async_trait]
impl Confirmer for ScriptedConfirmer {
    async fn ask(&self, _prompt: &str) -> io::Result<Option<String>> {
        Ok(self.answers.lock().await.pop_front())
    }
}
