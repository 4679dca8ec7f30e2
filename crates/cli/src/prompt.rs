//! Terminal prompts.

use async_trait::async_trait;
use queue_sync::Prompter;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::warn;

/// Asks on stderr and reads the answer from stdin.
pub struct TerminalPrompter {
    assume_yes: bool,
}

impl TerminalPrompter {
    /// With `assume_yes`, every confirmation is answered yes without asking.
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

/// Whether a typed answer means yes.
pub(crate) fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        let mut stderr = tokio::io::stderr();
        let question = format!("{message} [y/N] ");
        if let Err(e) = stderr.write_all(question.as_bytes()).await {
            warn!(error = %e, "failed to write prompt");
            return false;
        }
        let _ = stderr.flush().await;

        let mut answer = String::new();
        match BufReader::new(tokio::io::stdin()).read_line(&mut answer).await {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                warn!(error = %e, "failed to read answer");
                false
            }
        }
    }

    async fn alert(&self, message: &str) {
        eprintln!("{message}");
    }
}
