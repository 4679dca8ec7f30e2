//! Commands typed into a live page.
//!
//! A live page reads one command per line and runs it through a dispatcher
//! bound to the page's own store, so the redraw after an action shows the
//! refreshed state. Alerts and outcomes are kept as notices under the page.

use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Result, bail};
use async_trait::async_trait;
use queue_client::QueueApi;
use queue_sync::{ActionDispatcher, ActionError, Page, Prompter};
use queue_types::{JoinForm, ServiceType};
use tokio::io::{AsyncBufRead, Lines};
use tracing::warn;

use crate::prompt::is_yes;

/// Line input shared by the command loop and confirmation prompts.
pub type Input<R> = Arc<tokio::sync::Mutex<Lines<R>>>;

/// One line typed into a live page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCommand {
    Refresh,
    Help,
    Quit,
    Join { name: String, service: String },
    CallNext(String),
    Complete(String),
    Remove(String),
    DeleteBarber(String),
}

impl ViewCommand {
    /// Parse a non-empty line, rejecting commands the page does not offer.
    pub fn parse(line: &str, page: Page) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "r" | "refresh" => Self::Refresh,
            "h" | "help" | "?" => Self::Help,
            "q" | "quit" => Self::Quit,
            "join" => {
                if rest.is_empty() {
                    bail!("Usage: join <name>[, <service>]");
                }
                let (name, service) = match rest.split_once(',') {
                    Some((name, service)) => (name.trim(), service.trim().to_string()),
                    None => (rest, ServiceType::default().to_string()),
                };
                Self::Join {
                    name: name.to_string(),
                    service,
                }
            }
            "call" => Self::CallNext(argument(rest, "call <barber-id>")?),
            "complete" => Self::Complete(argument(rest, "complete <entry-id>")?),
            "remove" => Self::Remove(argument(rest, "remove <entry-id>")?),
            "delete-barber" => Self::DeleteBarber(argument(rest, "delete-barber <barber-id>")?),
            other => bail!("Unknown command: {other} (type help)"),
        };

        if !command.available_on(page) {
            bail!("{word} is not available on this page");
        }
        Ok(command)
    }

    fn available_on(&self, page: Page) -> bool {
        match self {
            Self::Refresh | Self::Help | Self::Quit => true,
            Self::Join { .. } => page == Page::Customer,
            Self::CallNext(_) | Self::Complete(_) | Self::Remove(_) | Self::DeleteBarber(_) => {
                page == Page::Dashboard
            }
        }
    }
}

fn argument(rest: &str, usage: &str) -> Result<String> {
    match rest.split_whitespace().next() {
        Some(id) => Ok(id.to_string()),
        None => bail!("Usage: {usage}"),
    }
}

/// Commands offered on a page.
pub fn help(page: Page) -> &'static str {
    match page {
        Page::Customer => "Commands: join <name>[, <service>] | r | help | q",
        Page::Dashboard => {
            "Commands: call <barber-id> | complete <entry-id> | remove <entry-id> | \
             delete-barber <barber-id> | r | help | q"
        }
    }
}

/// Prompter for a live page: confirmations read the next input line, alerts
/// become notices drawn under the page.
pub struct SessionPrompter<R> {
    input: Input<R>,
    notices: Mutex<Vec<String>>,
}

impl<R> SessionPrompter<R> {
    pub fn new(input: Input<R>) -> Self {
        Self {
            input,
            notices: Mutex::new(Vec::new()),
        }
    }

    pub fn notify(&self, message: impl Into<String>) {
        self.lock_notices().push(message.into());
    }

    pub fn clear_notices(&self) {
        self.lock_notices().clear();
    }

    pub fn notices(&self) -> Vec<String> {
        self.lock_notices().clone()
    }

    fn lock_notices(&self) -> MutexGuard<'_, Vec<String>> {
        self.notices
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl<R> Prompter for SessionPrompter<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    async fn confirm(&self, message: &str) -> bool {
        eprint!("{message} [y/N] ");
        let _ = std::io::stderr().flush();
        read_line(&self.input).await.is_some_and(|answer| is_yes(&answer))
    }

    async fn alert(&self, message: &str) {
        self.notify(message);
    }
}

/// Next input line; `None` at end of input or on a read error.
pub async fn read_line<R>(input: &Input<R>) -> Option<String>
where
    R: AsyncBufRead + Unpin,
{
    match input.lock().await.next_line().await {
        Ok(line) => line,
        Err(e) => {
            warn!(error = %e, "failed to read input");
            None
        }
    }
}

/// Run one command through the page's dispatcher, leaving its outcome as a notice.
pub async fn execute<A, R>(
    dispatcher: &ActionDispatcher<A>,
    prompter: &SessionPrompter<R>,
    page: Page,
    command: ViewCommand,
) where
    A: QueueApi + ?Sized + 'static,
{
    let outcome = match command {
        // Handled by the command loop
        ViewCommand::Quit => return,
        ViewCommand::Help => {
            prompter.notify(help(page));
            return;
        }
        ViewCommand::Refresh => {
            if !dispatcher.refresh().await {
                prompter.notify("Refresh failed; showing the last loaded state");
            }
            return;
        }
        action => {
            // Call-next and complete check against the snapshot
            if !dispatcher.store().current().is_loaded() {
                dispatcher.refresh().await;
            }
            run_action(dispatcher, action).await
        }
    };

    match outcome {
        Ok(message) => prompter.notify(message),
        // The dispatcher has already alerted
        Err(ActionError::Request { .. }) => {}
        Err(e) => prompter.notify(e.to_string()),
    }
}

async fn run_action<A>(
    dispatcher: &ActionDispatcher<A>,
    command: ViewCommand,
) -> std::result::Result<String, ActionError>
where
    A: QueueApi + ?Sized + 'static,
{
    match command {
        ViewCommand::Join { name, service } => dispatcher
            .join_queue(&JoinForm::new(name, service))
            .await
            .map(|entry| {
                format!(
                    "{} joined the queue at position {} (ID: {})",
                    entry.customer_name, entry.position, entry.id
                )
            }),
        ViewCommand::CallNext(barber_id) => dispatcher
            .call_next(&barber_id)
            .await
            .map(|entry| format!("Now serving {} ({})", entry.customer_name, entry.service_type)),
        ViewCommand::Complete(entry_id) => dispatcher
            .complete_service(&entry_id)
            .await
            .map(|entry| format!("Completed service for {}", entry.customer_name)),
        ViewCommand::Remove(entry_id) => dispatcher
            .remove_from_queue(&entry_id)
            .await
            .map(|()| format!("Removed {entry_id} from the queue")),
        ViewCommand::DeleteBarber(barber_id) => dispatcher
            .delete_barber(&barber_id)
            .await
            .map(|()| format!("Deleted barber {barber_id}")),
        ViewCommand::Refresh | ViewCommand::Help | ViewCommand::Quit => Ok(String::new()),
    }
}
