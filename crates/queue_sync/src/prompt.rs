//! Blocking user interaction: confirmations and alerts.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

/// Asks the user to confirm destructive actions and shows failure notices.
///
/// Both calls block the action that triggered them until the user responds.
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Ask a yes/no question; `false` cancels the action.
    async fn confirm(&self, message: &str) -> bool;

    /// Show a notification the user must acknowledge.
    async fn alert(&self, message: &str);
}

/// Prompter with pre-scripted answers that records everything it was asked.
///
/// Once the scripted answers run out, `confirm` returns the fallback.
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<bool>>,
    fallback: bool,
    confirmations: Mutex<Vec<String>>,
    alerts: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    /// Answer every confirmation with `answer`.
    pub fn always(answer: bool) -> Self {
        Self::with_answers([], answer)
    }

    pub fn with_answers(answers: impl IntoIterator<Item = bool>, fallback: bool) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            fallback,
            confirmations: Mutex::new(Vec::new()),
            alerts: Mutex::new(Vec::new()),
        }
    }

    /// Confirmation questions asked so far.
    pub fn confirmations(&self) -> Vec<String> {
        lock(&self.confirmations).clone()
    }

    /// Alerts shown so far.
    pub fn alerts(&self) -> Vec<String> {
        lock(&self.alerts).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn confirm(&self, message: &str) -> bool {
        lock(&self.confirmations).push(message.to_string());
        lock(&self.answers).pop_front().unwrap_or(self.fallback)
    }

    async fn alert(&self, message: &str) {
        lock(&self.alerts).push(message.to_string());
    }
}
