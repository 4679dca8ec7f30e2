//! Action dispatcher: user intents to REST calls.
//!
//! Every action is fetch-after-write: one request, then on success an
//! unconditional store refresh. Nothing is applied to the snapshot before the
//! server confirms it, so a failed action leaves the snapshot untouched.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use queue_client::{QueueApi, RequestError};
use queue_types::{Barber, BarberForm, JoinForm, QueueEntry, ValidationError};
use thiserror::Error;
use tracing::{info, warn};

use crate::{Prompter, SnapshotStore};

pub const JOIN_SUCCESS_MESSAGE: &str = "Successfully joined the queue!";
pub const DELETE_BARBER_PROMPT: &str = "Are you sure you want to delete this barber?";
pub const REMOVE_ENTRY_PROMPT: &str = "Remove this customer from queue?";

/// State-changing actions a user can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    JoinQueue,
    SaveBarber,
    DeleteBarber,
    CallNext,
    CompleteService,
    RemoveFromQueue,
}

impl Action {
    /// Alert text shown when the request fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Action::JoinQueue => "Failed to join queue. Please try again.",
            Action::SaveBarber => "Failed to save barber",
            Action::DeleteBarber => "Failed to delete barber",
            Action::CallNext => "No customers in queue or barber is busy",
            Action::CompleteService => "Failed to complete service",
            Action::RemoveFromQueue => "Failed to remove from queue",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Action::JoinQueue => "join_queue",
            Action::SaveBarber => "save_barber",
            Action::DeleteBarber => "delete_barber",
            Action::CallNext => "call_next",
            Action::CompleteService => "complete_service",
            Action::RemoveFromQueue => "remove_from_queue",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Client-side checks that gate an action before any request is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    #[error("Barber not found: {0}")]
    UnknownBarber(String),

    #[error("Barber {0} is busy")]
    BarberBusy(String),

    #[error("No customers in queue")]
    QueueEmpty,

    #[error("Queue entry {0} is not being served")]
    NotInProgress(String),
}

/// Errors from dispatched actions.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Precondition(#[from] Precondition),

    #[error("Cancelled by user")]
    Cancelled,

    #[error("{}: {source}", .action.failure_message())]
    Request {
        action: Action,
        #[source]
        source: RequestError,
    },

    /// The server accepted the write but its response body was unreadable.
    #[error("{action} was accepted but the response could not be read: {source}")]
    Unconfirmed {
        action: Action,
        #[source]
        source: RequestError,
    },
}

/// Result type for dispatched actions.
pub type Result<T> = std::result::Result<T, ActionError>;

/// Runs user actions against the queue service for one page.
pub struct ActionDispatcher<A: ?Sized> {
    api: Arc<A>,
    store: Arc<SnapshotStore<A>>,
    prompter: Arc<dyn Prompter>,
}

impl<A> ActionDispatcher<A>
where
    A: QueueApi + ?Sized + 'static,
{
    pub fn new(store: Arc<SnapshotStore<A>>, prompter: Arc<dyn Prompter>) -> Self {
        Self {
            api: Arc::clone(store.api()),
            store,
            prompter,
        }
    }

    pub fn store(&self) -> &Arc<SnapshotStore<A>> {
        &self.store
    }

    /// User-triggered refresh.
    pub async fn refresh(&self) -> bool {
        self.store.refresh().await
    }

    /// Join the queue with the customer form.
    pub async fn join_queue(&self, form: &JoinForm) -> Result<QueueEntry> {
        let body = form.validate()?;
        let entry = self
            .perform(Action::JoinQueue, self.api.join_queue(&body))
            .await?;
        self.prompter.alert(JOIN_SUCCESS_MESSAGE).await;
        Ok(entry)
    }

    /// Create a barber, or update one when `id` is given.
    pub async fn save_barber(&self, id: Option<&str>, form: &BarberForm) -> Result<Barber> {
        let body = form.validate()?;
        match id {
            Some(id) => {
                self.perform(Action::SaveBarber, self.api.update_barber(id, &body))
                    .await
            }
            None => {
                self.perform(Action::SaveBarber, self.api.create_barber(&body))
                    .await
            }
        }
    }

    /// Delete a barber after the user confirms.
    pub async fn delete_barber(&self, id: &str) -> Result<()> {
        if !self.prompter.confirm(DELETE_BARBER_PROMPT).await {
            return Err(ActionError::Cancelled);
        }
        self.perform(Action::DeleteBarber, self.api.delete_barber(id))
            .await
    }

    /// Assign the head of the queue to an available barber.
    pub async fn call_next(&self, barber_id: &str) -> Result<QueueEntry> {
        self.check_call_next(barber_id)?;
        self.perform(Action::CallNext, self.api.call_next(barber_id))
            .await
    }

    /// Whether call-next is currently allowed for the barber.
    pub fn check_call_next(&self, barber_id: &str) -> std::result::Result<(), Precondition> {
        let snapshot = self.store.current();
        let barber = snapshot
            .barber(barber_id)
            .ok_or_else(|| Precondition::UnknownBarber(barber_id.to_string()))?;
        if !barber.is_available() {
            return Err(Precondition::BarberBusy(barber.name.clone()));
        }
        if snapshot.is_queue_empty() {
            return Err(Precondition::QueueEmpty);
        }
        Ok(())
    }

    /// Finish the service for an entry a busy barber is serving.
    pub async fn complete_service(&self, entry_id: &str) -> Result<QueueEntry> {
        if self.store.current().serving(entry_id).is_none() {
            return Err(Precondition::NotInProgress(entry_id.to_string()).into());
        }
        self.perform(Action::CompleteService, self.api.complete_service(entry_id))
            .await
    }

    /// Remove a customer from the queue after the user confirms.
    pub async fn remove_from_queue(&self, entry_id: &str) -> Result<()> {
        if !self.prompter.confirm(REMOVE_ENTRY_PROMPT).await {
            return Err(ActionError::Cancelled);
        }
        self.perform(Action::RemoveFromQueue, self.api.remove_from_queue(entry_id))
            .await
    }

    async fn perform<T, F>(&self, action: Action, request: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, RequestError>> + Send,
    {
        match request.await {
            Ok(value) => {
                info!(%action, "action succeeded");
                self.store.refresh().await;
                Ok(value)
            }
            // A 2xx whose body failed to decode still changed the server
            Err(source @ RequestError::Decode(_)) => {
                warn!(%action, error = %source, "action response unreadable, refreshing");
                self.store.refresh().await;
                Err(ActionError::Unconfirmed { action, source })
            }
            Err(source) => {
                warn!(%action, error = %source, "action failed");
                self.prompter.alert(action.failure_message()).await;
                Err(ActionError::Request { action, source })
            }
        }
    }
}
