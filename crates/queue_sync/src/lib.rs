//! Client-side state for barber queue pages.
//!
//! A page owns a [`SnapshotStore`] that polls the queue service while the page
//! is active, and an [`ActionDispatcher`] that turns user intents into REST
//! calls followed by a fresh fetch. The server is the only source of truth.

use std::fmt;
use std::time::Duration;

mod dispatcher;
mod prompt;
mod snapshot;
mod store;

pub use dispatcher::{
    Action, ActionDispatcher, ActionError, DELETE_BARBER_PROMPT, JOIN_SUCCESS_MESSAGE,
    Precondition, REMOVE_ENTRY_PROMPT,
};
pub use prompt::{Prompter, ScriptedPrompter};
pub use snapshot::{InProgress, Snapshot};
pub use store::{PollHandle, SnapshotStore};

/// The two pages of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Customer,
    Dashboard,
}

impl Page {
    pub fn path(&self) -> &'static str {
        match self {
            Page::Customer => "/",
            Page::Dashboard => "/dashboard",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Customer => "Welcome to Color Cut and More",
            Page::Dashboard => "Shop Dashboard",
        }
    }

    /// How often the page refreshes while it is active.
    pub fn default_poll_interval(&self) -> Duration {
        match self {
            Page::Customer => Duration::from_secs(5),
            Page::Dashboard => Duration::from_secs(3),
        }
    }

    /// Resolve a route; unknown paths fall back to the customer page.
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/dashboard" | "dashboard" => Page::Dashboard,
            _ => Page::Customer,
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
