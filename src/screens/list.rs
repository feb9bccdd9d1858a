//! Session list screen

use crate::error::Result;
use crate::prompt::Confirm;
use crate::screens::{validate_name, Navigation};
use crate::sessions::{sort_by_recent, Session, SessionStore, SessionSummary};
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;

/// What the list screen is showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState {
    Loading,
    /// Summaries, most recently updated first
    Ready(Vec<SessionSummary>),
    Error(String),
}

/// Browse, create and delete sessions
pub struct ListScreen {
    store: Arc<SessionStore>,
    max_name_length: usize,
    state: ListState,
}

impl ListScreen {
    pub fn new(store: Arc<SessionStore>, max_name_length: usize) -> Self {
        Self {
            store,
            max_name_length,
            state: ListState::Loading,
        }
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    /// Summaries currently shown; empty unless the screen is `Ready`
    pub fn sessions(&self) -> &[SessionSummary] {
        match &self.state {
            ListState::Ready(sessions) => sessions,
            _ => &[],
        }
    }

    /// Reload summaries from the store
    pub async fn refresh(&mut self) -> &ListState {
        self.state = match self.store.list_summaries().await {
            Ok(mut sessions) => {
                sort_by_recent(&mut sessions);
                ListState::Ready(sessions)
            }
            Err(e) => {
                tracing::error!(error = %e, "Error loading sessions");
                ListState::Error(format!("Failed to load sessions: {}", e))
            }
        };
        &self.state
    }

    /// Create a session named `name` and open it
    ///
    /// # Errors
    ///
    /// `TallyError::Validation` for a blank or overlong name (nothing is
    /// stored), or the store's error if the write fails
    pub async fn create(&mut self, name: &str) -> Result<Navigation> {
        let name = validate_name(name, self.max_name_length)?;
        let session = Session::new(self.store.generate_id(), name, Utc::now());
        let id = session.id.clone();

        self.store
            .upsert(session)
            .await
            .context("Failed to create session")?;
        tracing::info!(id = %id, "Created session");

        Ok(Navigation::OpenDetail(id))
    }

    /// Navigation target for tapping a session
    pub fn open(&self, id: &str) -> Navigation {
        Navigation::OpenDetail(id.to_string())
    }

    /// Delete a session after the user confirms
    ///
    /// # Returns
    ///
    /// `false` if the user declined; nothing is deleted in that case
    ///
    /// # Errors
    ///
    /// The store's error if the write fails; the list is left as it was
    pub async fn delete(&mut self, id: &str, confirm: &dyn Confirm) -> Result<bool> {
        if !confirm
            .confirm(
                "Delete Session",
                "Are you sure you want to delete this session?",
            )
            .await
        {
            return Ok(false);
        }

        self.store
            .delete_by_id(id)
            .await
            .context("Failed to delete session")?;
        tracing::info!(id, "Deleted session");

        self.refresh().await;
        Ok(true)
    }
}
