//! Session detail screen

use crate::error::{Result, TallyError};
use crate::picker::{ImagePicker, PermissionStatus, PickOptions, PickResult};
use crate::prompt::Confirm;
use crate::screens::validate_name;
use crate::sessions::{Session, SessionStore};
use anyhow::Context;
use std::sync::Arc;

/// What the detail screen is showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailState {
    Loading,
    Ready(Session),
    /// No id was given, or no session has it
    NotFound,
    /// The store could not be read
    Error(String),
}

/// One session: count, reset, rename, attach a photo
///
/// Every mutation copies the loaded session, changes the copy, writes it
/// through the store and then replaces the loaded session with what the
/// store returned. When the write fails the loaded session is untouched.
pub struct DetailScreen {
    store: Arc<SessionStore>,
    max_name_length: usize,
    pick_options: PickOptions,
    state: DetailState,
}

impl DetailScreen {
    pub fn new(store: Arc<SessionStore>, max_name_length: usize, pick_options: PickOptions) -> Self {
        Self {
            store,
            max_name_length,
            pick_options,
            state: DetailState::Loading,
        }
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    /// The loaded session, if the screen is `Ready`
    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            DetailState::Ready(session) => Some(session),
            _ => None,
        }
    }

    /// Load the session named by the route parameter
    ///
    /// # Errors
    ///
    /// `TallyError::NotFound` when `id` is missing or unknown; the store's
    /// error when it cannot be read. Either way the caller should go back.
    pub async fn load(&mut self, id: Option<&str>) -> Result<&Session> {
        let Some(id) = id.filter(|id| !id.is_empty()) else {
            self.state = DetailState::NotFound;
            return Err(TallyError::NotFound("No session ID provided".to_string()).into());
        };

        match self.store.get_by_id(id).await {
            Ok(Some(session)) => {
                self.state = DetailState::Ready(session);
            }
            Ok(None) => {
                self.state = DetailState::NotFound;
                return Err(TallyError::NotFound(id.to_string()).into());
            }
            Err(e) => {
                self.state = DetailState::Error(format!("Failed to load session: {}", e));
                return Err(e.context("Failed to load session"));
            }
        }

        self.current()
    }

    /// Add exactly one to the count
    pub async fn increment(&mut self) -> Result<Session> {
        let mut updated = self.current()?.clone();
        updated.count = updated.count.saturating_add(1);
        self.save(updated).await
    }

    /// Set the count back to zero once the user confirms
    ///
    /// # Returns
    ///
    /// `false` if the user declined
    pub async fn reset(&mut self, confirm: &dyn Confirm) -> Result<bool> {
        let mut updated = self.current()?.clone();
        if !confirm
            .confirm(
                "Reset Counter",
                "Are you sure you want to reset the counter to 0?",
            )
            .await
        {
            return Ok(false);
        }

        updated.count = 0;
        self.save(updated).await?;
        Ok(true)
    }

    /// Replace the attached photo with one the user picks
    ///
    /// # Returns
    ///
    /// `false` if the user cancelled the pick
    ///
    /// # Errors
    ///
    /// `TallyError::PermissionDenied` if library access was refused
    pub async fn change_image(&mut self, picker: &dyn ImagePicker) -> Result<bool> {
        let mut updated = self.current()?.clone();

        if picker.request_permission().await? == PermissionStatus::Denied {
            return Err(TallyError::PermissionDenied(
                "Permission to access camera roll is required!".to_string(),
            )
            .into());
        }

        match picker.pick(&self.pick_options).await? {
            PickResult::Cancelled => Ok(false),
            PickResult::Picked { uri } => {
                let previous = updated.image.replace(uri.clone());
                if let Err(e) = self.save(updated).await {
                    release_image(picker, &uri).await;
                    return Err(e);
                }
                if let Some(previous) = previous.filter(|p| *p != uri) {
                    release_image(picker, &previous).await;
                }
                Ok(true)
            }
        }
    }

    /// Rename the session
    ///
    /// # Errors
    ///
    /// `TallyError::Validation` for a blank or overlong name; nothing is
    /// written
    pub async fn rename(&mut self, name: &str) -> Result<Session> {
        let mut updated = self.current()?.clone();
        updated.name = validate_name(name, self.max_name_length)?;
        self.save(updated).await
    }

    fn current(&self) -> Result<&Session> {
        self.session()
            .ok_or_else(|| TallyError::NotFound("No session loaded".to_string()).into())
    }

    async fn save(&mut self, updated: Session) -> Result<Session> {
        let stored = self
            .store
            .upsert(updated)
            .await
            .context("Failed to save session")?;
        self.state = DetailState::Ready(stored.clone());
        Ok(stored)
    }
}

async fn release_image(picker: &dyn ImagePicker, uri: &str) {
    if let Err(e) = picker.discard(uri).await {
        tracing::warn!(uri, error = %e, "Failed to discard image");
    }
}
