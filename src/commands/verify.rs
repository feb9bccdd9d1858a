//! Integrity check for the stored session collection
//!
//! Listing sessions hides unreadable data behind an empty list. This
//! command reads the collection strictly so corruption is reported
//! instead of looking like "no sessions".

use crate::error::{Result, TallyError};
use crate::sessions::{Session, SessionStore};
use colored::Colorize;
use std::collections::HashSet;

/// Findings from reading the collection strictly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    pub sessions: usize,
    pub duplicate_ids: Vec<String>,
    pub blank_names: Vec<String>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.duplicate_ids.is_empty() && self.blank_names.is_empty()
    }
}

/// Inspect an already-decoded collection
pub fn inspect(sessions: &[Session]) -> VerifyReport {
    let mut seen = HashSet::new();
    let mut duplicate_ids = Vec::new();
    for session in sessions {
        if !seen.insert(session.id.as_str()) && !duplicate_ids.contains(&session.id) {
            duplicate_ids.push(session.id.clone());
        }
    }

    let blank_names = sessions
        .iter()
        .filter(|s| s.name.trim().is_empty())
        .map(|s| s.id.clone())
        .collect();

    VerifyReport {
        sessions: sessions.len(),
        duplicate_ids,
        blank_names,
    }
}

/// Run the verify command
///
/// # Errors
///
/// Returns `TallyError::CorruptData` when the collection cannot be
/// decoded, or when it decodes but breaks id uniqueness
pub async fn run_verify(store: &SessionStore) -> Result<()> {
    let sessions = match store.load_checked().await {
        Ok(sessions) => sessions,
        Err(e) => {
            println!("{}", format!("Session data under '{}' is unreadable", store.key()).red());
            return Err(e);
        }
    };

    let report = inspect(&sessions);
    for id in &report.blank_names {
        println!("{}", format!("Session {} has a blank name", id).yellow());
    }

    if !report.duplicate_ids.is_empty() {
        for id in &report.duplicate_ids {
            println!("{}", format!("Duplicate session id {}", id).red());
        }
        return Err(TallyError::CorruptData(format!(
            "{} duplicate session id(s)",
            report.duplicate_ids.len()
        ))
        .into());
    }

    println!(
        "{}",
        format!("OK: {} session(s) readable", report.sessions).green()
    );
    Ok(())
}
