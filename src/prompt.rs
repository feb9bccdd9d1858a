//! User confirmation and line input
//!
//! Destructive actions (resetting a count, deleting a session) ask the
//! user first through the [`Confirm`] trait. The CLI answers it on the
//! terminal with `rustyline`, or unconditionally with [`AssumeYes`] when
//! `--yes` is passed.

use crate::error::{Result, TallyError};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Asks the user to confirm a destructive action
#[async_trait::async_trait]
pub trait Confirm: Send + Sync {
    /// Returns `true` only if the user explicitly agreed
    async fn confirm(&self, title: &str, message: &str) -> bool;
}

/// Confirms everything without asking
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

#[async_trait::async_trait]
impl Confirm for AssumeYes {
    async fn confirm(&self, title: &str, _message: &str) -> bool {
        tracing::debug!(title, "Auto-confirmed");
        true
    }
}

/// Asks a y/N question on the terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConfirm;

#[async_trait::async_trait]
impl Confirm for TerminalConfirm {
    async fn confirm(&self, title: &str, message: &str) -> bool {
        println!("{}", title.bold());
        let prompt = format!("{} [y/N] ", message);
        match read_line(prompt).await {
            Ok(Some(answer)) => is_affirmative(&answer),
            Ok(None) => false,
            Err(e) => {
                tracing::error!("Readline error: {}", e);
                false
            }
        }
    }
}

/// Whether a typed answer means "yes"
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Read one line from the terminal
///
/// # Returns
///
/// `Ok(None)` if the user pressed Ctrl-C or Ctrl-D
///
/// # Errors
///
/// Returns `TallyError::Io` if the terminal cannot be read
pub async fn read_line(prompt: String) -> Result<Option<String>> {
    tokio::task::spawn_blocking(move || -> Result<Option<String>> {
        let mut rl = DefaultEditor::new()
            .map_err(|e| TallyError::Io(io_error(e)))?;
        match rl.readline(&prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(TallyError::Io(io_error(err)).into()),
        }
    })
    .await
    .map_err(|e| TallyError::Io(io_error(e)))?
}

fn io_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_affirmative_accepts_yes_variants() {
        assert!(is_affirmative("y"));
        assert!(is_affirmative("Y"));
        assert!(is_affirmative(" yes "));
        assert!(is_affirmative("YES"));
    }

    #[test]
    fn test_is_affirmative_rejects_everything_else() {
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative("no"));
        assert!(!is_affirmative("yep"));
    }

    #[tokio::test]
    async fn test_assume_yes_always_confirms() {
        assert!(AssumeYes.confirm("Reset Counter", "Sure?").await);
    }
}
