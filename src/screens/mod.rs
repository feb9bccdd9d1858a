//! Screen controllers
//!
//! The two screens of the app, minus any rendering: each one owns an
//! explicit state (`Loading` until the first load, then a terminal state
//! such as `Ready` or `NotFound`) and exposes the user's actions as
//! async methods that go through the [`SessionStore`](crate::sessions::SessionStore).
//!
//! - [`ListScreen`] -- browse, create and delete sessions
//! - [`DetailScreen`] -- count, reset, rename and attach a photo

use crate::error::{Result, TallyError};

pub mod detail;
pub mod list;

pub use detail::{DetailScreen, DetailState};
pub use list::{ListScreen, ListState};

/// Where a screen action wants to go next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Open the detail screen for the given session id
    OpenDetail(String),
    /// Leave the current screen
    Back,
}

/// Trim `input` and check it is a usable session name
///
/// # Errors
///
/// `TallyError::Validation` if the trimmed name is empty or longer than
/// `max_len` characters
pub fn validate_name(input: &str, max_len: usize) -> Result<String> {
    let name = input.trim();
    if name.is_empty() {
        return Err(TallyError::Validation("Please enter a session name".to_string()).into());
    }
    if name.chars().count() > max_len {
        return Err(TallyError::Validation(format!(
            "Session name must be at most {} characters",
            max_len
        ))
        .into());
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::tally_error;

    #[test]
    fn test_validate_name_trims() {
        assert_eq!(validate_name("  Laps \n", 50).unwrap(), "Laps");
    }

    #[test]
    fn test_validate_name_rejects_blank() {
        for input in ["", "   ", "\t\n"] {
            let err = validate_name(input, 50).unwrap_err();
            assert!(matches!(tally_error(&err), Some(TallyError::Validation(_))));
        }
    }

    #[test]
    fn test_validate_name_counts_characters_not_bytes() {
        let name = "é".repeat(50);
        assert!(validate_name(&name, 50).is_ok());
        assert!(validate_name(&format!("{}x", name), 50).is_err());
    }
}
