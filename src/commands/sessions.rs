//! Session command handlers
//!
//! Each handler maps one CLI command onto a screen action and prints the
//! outcome.

use crate::commands::resolve_id;
use crate::config::Config;
use crate::error::{Result, TallyError};
use crate::picker::{FileImagePicker, PickOptions};
use crate::prompt::{AssumeYes, Confirm, TerminalConfirm};
use crate::screens::{DetailScreen, ListScreen, Navigation};
use crate::sessions::{Session, SessionStore, SessionSummary};
use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use prettytable::{format, row, Table};
use std::path::PathBuf;
use std::sync::Arc;

/// Print every session, most recently updated first
pub async fn list_sessions(store: Arc<SessionStore>, config: &Config, json: bool) -> Result<()> {
    let mut screen = ListScreen::new(store, config.ui.max_name_length);
    screen.refresh().await;
    if let crate::screens::ListState::Error(message) = screen.state() {
        return Err(TallyError::Storage(message.clone()).into());
    }

    let sessions = screen.sessions();
    if json {
        let json = serde_json::to_string_pretty(sessions).map_err(TallyError::Serialization)?;
        println!("{}", json);
        return Ok(());
    }

    if sessions.is_empty() {
        println!("{}", "No Sessions Yet".yellow());
        println!("Create your first counter session to get started:");
        println!("  {}", "tallykeeper create <NAME>".cyan());
        return Ok(());
    }

    println!("\nCounter Sessions:");
    sessions_table(sessions).printstd();
    println!();
    Ok(())
}

/// Create a session, then show it
pub async fn create_session(store: Arc<SessionStore>, config: &Config, name: &str) -> Result<()> {
    let mut screen = ListScreen::new(store.clone(), config.ui.max_name_length);
    let Navigation::OpenDetail(id) = screen.create(name).await? else {
        return Ok(());
    };

    println!("{}", format!("Created session {}", id).green());
    show_session(store, config, &id, false).await
}

/// Print one session
pub async fn show_session(
    store: Arc<SessionStore>,
    config: &Config,
    id: &str,
    json: bool,
) -> Result<()> {
    let screen = load_detail(store, config, id).await?;
    let Some(session) = screen.session() else {
        return Ok(());
    };

    if json {
        let json = serde_json::to_string_pretty(session).map_err(TallyError::Serialization)?;
        println!("{}", json);
    } else {
        print_session(session);
    }
    Ok(())
}

/// Add one to a session's count
pub async fn increment_session(store: Arc<SessionStore>, config: &Config, id: &str) -> Result<()> {
    let mut screen = load_detail(store, config, id).await?;
    let session = screen.increment().await?;
    println!("{} {}", session.name.bold(), session.count.to_string().green());
    Ok(())
}

/// Reset a session's count after confirmation
pub async fn reset_session(
    store: Arc<SessionStore>,
    config: &Config,
    id: &str,
    yes: bool,
) -> Result<()> {
    let mut screen = load_detail(store, config, id).await?;
    if screen.reset(confirmer(yes)).await? {
        println!("{}", "Counter reset to 0".green());
    } else {
        println!("{}", "Reset cancelled".yellow());
    }
    Ok(())
}

/// Rename a session
pub async fn rename_session(
    store: Arc<SessionStore>,
    config: &Config,
    id: &str,
    name: &str,
) -> Result<()> {
    let mut screen = load_detail(store, config, id).await?;
    let session = screen.rename(name).await?;
    println!("{}", format!("Renamed to {}", session.name).green());
    Ok(())
}

/// Attach a photo to a session
pub async fn attach_image(
    store: Arc<SessionStore>,
    config: &Config,
    id: &str,
    path: Option<PathBuf>,
) -> Result<()> {
    let mut screen = load_detail(store, config, id).await?;
    let picker = FileImagePicker::new(path, &config.images.dir);

    if screen.change_image(&picker).await? {
        let uri = screen
            .session()
            .and_then(|s| s.image.clone())
            .unwrap_or_default();
        println!("{}", format!("Image attached: {}", uri).green());
    } else {
        println!("{}", "No image selected".yellow());
    }
    Ok(())
}

/// Delete a session after confirmation
pub async fn delete_session(
    store: Arc<SessionStore>,
    config: &Config,
    id: &str,
    yes: bool,
) -> Result<()> {
    let id = resolve_id(&store, id).await;
    if store.get_by_id(&id).await?.is_none() {
        println!("{}", format!("No session with id {}", id).yellow());
        return Ok(());
    }
    let mut screen = ListScreen::new(store, config.ui.max_name_length);

    if screen.delete(&id, confirmer(yes)).await? {
        println!("{}", format!("Deleted session {}", id).green());
    } else {
        println!("{}", "Delete cancelled".yellow());
    }
    Ok(())
}

async fn load_detail(store: Arc<SessionStore>, config: &Config, id: &str) -> Result<DetailScreen> {
    let id = resolve_id(&store, id).await;
    let mut screen = DetailScreen::new(
        store,
        config.ui.max_name_length,
        PickOptions::from(&config.images),
    );
    screen.load(Some(&id)).await?;
    Ok(screen)
}

fn confirmer(yes: bool) -> &'static dyn Confirm {
    if yes {
        &AssumeYes
    } else {
        &TerminalConfirm
    }
}

fn print_session(session: &Session) {
    println!();
    println!("{}", session.name.bold());
    println!("  ID:       {}", session.id.cyan());
    println!("  Count:    {}", session.count.to_string().bold().green());
    println!(
        "  Image:    {}",
        session.image.as_deref().unwrap_or("-")
    );
    println!("  Created:  {}", format_timestamp(session.created_at));
    println!("  Updated:  {}", format_timestamp(session.updated_at));
    println!();
}

/// Render summaries as a bordered table
pub fn sessions_table(sessions: &[SessionSummary]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(row![
        "ID".bold(),
        "Name".bold(),
        "Count".bold(),
        "Image".bold(),
        "Last Updated".bold()
    ]);

    for session in sessions {
        let id_short: String = session.id.chars().take(8).collect();
        let image = if session.has_image { "yes" } else { "-" };
        table.add_row(row![
            id_short.cyan(),
            truncate_name(&session.name, 40),
            session.count,
            image,
            format_timestamp(session.updated_at)
        ]);
    }

    table
}

/// Local-time `YYYY-MM-DD HH:MM`
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

fn truncate_name(name: &str, max: usize) -> String {
    if name.chars().count() > max {
        let head: String = name.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        name.to_string()
    }
}
