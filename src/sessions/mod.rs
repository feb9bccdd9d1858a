//! Counter sessions and their persistence
//!
//! A [`Session`] is one named tally: an integer count, an optional
//! reference photo and two timestamps. The whole collection is stored as
//! a single JSON array under one key; [`SessionStore`] owns every read and
//! write of that array.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod store;

pub use store::{SessionStore, DEFAULT_STORAGE_KEY};

/// Full persisted record of one counter session
///
/// Field names on the wire are camelCase (`createdAt`, `updatedAt`) and
/// timestamps are ISO-8601 strings.
///
/// # Examples
///
/// ```
/// use tallykeeper::sessions::Session;
///
/// let now = chrono::Utc::now();
/// let session = Session::new("abc".to_string(), "Laps".to_string(), now);
/// assert_eq!(session.count, 0);
/// assert!(session.image.is_none());
/// assert_eq!(session.created_at, session.updated_at);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Unique identifier, fixed at creation
    pub id: String,
    /// Display name
    pub name: String,
    /// Current tally
    pub count: i64,
    /// Local reference (URI) to the attached photo
    #[serde(default)]
    pub image: Option<String>,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// When the session was last written by the store
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Build a brand-new session: zero count, no image, both timestamps `now`
    pub fn new(id: String, name: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            count: 0,
            image: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// List projection of a [`Session`] with the image collapsed to a flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: String,
    pub name: String,
    pub count: i64,
    pub has_image: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Session> for SessionSummary {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id.clone(),
            name: session.name.clone(),
            count: session.count,
            has_image: session.image.is_some(),
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

/// Generate a new random session identifier (UUID v4)
pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Sort summaries most recently updated first
pub fn sort_by_recent(summaries: &mut [SessionSummary]) {
    summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_session_serializes_with_camel_case_fields() {
        let session = Session::new("id-1".to_string(), "Laps".to_string(), at(0));
        let value = serde_json::to_value(&session).unwrap();

        assert_eq!(value["id"], "id-1");
        assert_eq!(value["name"], "Laps");
        assert_eq!(value["count"], 0);
        assert!(value["image"].is_null());
        assert!(value["createdAt"].is_string());
        assert!(value["updatedAt"].is_string());
        assert!(value.get("created_at").is_none());
    }

    #[test]
    fn test_session_reads_millisecond_iso_timestamps() {
        let json = r#"{
            "id": "lx3k9a2b",
            "name": "Push-ups",
            "count": 12,
            "image": "file:///data/photo.jpg",
            "createdAt": "2024-05-01T08:30:00.000Z",
            "updatedAt": "2024-05-02T09:15:42.123Z"
        }"#;

        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.count, 12);
        assert_eq!(session.image.as_deref(), Some("file:///data/photo.jpg"));
        assert!(session.updated_at > session.created_at);
    }

    #[test]
    fn test_session_missing_image_field_reads_as_none() {
        let json = r#"{"id":"a","name":"b","count":1,
            "createdAt":"2024-05-01T08:30:00Z","updatedAt":"2024-05-01T08:30:00Z"}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert!(session.image.is_none());
    }

    #[test]
    fn test_summary_collapses_image_to_flag() {
        let mut session = Session::new("a".to_string(), "A".to_string(), at(0));
        assert!(!SessionSummary::from(&session).has_image);

        session.image = Some("file:///tmp/a.jpg".to_string());
        let summary = SessionSummary::from(&session);
        assert!(summary.has_image);
        assert_eq!(summary.id, "a");
        assert_eq!(summary.updated_at, session.updated_at);

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["hasImage"], true);
    }

    #[test]
    fn test_new_session_id_is_unique_uuid() {
        let id1 = new_session_id();
        let id2 = new_session_id();
        assert_ne!(id1, id2);
        assert!(Uuid::parse_str(&id1).is_ok());
    }

    #[test]
    fn test_sort_by_recent_orders_descending() {
        let mut summaries: Vec<SessionSummary> = [(1, "old"), (30, "newest"), (10, "mid")]
            .into_iter()
            .map(|(secs, name)| {
                let mut s = Session::new(name.to_string(), name.to_string(), at(0));
                s.updated_at = at(secs);
                SessionSummary::from(&s)
            })
            .collect();

        sort_by_recent(&mut summaries);
        let names: Vec<&str> = summaries.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["newest", "mid", "old"]);
    }
}
