//! Request/response bodies of the HTTP API.
//!
//! Conventions:
//! - `*Request`  → deserialized from client JSON body or query params
//! - `*Response` → serialized to client JSON
//! - Field limits are expressed via `validator` derive macros

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::journal::{JournalEntryUpdate, NewJournalEntry};
use crate::models::profile::{ProfileUpdate, UserMode};
use crate::models::team::Team;
use crate::models::wellbeing::NewCheckIn;

// ============================================================================
// Profile & check-ins
// ============================================================================

/// PUT /api/me: partial update, all fields optional
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name must be 1-100 characters"),
        custom = "not_blank"
    )]
    pub name: Option<String>,

    pub mode: Option<UserMode>,

    /// Time of day for the daily reminder (HH:MM:SS)
    pub daily_reminder_time: Option<NaiveTime>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(body: UpdateProfileRequest) -> Self {
        Self {
            name: body.name.map(|n| n.trim().to_string()),
            mode: body.mode,
            daily_reminder_time: body.daily_reminder_time,
        }
    }
}

/// POST /api/check-ins
#[derive(Debug, Deserialize, Validate)]
pub struct CheckInRequest {
    #[validate(range(min = 0, max = 10, message = "Mood must be 0-10"))]
    pub mood: i32,

    #[validate(range(min = 0, max = 10, message = "Energy must be 0-10"))]
    pub energy: i32,

    #[validate(length(max = 5000, message = "Notes must be under 5000 characters"))]
    pub notes: Option<String>,

    #[validate(length(max = 20, message = "At most 20 tags"))]
    #[serde(default)]
    pub tags: Vec<String>,

    /// Day the mood/energy entries are filed under. Default: today (UTC).
    /// Must be within ±1 day of server-now.
    pub date: Option<NaiveDate>,
}

impl CheckInRequest {
    pub fn validate_date(&self, server_today: NaiveDate) -> Result<NaiveDate, String> {
        let date = self.date.unwrap_or(server_today);
        let diff = (date - server_today).num_days().abs();
        if diff > 1 {
            return Err("Date must be within ±1 day of today".into());
        }
        Ok(date)
    }

    pub fn into_check_in(self) -> NewCheckIn {
        NewCheckIn {
            mood: self.mood,
            energy: self.energy,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
            tags: clean_tags(self.tags),
        }
    }
}

// ============================================================================
// Journal
// ============================================================================

/// POST /api/journal
#[derive(Debug, Deserialize, Validate)]
pub struct CreateJournalEntryRequest {
    #[validate(
        length(min = 1, max = 200, message = "Title must be 1-200 characters"),
        custom = "not_blank"
    )]
    pub title: String,

    #[validate(length(max = 20000, message = "Content must be under 20000 characters"))]
    pub content: String,

    #[validate(range(min = 0, max = 10, message = "Mood must be 0-10"))]
    pub mood: i32,

    #[validate(length(max = 20, message = "At most 20 tags"))]
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<CreateJournalEntryRequest> for NewJournalEntry {
    fn from(body: CreateJournalEntryRequest) -> Self {
        Self {
            title: body.title.trim().to_string(),
            content: body.content,
            mood: body.mood,
            tags: clean_tags(body.tags),
        }
    }
}

/// PUT /api/journal/:id, partial update
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateJournalEntryRequest {
    #[validate(length(min = 1, max = 200), custom = "not_blank")]
    pub title: Option<String>,

    #[validate(length(max = 20000))]
    pub content: Option<String>,

    #[validate(range(min = 0, max = 10))]
    pub mood: Option<i32>,

    #[validate(length(max = 20))]
    pub tags: Option<Vec<String>>,
}

impl From<UpdateJournalEntryRequest> for JournalEntryUpdate {
    fn from(body: UpdateJournalEntryRequest) -> Self {
        Self {
            title: body.title.map(|t| t.trim().to_string()),
            content: body.content,
            mood: body.mood,
            tags: body.tags.map(clean_tags),
        }
    }
}

// ============================================================================
// Teams
// ============================================================================

/// POST /api/teams
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTeamRequest {
    #[validate(length(min = 1, max = 100, message = "Team name must be 1-100 characters"))]
    pub name: String,
}

/// POST /api/teams/join
#[derive(Debug, Deserialize, Validate)]
pub struct JoinTeamRequest {
    #[validate(length(min = 1, max = 16, message = "Room code is required"))]
    pub room_code: String,
}

/// GET /api/teams query params
#[derive(Debug, Deserialize)]
pub struct TeamsQuery {
    /// Team to select; falls back to the first team.
    pub current: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct TeamsResponse {
    pub teams: Vec<Team>,
    pub current_team: Option<Team>,
}

#[derive(Debug, Serialize)]
pub struct InviteLinkResponse {
    pub team_id: Uuid,
    pub room_code: String,
    pub invite_link: String,
}

/// Rejects strings that are empty once trimmed.
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("Must not be blank".into());
        return Err(error);
    }
    Ok(())
}

/// Trims tags and drops empty ones and repeats, keeping first-seen order.
fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !cleaned.iter().any(|t| t == tag) {
            cleaned.push(tag.to_string());
        }
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_in_request_rejects_out_of_range_mood() {
        let body: CheckInRequest =
            serde_json::from_value(serde_json::json!({ "mood": 11, "energy": 5 })).unwrap();
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_check_in_request_defaults_tags() {
        let body: CheckInRequest =
            serde_json::from_value(serde_json::json!({ "mood": 7, "energy": 5 })).unwrap();
        assert!(body.validate().is_ok());
        assert!(body.tags.is_empty());
    }

    #[test]
    fn test_check_in_date_window() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let mut body: CheckInRequest =
            serde_json::from_value(serde_json::json!({ "mood": 7, "energy": 5 })).unwrap();
        assert_eq!(body.validate_date(today), Ok(today));

        body.date = NaiveDate::from_ymd_opt(2024, 1, 9);
        assert!(body.validate_date(today).is_ok());

        body.date = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert!(body.validate_date(today).is_err());
    }

    #[test]
    fn test_clean_tags() {
        let tags = vec![" work ".into(), "".into(), "sleep".into(), "work".into()];
        assert_eq!(clean_tags(tags), vec!["work".to_string(), "sleep".to_string()]);
    }

    #[test]
    fn test_blank_notes_dropped() {
        let body: CheckInRequest = serde_json::from_value(
            serde_json::json!({ "mood": 7, "energy": 5, "notes": "   " }),
        )
        .unwrap();
        assert_eq!(body.into_check_in().notes, None);
    }

    #[test]
    fn test_update_profile_request_rejects_empty_name() {
        let body: UpdateProfileRequest =
            serde_json::from_value(serde_json::json!({ "name": "" })).unwrap();
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_update_profile_request_parses_mode() {
        let body: UpdateProfileRequest = serde_json::from_value(
            serde_json::json!({ "mode": "team", "daily_reminder_time": "07:30:00" }),
        )
        .unwrap();
        assert!(body.validate().is_ok());
        let update = ProfileUpdate::from(body);
        assert_eq!(update.mode, Some(UserMode::Team));
        assert_eq!(update.daily_reminder_time, NaiveTime::from_hms_opt(7, 30, 0));
    }

    #[test]
    fn test_whitespace_only_name_and_title_rejected() {
        let body: UpdateProfileRequest =
            serde_json::from_value(serde_json::json!({ "name": "   " })).unwrap();
        assert!(body.validate().is_err());

        let body: CreateJournalEntryRequest = serde_json::from_value(
            serde_json::json!({ "title": " \t ", "content": "", "mood": 5 }),
        )
        .unwrap();
        assert!(body.validate().is_err());

        let body: UpdateJournalEntryRequest =
            serde_json::from_value(serde_json::json!({ "title": "  " })).unwrap();
        assert!(body.validate().is_err());

        let body: UpdateJournalEntryRequest =
            serde_json::from_value(serde_json::json!({ "content": "still fine" })).unwrap();
        assert!(body.validate().is_ok());
    }
}
