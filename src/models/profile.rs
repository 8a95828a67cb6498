use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Per-user profile. `id` is the identity id from the access token.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub mode: UserMode,
    pub daily_reminder_time: NaiveTime,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "user_mode", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserMode {
    #[default]
    Solo,
    Team,
}

#[derive(Debug, Clone)]
pub struct NewProfile {
    pub id: Uuid,
    pub name: String,
    pub mode: UserMode,
    pub daily_reminder_time: NaiveTime,
}

impl NewProfile {
    /// Profile synthesized on first load: name from the email local-part.
    pub fn for_identity(id: Uuid, email: Option<&str>) -> Self {
        Self {
            id,
            name: default_name(email),
            mode: UserMode::Solo,
            daily_reminder_time: default_reminder_time(),
        }
    }
}

/// Partial profile update. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub mode: Option<UserMode>,
    pub daily_reminder_time: Option<NaiveTime>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.mode.is_none() && self.daily_reminder_time.is_none()
    }
}

impl Profile {
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(mode) = update.mode {
            self.mode = mode;
        }
        if let Some(time) = update.daily_reminder_time {
            self.daily_reminder_time = time;
        }
    }
}

pub fn default_name(email: Option<&str>) -> String {
    email
        .and_then(|e| e.split('@').next())
        .filter(|local| !local.is_empty())
        .unwrap_or("User")
        .to_string()
}

pub fn default_reminder_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}
