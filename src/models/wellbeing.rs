use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One mood score per user per calendar date.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MoodEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub mood: i32,
    pub created_at: DateTime<Utc>,
}

/// One energy score per user per calendar date.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EnergyEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub energy: i32,
    pub created_at: DateTime<Utc>,
}

/// Append-only check-in log row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CheckIn {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood: i32,
    pub energy: i32,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCheckIn {
    pub mood: i32,
    pub energy: i32,
    pub notes: Option<String>,
    pub tags: Vec<String>,
}
