use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JournalEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub mood: i32,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewJournalEntry {
    pub title: String,
    pub content: String,
    pub mood: i32,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct JournalEntryUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub mood: Option<i32>,
    pub tags: Option<Vec<String>>,
}

impl JournalEntry {
    pub fn apply(&mut self, update: &JournalEntryUpdate) {
        if let Some(title) = &update.title {
            self.title = title.clone();
        }
        if let Some(content) = &update.content {
            self.content = content.clone();
        }
        if let Some(mood) = update.mood {
            self.mood = mood;
        }
        if let Some(tags) = &update.tags {
            self.tags = tags.clone();
        }
        self.updated_at = Utc::now();
    }
}
