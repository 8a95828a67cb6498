//! Per-identity aggregate of profile, check-ins, mood/energy series and
//! journal.
//!
//! Reads favour availability: once the profile is in hand, a failing series
//! read is logged and treated as empty. Writes propagate their errors and are
//! followed by a full reload, except profile edits which merge locally.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use futures_util::future::join4;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::db::Gateway;
use crate::error::{AppError, AppResult};
use crate::models::journal::{JournalEntry, JournalEntryUpdate, NewJournalEntry};
use crate::models::profile::{NewProfile, Profile, ProfileUpdate};
use crate::models::wellbeing::{CheckIn, EnergyEntry, MoodEntry, NewCheckIn};

#[derive(Debug, Clone, Serialize)]
pub struct UserSnapshot {
    pub profile: Profile,
    pub last_check_in: Option<CheckIn>,
    pub mood_history: Vec<MoodEntry>,
    pub energy_history: Vec<EnergyEntry>,
    pub journal_entries: Vec<JournalEntry>,
}

pub struct UserData {
    gateway: Arc<dyn Gateway>,
    identity: AuthUser,
    user: Option<UserSnapshot>,
}

impl UserData {
    pub fn new(gateway: Arc<dyn Gateway>, identity: AuthUser) -> Self {
        Self {
            gateway,
            identity,
            user: None,
        }
    }

    /// `None` until a load has succeeded.
    pub fn user(&self) -> Option<&UserSnapshot> {
        self.user.as_ref()
    }

    pub fn into_user(self) -> Option<UserSnapshot> {
        self.user
    }

    /// Loads (or reloads) the snapshot, creating the profile on first use.
    ///
    /// If the profile cannot be read or created the load is abandoned and the
    /// previous snapshot, if any, is kept.
    pub async fn load(&mut self) {
        let user_id = self.identity.id;

        let profile = match self.ensure_profile().await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Failed to load user profile");
                return;
            }
        };

        let gateway = &self.gateway;
        let (moods, energies, latest, journal) = join4(
            gateway.list_mood_entries(user_id),
            gateway.list_energy_entries(user_id),
            gateway.latest_check_in(user_id),
            gateway.list_journal_entries(user_id),
        )
        .await;

        self.user = Some(UserSnapshot {
            profile,
            last_check_in: or_empty(latest, user_id, "latest check-in"),
            mood_history: or_empty(moods, user_id, "mood history"),
            energy_history: or_empty(energies, user_id, "energy history"),
            journal_entries: or_empty(journal, user_id, "journal entries"),
        });
    }

    /// Reads the profile, creating the default one on first use. Does not
    /// touch the loaded snapshot.
    pub async fn ensure_profile(&self) -> AppResult<Profile> {
        if let Some(profile) = self.gateway.find_profile(self.identity.id).await? {
            return Ok(profile);
        }

        let new_profile = NewProfile::for_identity(self.identity.id, self.identity.email.as_deref());
        let profile = self.gateway.insert_profile(&new_profile).await?;
        tracing::info!(user_id = %profile.id, name = %profile.name, "Created default profile");
        Ok(profile)
    }

    /// Writes the provided profile fields and merges them into the loaded
    /// snapshot without re-fetching. Does nothing before the first load.
    pub async fn update_user(&mut self, update: ProfileUpdate) -> AppResult<()> {
        if update.name.as_deref().is_some_and(is_blank) {
            return Err(AppError::Validation("Name is required".into()));
        }
        if self.user.is_none() {
            return Ok(());
        }

        if !update.is_empty() {
            self.gateway.update_profile(self.identity.id, &update).await?;
        }

        if let Some(user) = self.user.as_mut() {
            user.profile.apply(&update);
        }
        Ok(())
    }

    /// Records a check-in dated today (UTC).
    pub async fn add_check_in(&mut self, check_in: NewCheckIn) -> AppResult<CheckIn> {
        self.add_check_in_on(Utc::now().date_naive(), check_in).await
    }

    /// Appends a check-in and sets the mood and energy entries for `date`.
    pub async fn add_check_in_on(
        &mut self,
        date: NaiveDate,
        check_in: NewCheckIn,
    ) -> AppResult<CheckIn> {
        let row = self
            .gateway
            .record_check_in(self.identity.id, date, &check_in)
            .await?;
        tracing::info!(user_id = %self.identity.id, date = %date, mood = row.mood, energy = row.energy, "Check-in recorded");

        self.load().await;
        Ok(row)
    }

    pub async fn add_journal_entry(&mut self, entry: NewJournalEntry) -> AppResult<JournalEntry> {
        if is_blank(&entry.title) {
            return Err(AppError::Validation("Journal title is required".into()));
        }

        let row = self
            .gateway
            .insert_journal_entry(self.identity.id, &entry)
            .await?;

        self.load().await;
        Ok(row)
    }

    pub async fn update_journal_entry(
        &mut self,
        entry_id: Uuid,
        update: JournalEntryUpdate,
    ) -> AppResult<JournalEntry> {
        if update.title.as_deref().is_some_and(is_blank) {
            return Err(AppError::Validation("Journal title is required".into()));
        }

        let row = self
            .gateway
            .update_journal_entry(self.identity.id, entry_id, &update)
            .await?
            .ok_or_else(|| AppError::NotFound("Journal entry not found".into()))?;

        self.load().await;
        Ok(row)
    }

    pub async fn delete_journal_entry(&mut self, entry_id: Uuid) -> AppResult<()> {
        let deleted = self
            .gateway
            .delete_journal_entry(self.identity.id, entry_id)
            .await?;
        if !deleted {
            return Err(AppError::NotFound("Journal entry not found".into()));
        }

        self.load().await;
        Ok(())
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn or_empty<T: Default>(result: AppResult<T>, user_id: Uuid, what: &str) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(user_id = %user_id, error = %e, "Failed to load {}, showing none", what);
            T::default()
        }
    }
}
