//! Storage boundary for the wellness data.
//!
//! Every read and write the services perform goes through [`Gateway`]. Calls
//! are scoped by the caller's identity id; nothing here trusts a client-sent
//! owner. Operations that touch more than one row (check-in recording, team
//! creation, leaving a team) are atomic in every implementation.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::journal::{JournalEntry, JournalEntryUpdate, NewJournalEntry};
use crate::models::profile::{NewProfile, Profile, ProfileUpdate};
use crate::models::team::{MemberRole, Membership, TeamMember, TeamRecord};
use crate::models::wellbeing::{CheckIn, EnergyEntry, MoodEntry, NewCheckIn};

#[async_trait]
pub trait Gateway: Send + Sync {
    /// Cheap liveness probe of the backing store.
    async fn ping(&self) -> AppResult<()>;

    async fn find_profile(&self, user_id: Uuid) -> AppResult<Option<Profile>>;
    /// Returns the stored row unchanged if the id already exists.
    async fn insert_profile(&self, profile: &NewProfile) -> AppResult<Profile>;
    /// Writes only the fields present in `update`.
    async fn update_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> AppResult<()>;

    /// Ordered by date ascending.
    async fn list_mood_entries(&self, user_id: Uuid) -> AppResult<Vec<MoodEntry>>;
    /// Ordered by date ascending.
    async fn list_energy_entries(&self, user_id: Uuid) -> AppResult<Vec<EnergyEntry>>;
    async fn latest_check_in(&self, user_id: Uuid) -> AppResult<Option<CheckIn>>;
    /// Most recent check-in of each listed user that has one.
    async fn latest_check_ins(&self, user_ids: &[Uuid]) -> AppResult<Vec<CheckIn>>;
    /// Appends the check-in and upserts the mood and energy entries for `date`.
    async fn record_check_in(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        check_in: &NewCheckIn,
    ) -> AppResult<CheckIn>;

    /// Ordered by creation time, newest first.
    async fn list_journal_entries(&self, user_id: Uuid) -> AppResult<Vec<JournalEntry>>;
    async fn insert_journal_entry(
        &self,
        user_id: Uuid,
        entry: &NewJournalEntry,
    ) -> AppResult<JournalEntry>;
    /// `None` when no entry with that id belongs to `user_id`.
    async fn update_journal_entry(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        update: &JournalEntryUpdate,
    ) -> AppResult<Option<JournalEntry>>;
    async fn delete_journal_entry(&self, user_id: Uuid, entry_id: Uuid) -> AppResult<bool>;

    /// A fresh uppercase room code not used by any team.
    async fn generate_room_code(&self) -> AppResult<String>;
    /// Inserts the team and the creator's `owner` membership together.
    async fn create_team(&self, name: &str, room_code: &str, creator: Uuid)
        -> AppResult<TeamRecord>;
    async fn find_team(&self, team_id: Uuid) -> AppResult<Option<TeamRecord>>;
    /// `room_code` must already be normalized.
    async fn find_team_by_code(&self, room_code: &str) -> AppResult<Option<TeamRecord>>;
    /// Teams `user_id` belongs to, in the order they were joined.
    async fn teams_for_user(&self, user_id: Uuid) -> AppResult<Vec<TeamRecord>>;
    /// Members of all listed teams, each team's members ordered by join time.
    async fn list_team_rosters(&self, team_ids: &[Uuid]) -> AppResult<Vec<TeamMember>>;
    async fn find_membership(&self, team_id: Uuid, user_id: Uuid)
        -> AppResult<Option<Membership>>;
    /// Fails with `AppError::Conflict` if the membership already exists.
    async fn insert_membership(
        &self,
        team_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> AppResult<Membership>;
    /// Removes the membership. When the owner leaves, the longest-tenured
    /// remaining member becomes owner. Returns `false` if there was no
    /// membership to remove.
    async fn leave_team(&self, team_id: Uuid, user_id: Uuid) -> AppResult<bool>;
}
