//! In-process gateway with the same semantics as the Postgres one.
//!
//! All tables live behind one mutex so multi-row operations are atomic.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::db::gateway::Gateway;
use crate::error::{AppError, AppResult};
use crate::models::journal::{JournalEntry, JournalEntryUpdate, NewJournalEntry};
use crate::models::profile::{NewProfile, Profile, ProfileUpdate};
use crate::models::team::{random_room_code, MemberRole, Membership, TeamMember, TeamRecord};
use crate::models::wellbeing::{CheckIn, EnergyEntry, MoodEntry, NewCheckIn};

#[derive(Default)]
struct Tables {
    profiles: HashMap<Uuid, Profile>,
    moods: Vec<MoodEntry>,
    energies: Vec<EnergyEntry>,
    check_ins: Vec<CheckIn>,
    journal: Vec<JournalEntry>,
    teams: Vec<TeamRecord>,
    members: Vec<Membership>,
    faults: HashSet<&'static str>,
}

impl Tables {
    fn check(&self, op: &'static str) -> AppResult<()> {
        if self.faults.contains(op) {
            return Err(AppError::Internal(anyhow::anyhow!("{} is unavailable", op)));
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryGateway {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of check-in rows stored for `user_id`.
    pub async fn check_in_count(&self, user_id: Uuid) -> usize {
        let tables = self.tables.lock().await;
        tables.check_ins.iter().filter(|c| c.user_id == user_id).count()
    }

    /// Makes every later call to the named gateway method fail.
    pub async fn fail_on(&self, op: &'static str) {
        self.tables.lock().await.faults.insert(op);
    }

    /// Membership rows of `team_id`, in insertion order.
    pub async fn memberships(&self, team_id: Uuid) -> Vec<Membership> {
        let tables = self.tables.lock().await;
        tables
            .members
            .iter()
            .filter(|m| m.team_id == team_id)
            .cloned()
            .collect()
    }
}

fn newest_first<T>(mut rows: Vec<T>, key: impl Fn(&T) -> chrono::DateTime<Utc>) -> Vec<T> {
    // Later inserts win timestamp ties.
    rows.reverse();
    rows.sort_by_key(|r| std::cmp::Reverse(key(r)));
    rows
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn ping(&self) -> AppResult<()> {
        self.tables.lock().await.check("ping")
    }

    async fn find_profile(&self, user_id: Uuid) -> AppResult<Option<Profile>> {
        let tables = self.tables.lock().await;
        tables.check("find_profile")?;
        Ok(tables.profiles.get(&user_id).cloned())
    }

    async fn insert_profile(&self, profile: &NewProfile) -> AppResult<Profile> {
        let mut tables = self.tables.lock().await;
        tables.check("insert_profile")?;
        if let Some(existing) = tables.profiles.get(&profile.id) {
            return Ok(existing.clone());
        }

        let now = Utc::now();
        let row = Profile {
            id: profile.id,
            name: profile.name.clone(),
            mode: profile.mode,
            daily_reminder_time: profile.daily_reminder_time,
            created_at: now,
            updated_at: now,
        };
        tables.profiles.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> AppResult<()> {
        let mut tables = self.tables.lock().await;
        tables.check("update_profile")?;
        if let Some(profile) = tables.profiles.get_mut(&user_id) {
            profile.apply(update);
            profile.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn list_mood_entries(&self, user_id: Uuid) -> AppResult<Vec<MoodEntry>> {
        let tables = self.tables.lock().await;
        tables.check("list_mood_entries")?;
        let mut entries: Vec<MoodEntry> = tables
            .moods
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.date);
        Ok(entries)
    }

    async fn list_energy_entries(&self, user_id: Uuid) -> AppResult<Vec<EnergyEntry>> {
        let tables = self.tables.lock().await;
        tables.check("list_energy_entries")?;
        let mut entries: Vec<EnergyEntry> = tables
            .energies
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.date);
        Ok(entries)
    }

    async fn latest_check_in(&self, user_id: Uuid) -> AppResult<Option<CheckIn>> {
        let tables = self.tables.lock().await;
        tables.check("latest_check_in")?;
        Ok(tables
            .check_ins
            .iter()
            .filter(|c| c.user_id == user_id)
            .max_by_key(|c| c.created_at)
            .cloned())
    }

    async fn latest_check_ins(&self, user_ids: &[Uuid]) -> AppResult<Vec<CheckIn>> {
        let tables = self.tables.lock().await;
        tables.check("latest_check_ins")?;
        let mut latest: HashMap<Uuid, &CheckIn> = HashMap::new();
        for check_in in tables.check_ins.iter().filter(|c| user_ids.contains(&c.user_id)) {
            match latest.get(&check_in.user_id) {
                Some(current) if current.created_at > check_in.created_at => {}
                _ => {
                    latest.insert(check_in.user_id, check_in);
                }
            }
        }
        Ok(latest.into_values().cloned().collect())
    }

    async fn record_check_in(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        check_in: &NewCheckIn,
    ) -> AppResult<CheckIn> {
        let mut tables = self.tables.lock().await;
        tables.check("record_check_in")?;
        let now = Utc::now();

        let row = CheckIn {
            id: Uuid::new_v4(),
            user_id,
            mood: check_in.mood,
            energy: check_in.energy,
            notes: check_in.notes.clone(),
            tags: check_in.tags.clone(),
            created_at: now,
        };
        tables.check_ins.push(row.clone());

        let tables = &mut *tables;
        match tables
            .moods
            .iter()
            .position(|e| e.user_id == user_id && e.date == date)
        {
            Some(i) => tables.moods[i].mood = check_in.mood,
            None => tables.moods.push(MoodEntry {
                id: Uuid::new_v4(),
                user_id,
                date,
                mood: check_in.mood,
                created_at: now,
            }),
        }

        match tables
            .energies
            .iter()
            .position(|e| e.user_id == user_id && e.date == date)
        {
            Some(i) => tables.energies[i].energy = check_in.energy,
            None => tables.energies.push(EnergyEntry {
                id: Uuid::new_v4(),
                user_id,
                date,
                energy: check_in.energy,
                created_at: now,
            }),
        }

        Ok(row)
    }

    async fn list_journal_entries(&self, user_id: Uuid) -> AppResult<Vec<JournalEntry>> {
        let tables = self.tables.lock().await;
        tables.check("list_journal_entries")?;
        let entries = tables
            .journal
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(entries, |e| e.created_at))
    }

    async fn insert_journal_entry(
        &self,
        user_id: Uuid,
        entry: &NewJournalEntry,
    ) -> AppResult<JournalEntry> {
        let mut tables = self.tables.lock().await;
        tables.check("insert_journal_entry")?;
        let now = Utc::now();
        let row = JournalEntry {
            id: Uuid::new_v4(),
            user_id,
            title: entry.title.clone(),
            content: entry.content.clone(),
            mood: entry.mood,
            tags: entry.tags.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.journal.push(row.clone());
        Ok(row)
    }

    async fn update_journal_entry(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        update: &JournalEntryUpdate,
    ) -> AppResult<Option<JournalEntry>> {
        let mut tables = self.tables.lock().await;
        let entry = tables
            .journal
            .iter_mut()
            .find(|e| e.id == entry_id && e.user_id == user_id);

        Ok(entry.map(|entry| {
            entry.apply(update);
            entry.clone()
        }))
    }

    async fn delete_journal_entry(&self, user_id: Uuid, entry_id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.journal.len();
        tables
            .journal
            .retain(|e| !(e.id == entry_id && e.user_id == user_id));
        Ok(tables.journal.len() < before)
    }

    async fn generate_room_code(&self) -> AppResult<String> {
        let tables = self.tables.lock().await;
        let taken: HashSet<&str> = tables.teams.iter().map(|t| t.room_code.as_str()).collect();
        let mut rng = rand::thread_rng();
        loop {
            let code = random_room_code(&mut rng);
            if !taken.contains(code.as_str()) {
                return Ok(code);
            }
        }
    }

    async fn create_team(
        &self,
        name: &str,
        room_code: &str,
        creator: Uuid,
    ) -> AppResult<TeamRecord> {
        let mut tables = self.tables.lock().await;
        if tables.teams.iter().any(|t| t.room_code == room_code) {
            return Err(AppError::Conflict("Room code already in use".into()));
        }

        let now = Utc::now();
        let team = TeamRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            room_code: room_code.to_string(),
            created_by: creator,
            created_at: now,
        };
        tables.teams.push(team.clone());
        tables.members.push(Membership {
            id: Uuid::new_v4(),
            team_id: team.id,
            user_id: creator,
            role: MemberRole::Owner,
            joined_at: now,
        });
        Ok(team)
    }

    async fn find_team(&self, team_id: Uuid) -> AppResult<Option<TeamRecord>> {
        let tables = self.tables.lock().await;
        Ok(tables.teams.iter().find(|t| t.id == team_id).cloned())
    }

    async fn find_team_by_code(&self, room_code: &str) -> AppResult<Option<TeamRecord>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .teams
            .iter()
            .find(|t| t.room_code == room_code)
            .cloned())
    }

    async fn teams_for_user(&self, user_id: Uuid) -> AppResult<Vec<TeamRecord>> {
        let tables = self.tables.lock().await;
        // Membership rows are appended in join order.
        Ok(tables
            .members
            .iter()
            .filter(|m| m.user_id == user_id)
            .filter_map(|m| tables.teams.iter().find(|t| t.id == m.team_id))
            .cloned()
            .collect())
    }

    async fn list_team_rosters(&self, team_ids: &[Uuid]) -> AppResult<Vec<TeamMember>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .members
            .iter()
            .filter(|m| team_ids.contains(&m.team_id))
            .map(|m| TeamMember {
                id: m.id,
                team_id: m.team_id,
                user_id: m.user_id,
                role: m.role,
                joined_at: m.joined_at,
                name: tables
                    .profiles
                    .get(&m.user_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| "Member".into()),
            })
            .collect())
    }

    async fn find_membership(
        &self,
        team_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Option<Membership>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .members
            .iter()
            .find(|m| m.team_id == team_id && m.user_id == user_id)
            .cloned())
    }

    async fn insert_membership(
        &self,
        team_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> AppResult<Membership> {
        let mut tables = self.tables.lock().await;
        if tables
            .members
            .iter()
            .any(|m| m.team_id == team_id && m.user_id == user_id)
        {
            return Err(AppError::Conflict(
                "You are already a member of this team".into(),
            ));
        }

        let membership = Membership {
            id: Uuid::new_v4(),
            team_id,
            user_id,
            role,
            joined_at: Utc::now(),
        };
        tables.members.push(membership.clone());
        Ok(membership)
    }

    async fn leave_team(&self, team_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.lock().await;
        let Some(index) = tables
            .members
            .iter()
            .position(|m| m.team_id == team_id && m.user_id == user_id)
        else {
            return Ok(false);
        };

        let removed = tables.members.remove(index);
        if removed.role == MemberRole::Owner {
            // Insertion order is join order, so the first match is the longest-tenured.
            if let Some(next) = tables.members.iter_mut().find(|m| m.team_id == team_id) {
                next.role = MemberRole::Owner;
                tracing::info!(team_id = %team_id, new_owner = %next.user_id, "Owner left, promoted longest-tenured member");
            }
        }
        Ok(true)
    }
}
