use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::gateway::Gateway;
use crate::error::{AppError, AppResult};
use crate::models::journal::{JournalEntry, JournalEntryUpdate, NewJournalEntry};
use crate::models::profile::{NewProfile, Profile, ProfileUpdate};
use crate::models::team::{MemberRole, Membership, TeamMember, TeamRecord};
use crate::models::wellbeing::{CheckIn, EnergyEntry, MoodEntry, NewCheckIn};

/// Postgres-backed gateway.
#[derive(Clone)]
pub struct PgGateway {
    pool: PgPool,
}

impl PgGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Gateway for PgGateway {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_profile(&self, user_id: Uuid) -> AppResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn insert_profile(&self, profile: &NewProfile) -> AppResult<Profile> {
        let inserted = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO users (id, name, mode, daily_reminder_time)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(profile.id)
        .bind(&profile.name)
        .bind(profile.mode)
        .bind(profile.daily_reminder_time)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = inserted {
            return Ok(row);
        }

        // Lost a first-login race; the other request's row wins.
        let existing = sqlx::query_as::<_, Profile>("SELECT * FROM users WHERE id = $1")
            .bind(profile.id)
            .fetch_one(&self.pool)
            .await?;
        Ok(existing)
    }

    async fn update_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                mode = COALESCE($3, mode),
                daily_reminder_time = COALESCE($4, daily_reminder_time),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(&update.name)
        .bind(update.mode)
        .bind(update.daily_reminder_time)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_mood_entries(&self, user_id: Uuid) -> AppResult<Vec<MoodEntry>> {
        let entries = sqlx::query_as::<_, MoodEntry>(
            "SELECT * FROM mood_entries WHERE user_id = $1 ORDER BY date ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    async fn list_energy_entries(&self, user_id: Uuid) -> AppResult<Vec<EnergyEntry>> {
        let entries = sqlx::query_as::<_, EnergyEntry>(
            "SELECT * FROM energy_entries WHERE user_id = $1 ORDER BY date ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    async fn latest_check_in(&self, user_id: Uuid) -> AppResult<Option<CheckIn>> {
        let check_in = sqlx::query_as::<_, CheckIn>(
            r#"
            SELECT * FROM check_ins
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(check_in)
    }

    async fn latest_check_ins(&self, user_ids: &[Uuid]) -> AppResult<Vec<CheckIn>> {
        let check_ins = sqlx::query_as::<_, CheckIn>(
            r#"
            SELECT DISTINCT ON (user_id) * FROM check_ins
            WHERE user_id = ANY($1)
            ORDER BY user_id, created_at DESC
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(check_ins)
    }

    async fn record_check_in(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        check_in: &NewCheckIn,
    ) -> AppResult<CheckIn> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, CheckIn>(
            r#"
            INSERT INTO check_ins (id, user_id, mood, energy, notes, tags)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(check_in.mood)
        .bind(check_in.energy)
        .bind(&check_in.notes)
        .bind(&check_in.tags)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO mood_entries (id, user_id, date, mood)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, date) DO UPDATE SET mood = EXCLUDED.mood
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(date)
        .bind(check_in.mood)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO energy_entries (id, user_id, date, energy)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, date) DO UPDATE SET energy = EXCLUDED.energy
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(date)
        .bind(check_in.energy)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn list_journal_entries(&self, user_id: Uuid) -> AppResult<Vec<JournalEntry>> {
        let entries = sqlx::query_as::<_, JournalEntry>(
            "SELECT * FROM journal_entries WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    async fn insert_journal_entry(
        &self,
        user_id: Uuid,
        entry: &NewJournalEntry,
    ) -> AppResult<JournalEntry> {
        let entry = sqlx::query_as::<_, JournalEntry>(
            r#"
            INSERT INTO journal_entries (id, user_id, title, content, mood, tags)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&entry.title)
        .bind(&entry.content)
        .bind(entry.mood)
        .bind(&entry.tags)
        .fetch_one(&self.pool)
        .await?;
        Ok(entry)
    }

    async fn update_journal_entry(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        update: &JournalEntryUpdate,
    ) -> AppResult<Option<JournalEntry>> {
        let entry = sqlx::query_as::<_, JournalEntry>(
            r#"
            UPDATE journal_entries SET
                title = COALESCE($3, title),
                content = COALESCE($4, content),
                mood = COALESCE($5, mood),
                tags = COALESCE($6, tags),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(entry_id)
        .bind(user_id)
        .bind(&update.title)
        .bind(&update.content)
        .bind(update.mood)
        .bind(&update.tags)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entry)
    }

    async fn delete_journal_entry(&self, user_id: Uuid, entry_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM journal_entries WHERE id = $1 AND user_id = $2")
            .bind(entry_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn generate_room_code(&self) -> AppResult<String> {
        let code = sqlx::query_scalar::<_, Option<String>>("SELECT generate_room_code()")
            .fetch_one(&self.pool)
            .await?
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to generate room code")))?;
        Ok(code)
    }

    async fn create_team(
        &self,
        name: &str,
        room_code: &str,
        creator: Uuid,
    ) -> AppResult<TeamRecord> {
        let mut tx = self.pool.begin().await?;

        let team = sqlx::query_as::<_, TeamRecord>(
            r#"
            INSERT INTO teams (id, name, room_code, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(room_code)
        .bind(creator)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO team_members (id, team_id, user_id, role)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(team.id)
        .bind(creator)
        .bind(MemberRole::Owner)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(team)
    }

    async fn find_team(&self, team_id: Uuid) -> AppResult<Option<TeamRecord>> {
        let team = sqlx::query_as::<_, TeamRecord>("SELECT * FROM teams WHERE id = $1")
            .bind(team_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(team)
    }

    async fn find_team_by_code(&self, room_code: &str) -> AppResult<Option<TeamRecord>> {
        let team = sqlx::query_as::<_, TeamRecord>("SELECT * FROM teams WHERE room_code = $1")
            .bind(room_code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(team)
    }

    async fn teams_for_user(&self, user_id: Uuid) -> AppResult<Vec<TeamRecord>> {
        let teams = sqlx::query_as::<_, TeamRecord>(
            r#"
            SELECT t.* FROM teams t
            JOIN team_members m ON m.team_id = t.id
            WHERE m.user_id = $1
            ORDER BY m.joined_at ASC, t.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(teams)
    }

    async fn list_team_rosters(&self, team_ids: &[Uuid]) -> AppResult<Vec<TeamMember>> {
        let members = sqlx::query_as::<_, TeamMember>(
            r#"
            SELECT m.id, m.team_id, m.user_id, m.role, m.joined_at,
                   COALESCE(u.name, 'Member') AS name
            FROM team_members m
            LEFT JOIN users u ON u.id = m.user_id
            WHERE m.team_id = ANY($1)
            ORDER BY m.team_id, m.joined_at ASC, m.id ASC
            "#,
        )
        .bind(team_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }

    async fn find_membership(
        &self,
        team_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Option<Membership>> {
        let membership = sqlx::query_as::<_, Membership>(
            "SELECT * FROM team_members WHERE team_id = $1 AND user_id = $2",
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(membership)
    }

    async fn insert_membership(
        &self,
        team_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> AppResult<Membership> {
        let result = sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO team_members (id, team_id, user_id, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(team_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(membership) => Ok(membership),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::Conflict(
                "You are already a member of this team".into(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn leave_team(&self, team_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query_scalar::<_, MemberRole>(
            "DELETE FROM team_members WHERE team_id = $1 AND user_id = $2 RETURNING role",
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(role) = removed else {
            return Ok(false);
        };

        if role == MemberRole::Owner {
            let promoted = sqlx::query_scalar::<_, Uuid>(
                r#"
                UPDATE team_members SET role = $2
                WHERE id = (
                    SELECT id FROM team_members
                    WHERE team_id = $1
                    ORDER BY joined_at ASC, id ASC
                    LIMIT 1
                )
                RETURNING user_id
                "#,
            )
            .bind(team_id)
            .bind(MemberRole::Owner)
            .fetch_optional(&mut *tx)
            .await?;

            match promoted {
                Some(new_owner) => {
                    tracing::info!(team_id = %team_id, new_owner = %new_owner, "Owner left, promoted longest-tenured member")
                }
                None => tracing::info!(team_id = %team_id, "Last member left team"),
            }
        }

        tx.commit().await?;
        Ok(true)
    }
}
