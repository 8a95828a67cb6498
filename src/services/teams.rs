//! Team membership for one identity: the teams it belongs to and which of
//! them is selected. Every mutation reloads the full list; errors propagate.

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use uuid::Uuid;

use crate::db::Gateway;
use crate::error::{AppError, AppResult};
use crate::models::team::{normalize_room_code, MemberRole, Team, TeamMember, TeamRecord};

pub struct TeamMemberships {
    gateway: Arc<dyn Gateway>,
    user_id: Uuid,
    teams: Vec<Team>,
    current_team: Option<Uuid>,
}

impl TeamMemberships {
    pub fn new(gateway: Arc<dyn Gateway>, user_id: Uuid) -> Self {
        Self {
            gateway,
            user_id,
            teams: Vec::new(),
            current_team: None,
        }
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn current_team(&self) -> Option<&Team> {
        let id = self.current_team?;
        self.teams.iter().find(|t| t.id() == id)
    }

    pub fn find(&self, team_id: Uuid) -> Option<&Team> {
        self.teams.iter().find(|t| t.id() == team_id)
    }

    /// Selects one of the loaded teams. Returns `false` (and keeps the
    /// selection) if the identity is not in that team.
    pub fn select_team(&mut self, team_id: Uuid) -> bool {
        if self.find(team_id).is_some() {
            self.current_team = Some(team_id);
            true
        } else {
            false
        }
    }

    pub fn into_parts(self) -> (Vec<Team>, Option<Team>) {
        let current = self.current_team().cloned();
        (self.teams, current)
    }

    /// Loads every team the identity belongs to with its full roster, and
    /// selects the first one.
    pub async fn load_user_teams(&mut self) -> AppResult<()> {
        let records = self.gateway.teams_for_user(self.user_id).await?;

        let team_ids: Vec<Uuid> = records.iter().map(|t| t.id).collect();
        let roster = if team_ids.is_empty() {
            Vec::new()
        } else {
            self.gateway.list_team_rosters(&team_ids).await?
        };

        let mut by_team: HashMap<Uuid, Vec<TeamMember>> = HashMap::new();
        for member in roster {
            by_team.entry(member.team_id).or_default().push(member);
        }

        self.teams = records
            .into_iter()
            .map(|record| {
                let members = by_team.remove(&record.id).unwrap_or_default();
                Team { record, members }
            })
            .collect();
        self.current_team = self.teams.first().map(Team::id);

        tracing::debug!(user_id = %self.user_id, teams = self.teams.len(), "Loaded teams");
        Ok(())
    }

    pub async fn create_team(&mut self, name: &str) -> AppResult<TeamRecord> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Team name is required".into()));
        }

        let room_code = self.gateway.generate_room_code().await?;
        let team = self
            .gateway
            .create_team(name, &room_code, self.user_id)
            .await?;
        tracing::info!(user_id = %self.user_id, team_id = %team.id, room_code = %team.room_code, "Team created");

        self.load_user_teams().await?;
        Ok(team)
    }

    /// Joins by room code, matched case-insensitively.
    pub async fn join_team(&mut self, room_code: &str) -> AppResult<TeamRecord> {
        let room_code = normalize_room_code(room_code);
        if room_code.is_empty() {
            return Err(AppError::Validation("Room code is required".into()));
        }

        let team = self
            .gateway
            .find_team_by_code(&room_code)
            .await?
            .ok_or_else(|| AppError::NotFound("Invalid room code".into()))?;

        self.join(team).await
    }

    /// Joins by team id, as carried by an invite link.
    pub async fn join_team_by_invite(&mut self, team_id: Uuid) -> AppResult<TeamRecord> {
        let team = self
            .gateway
            .find_team(team_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Team not found".into()))?;

        self.join(team).await
    }

    async fn join(&mut self, team: TeamRecord) -> AppResult<TeamRecord> {
        if self
            .gateway
            .find_membership(team.id, self.user_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "You are already a member of this team".into(),
            ));
        }

        self.gateway
            .insert_membership(team.id, self.user_id, MemberRole::Member)
            .await?;
        tracing::info!(user_id = %self.user_id, team_id = %team.id, "Joined team");

        self.load_user_teams().await?;
        Ok(team)
    }

    pub async fn leave_team(&mut self, team_id: Uuid) -> AppResult<()> {
        if !self.gateway.leave_team(team_id, self.user_id).await? {
            return Err(AppError::NotFound(
                "You are not a member of this team".into(),
            ));
        }
        tracing::info!(user_id = %self.user_id, team_id = %team_id, "Left team");

        self.load_user_teams().await
    }
}

/// `<origin>/invite/<team-id>`. The link never expires; anyone holding it
/// can join while the team exists.
pub fn generate_invite_link(origin: &str, team_id: impl Display) -> String {
    format!("{}/invite/{}", origin.trim_end_matches('/'), team_id)
}
