use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::dto::{
    CreateTeamRequest, InviteLinkResponse, JoinTeamRequest, TeamsQuery, TeamsResponse,
};
use crate::error::{AppError, AppResult};
use crate::services::metrics::{team_pulse, TeamPulse};
use crate::services::teams::generate_invite_link;
use crate::services::TeamMemberships;
use crate::AppState;

pub(crate) async fn load_teams(state: &AppState, user_id: Uuid) -> AppResult<TeamMemberships> {
    let mut teams = TeamMemberships::new(state.gateway.clone(), user_id);
    teams.load_user_teams().await?;
    Ok(teams)
}

fn teams_response(teams: TeamMemberships) -> Json<TeamsResponse> {
    let (teams, current_team) = teams.into_parts();
    Json(TeamsResponse {
        teams,
        current_team,
    })
}

pub async fn list_teams(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<TeamsQuery>,
) -> AppResult<Json<TeamsResponse>> {
    let mut teams = load_teams(&state, auth_user.id).await?;
    if let Some(team_id) = query.current {
        teams.select_team(team_id);
    }
    Ok(teams_response(teams))
}

pub async fn create_team(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateTeamRequest>,
) -> AppResult<Json<TeamsResponse>> {
    body.validate()?;

    let mut teams = TeamMemberships::new(state.gateway.clone(), auth_user.id);
    teams.create_team(&body.name).await?;
    Ok(teams_response(teams))
}

pub async fn join_team(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<JoinTeamRequest>,
) -> AppResult<Json<TeamsResponse>> {
    body.validate()?;

    let mut teams = TeamMemberships::new(state.gateway.clone(), auth_user.id);
    teams.join_team(&body.room_code).await?;
    Ok(teams_response(teams))
}

pub async fn join_team_by_invite(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(team_id): Path<Uuid>,
) -> AppResult<Json<TeamsResponse>> {
    let mut teams = TeamMemberships::new(state.gateway.clone(), auth_user.id);
    teams.join_team_by_invite(team_id).await?;
    Ok(teams_response(teams))
}

pub async fn leave_team(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(team_id): Path<Uuid>,
) -> AppResult<Json<TeamsResponse>> {
    let mut teams = TeamMemberships::new(state.gateway.clone(), auth_user.id);
    teams.leave_team(team_id).await?;
    Ok(teams_response(teams))
}

pub async fn invite_link(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(team_id): Path<Uuid>,
) -> AppResult<Json<InviteLinkResponse>> {
    let teams = load_teams(&state, auth_user.id).await?;
    let team = teams
        .find(team_id)
        .ok_or_else(|| AppError::NotFound("Team not found".into()))?;

    Ok(Json(InviteLinkResponse {
        team_id,
        room_code: team.record.room_code.clone(),
        invite_link: generate_invite_link(&state.config.public_origin, team_id),
    }))
}

pub async fn get_team_pulse(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(team_id): Path<Uuid>,
) -> AppResult<Json<TeamPulse>> {
    let teams = load_teams(&state, auth_user.id).await?;
    let team = teams
        .find(team_id)
        .ok_or_else(|| AppError::NotFound("Team not found".into()))?;

    let member_ids: Vec<Uuid> = team.members.iter().map(|m| m.user_id).collect();
    let latest = state.gateway.latest_check_ins(&member_ids).await?;

    Ok(Json(team_pulse(team, &latest)))
}
