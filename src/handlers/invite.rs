use axum::{
    extract::{Path, State},
    response::Redirect,
    Extension,
};
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::services::TeamMemberships;
use crate::AppState;

/// Target of invite links: joins the team, then sends the client to the web
/// app's home page.
/// Already being a member is not an error here.
pub async fn accept_invite(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(team_id): Path<Uuid>,
) -> AppResult<Redirect> {
    let mut teams = TeamMemberships::new(state.gateway.clone(), auth_user.id);

    match teams.join_team_by_invite(team_id).await {
        Ok(_) => {}
        Err(AppError::Conflict(_)) => {
            tracing::debug!(user_id = %auth_user.id, team_id = %team_id, "Invite used by existing member");
        }
        Err(e) => return Err(e),
    }

    let home = format!("{}/", state.config.public_origin.trim_end_matches('/'));
    Ok(Redirect::to(&home))
}
