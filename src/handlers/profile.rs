use axum::{extract::State, Extension, Json};
use chrono::Utc;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::dto::{CheckInRequest, UpdateProfileRequest};
use crate::error::{AppError, AppResult};
use crate::services::{UserData, UserSnapshot};
use crate::AppState;

/// Loads the caller's aggregate, creating the profile on first use.
async fn load_user_data(state: &AppState, auth_user: AuthUser) -> AppResult<UserData> {
    let mut data = UserData::new(state.gateway.clone(), auth_user);
    data.load().await;
    if data.user().is_none() {
        return Err(AppError::Unavailable("User profile could not be loaded".into()));
    }
    Ok(data)
}

/// Makes sure the caller's profile exists without loading the rest of the
/// aggregate. Used ahead of writes, which reload afterwards.
pub(crate) async fn prepare_user_data(state: &AppState, auth_user: AuthUser) -> AppResult<UserData> {
    let user_id = auth_user.id;
    let data = UserData::new(state.gateway.clone(), auth_user);
    if let Err(e) = data.ensure_profile().await {
        tracing::error!(user_id = %user_id, error = %e, "Failed to load user profile");
        return Err(AppError::Unavailable("User profile could not be loaded".into()));
    }
    Ok(data)
}

pub(crate) fn snapshot(data: UserData) -> AppResult<Json<UserSnapshot>> {
    data.into_user()
        .map(Json)
        .ok_or_else(|| AppError::Unavailable("User profile could not be loaded".into()))
}

pub async fn get_me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<UserSnapshot>> {
    let data = load_user_data(&state, auth_user).await?;
    snapshot(data)
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> AppResult<Json<UserSnapshot>> {
    body.validate()?;

    let mut data = load_user_data(&state, auth_user).await?;
    data.update_user(body.into()).await?;
    snapshot(data)
}

pub async fn create_check_in(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CheckInRequest>,
) -> AppResult<Json<UserSnapshot>> {
    body.validate()?;
    let requested = body.date;
    let date = body
        .validate_date(Utc::now().date_naive())
        .map_err(AppError::Validation)?;

    let mut data = prepare_user_data(&state, auth_user).await?;
    let check_in = body.into_check_in();
    match requested {
        Some(_) => data.add_check_in_on(date, check_in).await?,
        None => data.add_check_in(check_in).await?,
    };
    snapshot(data)
}
