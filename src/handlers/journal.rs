use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::dto::{CreateJournalEntryRequest, UpdateJournalEntryRequest};
use crate::error::AppResult;
use crate::handlers::profile::{prepare_user_data, snapshot};
use crate::services::UserSnapshot;
use crate::AppState;

pub async fn create_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateJournalEntryRequest>,
) -> AppResult<Json<UserSnapshot>> {
    body.validate()?;

    let mut data = prepare_user_data(&state, auth_user).await?;
    data.add_journal_entry(body.into()).await?;
    snapshot(data)
}

pub async fn update_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
    Json(body): Json<UpdateJournalEntryRequest>,
) -> AppResult<Json<UserSnapshot>> {
    body.validate()?;

    let mut data = prepare_user_data(&state, auth_user).await?;
    data.update_journal_entry(entry_id, body.into()).await?;
    snapshot(data)
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<UserSnapshot>> {
    let mut data = prepare_user_data(&state, auth_user).await?;
    data.delete_journal_entry(entry_id).await?;
    snapshot(data)
}
