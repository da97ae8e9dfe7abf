//! Seller profile CRUD handlers.

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    routing::get,
    Router,
};
use axum_extra::extract::Query;
use validator::Validate;

use crate::error::AppError;
use crate::models::{PaginatedResponse, Profile, ProfileCreate, TableQuery, PROFILE_TABLE};
use crate::services::query;
use crate::startup::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_profiles).post(create_profile))
        .route(
            "/:id",
            get(get_profile).put(update_profile).delete(delete_profile),
        )
}

/// GET /profiles
async fn list_profiles(
    State(state): State<AppState>,
    Query(params): Query<TableQuery>,
) -> Result<Json<PaginatedResponse<Profile>>, AppError> {
    let spec = super::build_query_spec(&params)?;
    let built = query::build_query(&PROFILE_TABLE, &spec)?;
    let (items, total) = state.db.fetch_page::<Profile>(&built).await?;
    Ok(Json(PaginatedResponse::new(
        items,
        total,
        built.page,
        built.page_size,
    )))
}

/// POST /profiles
async fn create_profile(
    State(state): State<AppState>,
    Json(payload): Json<ProfileCreate>,
) -> Result<(StatusCode, Json<Profile>), AppError> {
    payload.validate()?;
    let profile = state.db.create_profile(&payload).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /profiles/{id}
async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Profile>, AppError> {
    let profile = state
        .db
        .get_profile(id)
        .await?
        .ok_or_else(|| AppError::not_found(&["path", "profile_id"], "Profile not found"))?;
    Ok(Json(profile))
}

/// PUT /profiles/{id}
async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProfileCreate>,
) -> Result<Json<Profile>, AppError> {
    payload.validate()?;
    let profile = state
        .db
        .update_profile(id, &payload)
        .await?
        .ok_or_else(|| AppError::not_found(&["path", "profile_id"], "Profile not found"))?;
    Ok(Json(profile))
}

/// DELETE /profiles/{id}
async fn delete_profile(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted = state.db.delete_profile(id).await?;
    if !deleted {
        return Err(AppError::not_found(
            &["path", "profile_id"],
            "Profile not found",
        ));
    }
    Ok(StatusCode::NO_CONTENT)
}
