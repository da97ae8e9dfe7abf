//! Customer CRUD handlers.

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    routing::get,
    Router,
};
use axum_extra::extract::Query;
use validator::Validate;

use crate::error::AppError;
use crate::models::{Customer, CustomerCreate, PaginatedResponse, TableQuery, CUSTOMER_TABLE};
use crate::services::query;
use crate::startup::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route(
            "/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
}

/// GET /customers
async fn list_customers(
    State(state): State<AppState>,
    Query(params): Query<TableQuery>,
) -> Result<Json<PaginatedResponse<Customer>>, AppError> {
    let spec = super::build_query_spec(&params)?;
    let built = query::build_query(&CUSTOMER_TABLE, &spec)?;
    let (items, total) = state.db.fetch_page::<Customer>(&built).await?;
    Ok(Json(PaginatedResponse::new(
        items,
        total,
        built.page,
        built.page_size,
    )))
}

/// POST /customers
async fn create_customer(
    State(state): State<AppState>,
    Json(payload): Json<CustomerCreate>,
) -> Result<(StatusCode, Json<Customer>), AppError> {
    payload.validate()?;
    let customer = state.db.create_customer(&payload).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// GET /customers/{id}
async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Customer>, AppError> {
    let customer = state
        .db
        .get_customer(id)
        .await?
        .ok_or_else(|| AppError::not_found(&["path", "customer_id"], "Customer not found"))?;
    Ok(Json(customer))
}

/// PUT /customers/{id}
async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CustomerCreate>,
) -> Result<Json<Customer>, AppError> {
    payload.validate()?;
    let customer = state
        .db
        .update_customer(id, &payload)
        .await?
        .ok_or_else(|| AppError::not_found(&["path", "customer_id"], "Customer not found"))?;
    Ok(Json(customer))
}

/// DELETE /customers/{id}
async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted = state.db.delete_customer(id).await?;
    if !deleted {
        return Err(AppError::not_found(
            &["path", "customer_id"],
            "Customer not found",
        ));
    }
    Ok(StatusCode::NO_CONTENT)
}
