//! Summary invoice handlers.

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    routing::get,
    Router,
};
use axum_extra::extract::Query;
use chrono::Local;

use crate::error::AppError;
use crate::models::{
    NewSummaryInvoice, PaginatedResponse, SummaryInvoice, SummaryInvoiceCreate,
    SummaryInvoiceRead, TableQuery, SUMMARY_INVOICE_TABLE,
};
use crate::services::{metrics, query, summary};
use crate::startup::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_summary_invoices).post(create_summary_invoice))
        .route("/by-profile/:profile_id", get(list_by_profile))
        .route("/:id", get(get_summary_invoice).delete(delete_summary_invoice))
}

/// GET /summary-invoices
async fn list_summary_invoices(
    State(state): State<AppState>,
    Query(params): Query<TableQuery>,
) -> Result<Json<PaginatedResponse<SummaryInvoiceRead>>, AppError> {
    let spec = super::build_query_spec(&params)?;
    let built = query::build_query(&SUMMARY_INVOICE_TABLE, &spec)?;
    let (summaries, total) = state.db.fetch_page::<SummaryInvoice>(&built).await?;

    let ids: Vec<i64> = summaries.iter().map(|s| s.id).collect();
    let mut links = state.db.get_summary_invoice_ids(&ids).await?;
    let items = summaries
        .into_iter()
        .map(|summary| {
            let invoice_ids = links.remove(&summary.id).unwrap_or_default();
            SummaryInvoiceRead::from_parts(summary, invoice_ids)
        })
        .collect();

    Ok(Json(PaginatedResponse::new(
        items,
        total,
        built.page,
        built.page_size,
    )))
}

/// POST /summary-invoices
async fn create_summary_invoice(
    State(state): State<AppState>,
    Json(payload): Json<SummaryInvoiceCreate>,
) -> Result<(StatusCode, Json<SummaryInvoiceRead>), AppError> {
    payload.validate_fields()?;

    state
        .db
        .get_profile(payload.profile_id)
        .await?
        .ok_or_else(|| AppError::invalid(&["body", "profile_id"], "Profile not found"))?;

    if let Some(customer_id) = payload.recipient_customer_id {
        state.db.get_customer(customer_id).await?.ok_or_else(|| {
            AppError::invalid(
                &["body", "recipient_customer_id"],
                format!("Customer with ID {customer_id} not found"),
            )
        })?;
    }

    let invoices = state.db.get_invoices_by_ids(&payload.invoice_ids).await?;
    let aggregate = summary::aggregate(payload.profile_id, &payload.invoice_ids, &invoices)?;

    let new_summary = NewSummaryInvoice {
        range_text: aggregate.range_text,
        date: payload.date.unwrap_or_else(|| Local::now().date_naive()),
        profile_id: payload.profile_id,
        total_net: aggregate.total_net,
        total_tax: aggregate.total_tax,
        total_gross: aggregate.total_gross,
        recipient_customer_id: payload.recipient_customer_id,
        invoice_ids: aggregate.accepted_ids,
    };
    let summary_invoice = state.db.create_summary_invoice(&new_summary).await?;
    metrics::record_summary_invoice_created(summary_invoice.profile_id);

    let mut read = SummaryInvoiceRead::from_parts(summary_invoice, new_summary.invoice_ids);
    if !aggregate.rejected.is_empty() {
        read.rejected = Some(aggregate.rejected);
    }
    Ok((StatusCode::CREATED, Json(read)))
}

/// GET /summary-invoices/by-profile/{profile_id}
async fn list_by_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<i64>,
) -> Result<Json<Vec<SummaryInvoiceRead>>, AppError> {
    state
        .db
        .get_profile(profile_id)
        .await?
        .ok_or_else(|| AppError::not_found(&["path", "profile_id"], "Profile not found"))?;

    let summaries = state.db.list_summaries_by_profile(profile_id).await?;
    let ids: Vec<i64> = summaries.iter().map(|s| s.id).collect();
    let mut links = state.db.get_summary_invoice_ids(&ids).await?;

    let items = summaries
        .into_iter()
        .map(|summary| {
            let invoice_ids = links.remove(&summary.id).unwrap_or_default();
            SummaryInvoiceRead::from_parts(summary, invoice_ids)
        })
        .collect();
    Ok(Json(items))
}

/// GET /summary-invoices/{id}
async fn get_summary_invoice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SummaryInvoiceRead>, AppError> {
    let summary = state.db.get_summary_invoice(id).await?.ok_or_else(|| {
        AppError::not_found(&["path", "summary_invoice_id"], "Summary Invoice not found.")
    })?;
    let invoice_ids = state
        .db
        .get_summary_invoice_ids(&[summary.id])
        .await?
        .remove(&summary.id)
        .unwrap_or_default();
    Ok(Json(SummaryInvoiceRead::from_parts(summary, invoice_ids)))
}

/// DELETE /summary-invoices/{id}
async fn delete_summary_invoice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted = state.db.delete_summary_invoice(id).await?;
    if !deleted {
        return Err(AppError::not_found(
            &["path", "summary_invoice_id"],
            "Summary Invoice not found.",
        ));
    }
    Ok(StatusCode::NO_CONTENT)
}
