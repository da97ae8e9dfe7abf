//! Invoice handlers: list, create with number allocation, preview, delete.

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    routing::get,
    Router,
};
use axum_extra::extract::Query;
use serde::Serialize;

use crate::error::AppError;
use crate::models::{
    Invoice, InvoiceCreate, InvoiceRead, NewInvoice, PaginatedResponse, TableQuery, INVOICE_TABLE,
};
use crate::services::{metrics, query};
use crate::startup::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_invoices).post(create_invoice))
        .route("/number-preview", get(preview_number))
        .route("/:id", get(get_invoice).delete(delete_invoice))
}

#[derive(Debug, Serialize)]
struct NumberPreview {
    preview_number: String,
}

/// GET /invoices
async fn list_invoices(
    State(state): State<AppState>,
    Query(params): Query<TableQuery>,
) -> Result<Json<PaginatedResponse<InvoiceRead>>, AppError> {
    let spec = super::build_query_spec(&params)?;
    let built = query::build_query(&INVOICE_TABLE, &spec)?;
    let (invoices, total) = state.db.fetch_page::<Invoice>(&built).await?;

    let ids: Vec<i64> = invoices.iter().map(|inv| inv.id).collect();
    let customer_ids: Vec<i64> = invoices.iter().map(|inv| inv.customer_id).collect();
    let mut items_by_invoice = state.db.get_items_for_invoices(&ids).await?;
    let customer_names = state.db.get_customer_names(&customer_ids).await?;

    let items = invoices
        .into_iter()
        .map(|invoice| {
            let invoice_items = items_by_invoice.remove(&invoice.id).unwrap_or_default();
            let customer_name = customer_names.get(&invoice.customer_id).cloned();
            InvoiceRead::from_parts(invoice, invoice_items, customer_name)
        })
        .collect();

    Ok(Json(PaginatedResponse::new(
        items,
        total,
        built.page,
        built.page_size,
    )))
}

/// POST /invoices
async fn create_invoice(
    State(state): State<AppState>,
    Json(payload): Json<InvoiceCreate>,
) -> Result<(StatusCode, Json<InvoiceRead>), AppError> {
    payload.validate_fields()?;

    let profile = state
        .db
        .get_profile(payload.profile_id)
        .await?
        .ok_or_else(|| AppError::invalid(&["body", "profile_id"], "Profile does not exist."))?;
    let customer = state
        .db
        .get_customer(payload.customer_id)
        .await?
        .ok_or_else(|| AppError::invalid(&["body", "customer_id"], "Customer does not exist."))?;

    let (include_tax, tax_rate) = payload.resolve_tax_fields(&profile);
    payload.check_items_total()?;

    let new_invoice = NewInvoice {
        date: payload.date,
        customer_id: payload.customer_id,
        profile_id: payload.profile_id,
        total_amount: payload.total_amount,
        include_tax,
        tax_rate,
        is_gross_amount: payload.is_gross_amount,
        items: payload.invoice_items,
    };
    let (invoice, items) = state.db.create_invoice(&new_invoice).await?;
    metrics::record_invoice_created(invoice.profile_id);

    let read = InvoiceRead::from_parts(invoice, items, Some(customer.name));
    Ok((StatusCode::CREATED, Json(read)))
}

/// GET /invoices/number-preview
async fn preview_number(State(state): State<AppState>) -> Result<Json<NumberPreview>, AppError> {
    let preview_number = state.db.preview_invoice_number().await?;
    Ok(Json(NumberPreview { preview_number }))
}

/// GET /invoices/{id}
async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<InvoiceRead>, AppError> {
    let invoice = state
        .db
        .get_invoice(id)
        .await?
        .ok_or_else(|| AppError::not_found(&["path", "invoice_id"], "Invoice not found."))?;

    let mut items_by_invoice = state.db.get_items_for_invoices(&[invoice.id]).await?;
    let items = items_by_invoice.remove(&invoice.id).unwrap_or_default();
    let customer_name = state
        .db
        .get_customer_names(&[invoice.customer_id])
        .await?
        .remove(&invoice.customer_id);

    Ok(Json(InvoiceRead::from_parts(invoice, items, customer_name)))
}

/// DELETE /invoices/{id}
async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted = state.db.delete_invoice(id).await?;
    if !deleted {
        return Err(AppError::not_found(
            &["path", "invoice_id"],
            "Invoice not found.",
        ));
    }
    Ok(StatusCode::NO_CONTENT)
}
