//! Summary invoice models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;
use crate::services::query::{FieldDef, FieldKind, ResourceConfig};
use crate::services::summary::RejectedInvoice;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SummaryInvoice {
    pub id: i64,
    /// Human-readable invoice range, e.g. `"25 | 0001 - 25 | 0017"`.
    pub range_text: String,
    pub date: NaiveDate,
    pub profile_id: i64,
    pub total_net: f64,
    pub total_tax: f64,
    pub total_gross: f64,
    pub recipient_customer_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryInvoiceCreate {
    pub profile_id: i64,
    pub invoice_ids: Vec<i64>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub recipient_customer_id: Option<i64>,
}

impl SummaryInvoiceCreate {
    pub fn validate_fields(&self) -> Result<(), AppError> {
        if self.invoice_ids.is_empty() {
            return Err(AppError::invalid(
                &["body"],
                "At least one invoice ID must be provided.",
            ));
        }
        if self.profile_id <= 0 {
            return Err(AppError::invalid(
                &["body"],
                "A valid profile ID must be provided.",
            ));
        }
        Ok(())
    }
}

/// Fully aggregated summary ready for insertion.
#[derive(Debug, Clone)]
pub struct NewSummaryInvoice {
    pub range_text: String,
    pub date: NaiveDate,
    pub profile_id: i64,
    pub total_net: f64,
    pub total_tax: f64,
    pub total_gross: f64,
    pub recipient_customer_id: Option<i64>,
    pub invoice_ids: Vec<i64>,
}

/// Summary invoice read model with linked invoice ids. Rejected ids are
/// only reported on creation responses.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryInvoiceRead {
    pub id: i64,
    pub range_text: String,
    pub date: NaiveDate,
    pub profile_id: i64,
    pub total_net: f64,
    pub total_tax: f64,
    pub total_gross: f64,
    pub recipient_customer_id: Option<i64>,
    pub invoice_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected: Option<Vec<RejectedInvoice>>,
}

impl SummaryInvoiceRead {
    pub fn from_parts(summary: SummaryInvoice, invoice_ids: Vec<i64>) -> Self {
        Self {
            id: summary.id,
            range_text: summary.range_text,
            date: summary.date,
            profile_id: summary.profile_id,
            total_net: summary.total_net,
            total_tax: summary.total_tax,
            total_gross: summary.total_gross,
            recipient_customer_id: summary.recipient_customer_id,
            invoice_ids,
            rejected: None,
        }
    }
}

pub const SUMMARY_INVOICE_TABLE: ResourceConfig = ResourceConfig {
    table: "summary_invoices",
    primary_key: "id",
    filterable: &[
        FieldDef::own("id", "summary_invoices.id", FieldKind::Int),
        FieldDef::own("range_text", "summary_invoices.range_text", FieldKind::Text),
        FieldDef::own("date", "summary_invoices.date", FieldKind::Date),
        FieldDef::own("profile_id", "summary_invoices.profile_id", FieldKind::Int),
        FieldDef::own("total_net", "summary_invoices.total_net", FieldKind::Float),
        FieldDef::own("total_tax", "summary_invoices.total_tax", FieldKind::Float),
        FieldDef::own(
            "total_gross",
            "summary_invoices.total_gross",
            FieldKind::Float,
        ),
        FieldDef::own(
            "recipient_customer_id",
            "summary_invoices.recipient_customer_id",
            FieldKind::Int,
        ),
    ],
    sortable: &["id", "range_text", "date", "profile_id", "total_gross"],
    searchable: &["range_text"],
    join: None,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_invoice_ids_rejected() {
        let req = SummaryInvoiceCreate {
            profile_id: 1,
            invoice_ids: vec![],
            date: None,
            recipient_customer_id: None,
        };
        let err = req.validate_fields().unwrap_err();
        assert!(matches!(err, AppError::Invalid { ref msg, .. }
            if msg == "At least one invoice ID must be provided."));
    }

    #[test]
    fn non_positive_profile_id_rejected() {
        let req = SummaryInvoiceCreate {
            profile_id: 0,
            invoice_ids: vec![1],
            date: None,
            recipient_customer_id: None,
        };
        let err = req.validate_fields().unwrap_err();
        assert!(matches!(err, AppError::Invalid { ref msg, .. }
            if msg == "A valid profile ID must be provided."));
    }
}
