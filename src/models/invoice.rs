//! Invoice and invoice item models, plus creation-time validation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;
use crate::services::query::{FieldDef, FieldKind, JoinSpec, ResourceConfig};
use crate::services::tax::{self, round2};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub id: i64,
    /// Globally sequential number, format `"YY | NNN"`.
    pub number: String,
    pub date: NaiveDate,
    pub customer_id: i64,
    pub profile_id: i64,
    pub total_amount: f64,
    pub include_tax: bool,
    pub tax_rate: Option<f64>,
    pub is_gross_amount: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InvoiceItem {
    pub id: i64,
    pub invoice_id: i64,
    pub quantity: i32,
    pub description: String,
    pub price: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceItemCreate {
    pub quantity: i32,
    pub description: String,
    pub price: f64,
    /// Accepted for API compatibility; items carry no persisted tax rate.
    #[serde(default)]
    pub tax_rate: Option<f64>,
}

/// Input for creating an invoice together with its items.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceCreate {
    pub date: NaiveDate,
    pub customer_id: i64,
    pub profile_id: i64,
    pub total_amount: f64,
    pub invoice_items: Vec<InvoiceItemCreate>,
    /// Inherited from the profile when unset.
    #[serde(default)]
    pub include_tax: Option<bool>,
    /// Inherited from the profile when unset and tax applies.
    #[serde(default)]
    pub tax_rate: Option<f64>,
    #[serde(default)]
    pub is_gross_amount: bool,
}

impl InvoiceCreate {
    /// Field validation applied before any persistence attempt.
    ///
    /// Rules are evaluated in order; the first violated rule is reported
    /// with the offending field name.
    pub fn validate_fields(&self) -> Result<(), AppError> {
        if self.invoice_items.is_empty() {
            return Err(AppError::validation(
                &["body", "invoice_items"],
                "invoice_items must not be empty",
            ));
        }

        if self.total_amount < 0.0 {
            return Err(AppError::validation(
                &["body", "total_amount"],
                "total_amount must be >= 0",
            ));
        }

        if self.is_gross_amount {
            if self.include_tax != Some(true) {
                return Err(AppError::validation(
                    &["body", "is_gross_amount"],
                    "is_gross_amount can only be True if include_tax is True",
                ));
            }
            if self.tax_rate.is_none() {
                return Err(AppError::validation(
                    &["body", "tax_rate"],
                    "tax_rate must be provided if is_gross_amount is True",
                ));
            }
        }

        if self.include_tax == Some(false) {
            if let Some(rate) = self.tax_rate {
                if rate != 0.0 {
                    return Err(AppError::validation(
                        &["body", "tax_rate"],
                        "tax_rate must be 0 if include_tax is False",
                    ));
                }
            }
        }

        if self.include_tax == Some(true) {
            let rate = self.tax_rate.ok_or_else(|| {
                AppError::validation(
                    &["body", "tax_rate"],
                    "tax_rate must be provided if include_tax is True",
                )
            })?;
            if !(0.0..=1.0).contains(&rate) {
                return Err(AppError::validation(
                    &["body", "tax_rate"],
                    "tax_rate must be between 0 and 1",
                ));
            }
        }

        Ok(())
    }

    /// Resolve tax flags against the owning profile.
    ///
    /// Unset `include_tax` inherits from the profile; unset `tax_rate`
    /// inherits the profile default when tax applies and is forced to 0
    /// otherwise.
    pub fn resolve_tax_fields(&self, profile: &super::Profile) -> (bool, Option<f64>) {
        let include_tax = self.include_tax.unwrap_or(profile.include_tax);
        let tax_rate = if include_tax {
            Some(self.tax_rate.unwrap_or(profile.default_tax_rate))
        } else {
            Some(0.0)
        };
        (include_tax, tax_rate)
    }

    /// Check that the item sum matches `total_amount` within the 0.01
    /// tolerance. A difference of exactly 0.01 or more fails.
    pub fn check_items_total(&self) -> Result<(), AppError> {
        let calculated_total = round2(
            self.invoice_items
                .iter()
                .map(|item| item.quantity as f64 * item.price)
                .sum(),
        );
        let difference = round2(calculated_total - self.total_amount);

        if difference >= 0.01 {
            return Err(AppError::validation(
                &["body", "total_amount"],
                "Sum of invoice items exceeds total_amount by more than 0.01.",
            ));
        }
        if -difference >= 0.01 {
            return Err(AppError::validation(
                &["body", "total_amount"],
                "Sum of invoice items is less than total_amount by more than 0.01.",
            ));
        }
        Ok(())
    }
}

/// Fully resolved invoice ready for insertion; the number is allocated
/// inside the creation transaction.
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub date: NaiveDate,
    pub customer_id: i64,
    pub profile_id: i64,
    pub total_amount: f64,
    pub include_tax: bool,
    pub tax_rate: Option<f64>,
    pub is_gross_amount: bool,
    pub items: Vec<InvoiceItemCreate>,
}

/// Invoice read model: stored fields plus computed amounts and the linked
/// customer's name.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceRead {
    pub id: i64,
    pub number: String,
    pub date: NaiveDate,
    pub customer_id: i64,
    pub profile_id: i64,
    pub total_amount: f64,
    pub include_tax: bool,
    pub tax_rate: Option<f64>,
    pub is_gross_amount: bool,
    pub total_net: f64,
    pub total_tax: f64,
    pub total_gross: f64,
    pub customer_name: Option<String>,
    pub invoice_items: Vec<InvoiceItem>,
}

impl InvoiceRead {
    pub fn from_parts(
        invoice: Invoice,
        items: Vec<InvoiceItem>,
        customer_name: Option<String>,
    ) -> Self {
        let amounts = tax::compute_amounts(
            invoice.total_amount,
            invoice.tax_rate.unwrap_or(0.0),
            invoice.include_tax,
            invoice.is_gross_amount,
        );
        Self {
            id: invoice.id,
            number: invoice.number,
            date: invoice.date,
            customer_id: invoice.customer_id,
            profile_id: invoice.profile_id,
            total_amount: invoice.total_amount,
            include_tax: invoice.include_tax,
            tax_rate: invoice.tax_rate,
            is_gross_amount: invoice.is_gross_amount,
            total_net: amounts.net,
            total_tax: amounts.tax,
            total_gross: amounts.gross,
            customer_name,
            invoice_items: items,
        }
    }
}

/// Whitelisted query surface for the invoices table. `customer_name` lives
/// on the joined customers table.
pub const INVOICE_TABLE: ResourceConfig = ResourceConfig {
    table: "invoices",
    primary_key: "id",
    filterable: &[
        FieldDef::own("id", "invoices.id", FieldKind::Int),
        FieldDef::own("number", "invoices.number", FieldKind::Text),
        FieldDef::own("date", "invoices.date", FieldKind::Date),
        FieldDef::own("customer_id", "invoices.customer_id", FieldKind::Int),
        FieldDef::own("profile_id", "invoices.profile_id", FieldKind::Int),
        FieldDef::own("total_amount", "invoices.total_amount", FieldKind::Float),
        FieldDef::own("include_tax", "invoices.include_tax", FieldKind::Bool),
        FieldDef::own("tax_rate", "invoices.tax_rate", FieldKind::Float),
        FieldDef::own(
            "is_gross_amount",
            "invoices.is_gross_amount",
            FieldKind::Bool,
        ),
        FieldDef::joined("customer_name", "customers.name", FieldKind::Text),
    ],
    sortable: &[
        "id",
        "number",
        "date",
        "customer_id",
        "profile_id",
        "total_amount",
        "customer_name",
    ],
    searchable: &["number", "customer_name"],
    join: Some(JoinSpec {
        clause: "LEFT JOIN customers ON customers.id = invoices.customer_id",
        select_extra: ", customers.name AS customer_name",
    }),
};
