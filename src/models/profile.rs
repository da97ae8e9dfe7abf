//! Seller profile model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::services::query::{FieldDef, FieldKind, ResourceConfig};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub city: String,
    pub bank_data: Option<String>,
    pub tax_number: Option<String>,
    pub include_tax: bool,
    pub default_tax_rate: f64,
}

/// Input for creating or replacing a profile.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProfileCreate {
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub name: String,
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub address: String,
    pub city: String,
    pub bank_data: Option<String>,
    pub tax_number: Option<String>,
    #[serde(default = "default_include_tax")]
    pub include_tax: bool,
    #[serde(default = "default_tax_rate")]
    #[validate(range(min = 0.0, max = 1.0, message = "default_tax_rate must be between 0 and 1"))]
    pub default_tax_rate: f64,
}

fn default_include_tax() -> bool {
    true
}

fn default_tax_rate() -> f64 {
    0.19
}

/// Whitelisted query surface for the profiles table.
pub const PROFILE_TABLE: ResourceConfig = ResourceConfig {
    table: "profiles",
    primary_key: "id",
    filterable: &[
        FieldDef::own("id", "profiles.id", FieldKind::Int),
        FieldDef::own("name", "profiles.name", FieldKind::Text),
        FieldDef::own("address", "profiles.address", FieldKind::Text),
        FieldDef::own("city", "profiles.city", FieldKind::Text),
        FieldDef::own("bank_data", "profiles.bank_data", FieldKind::Text),
        FieldDef::own("tax_number", "profiles.tax_number", FieldKind::Text),
        FieldDef::own("include_tax", "profiles.include_tax", FieldKind::Bool),
        FieldDef::own(
            "default_tax_rate",
            "profiles.default_tax_rate",
            FieldKind::Float,
        ),
    ],
    sortable: &["id", "name", "city", "default_tax_rate"],
    searchable: &["name", "address", "city", "tax_number"],
    join: None,
};
