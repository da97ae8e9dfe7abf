//! Customer model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::services::query::{FieldDef, FieldKind, ResourceConfig};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub note: Option<String>,
}

/// Input for creating or replacing a customer.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CustomerCreate {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub note: Option<String>,
}

/// Whitelisted query surface for the customers table.
pub const CUSTOMER_TABLE: ResourceConfig = ResourceConfig {
    table: "customers",
    primary_key: "id",
    filterable: &[
        FieldDef::own("id", "customers.id", FieldKind::Int),
        FieldDef::own("name", "customers.name", FieldKind::Text),
        FieldDef::own("address", "customers.address", FieldKind::Text),
        FieldDef::own("city", "customers.city", FieldKind::Text),
        FieldDef::own("note", "customers.note", FieldKind::Text),
    ],
    sortable: &["id", "name", "address", "city"],
    searchable: &["name", "address", "city", "note"],
    join: None,
};
