//! Shared models for table filtering, sorting and pagination.

use serde::{Deserialize, Serialize};

/// Supported filter operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    /// Text: contains (case-insensitive).
    Contains,
    /// Text: starts with (case-insensitive).
    StartsWith,
    /// Exact match (case-insensitive for text).
    Exact,
    /// Equality for numbers, booleans and dates.
    Equals,
    /// Inclusive range, value is `min,max`.
    Between,
    /// Membership test, value is a comma-separated list.
    In,
    Gt,
    Lt,
    Gte,
    Lte,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Contains => "contains",
            FilterOperator::StartsWith => "startsWith",
            FilterOperator::Exact => "exact",
            FilterOperator::Equals => "equals",
            FilterOperator::Between => "between",
            FilterOperator::In => "in",
            FilterOperator::Gt => "gt",
            FilterOperator::Lt => "lt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lte => "lte",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "contains" => Some(FilterOperator::Contains),
            "startsWith" => Some(FilterOperator::StartsWith),
            "exact" => Some(FilterOperator::Exact),
            "equals" => Some(FilterOperator::Equals),
            "between" => Some(FilterOperator::Between),
            "in" => Some(FilterOperator::In),
            "gt" => Some(FilterOperator::Gt),
            "lt" => Some(FilterOperator::Lt),
            "gte" => Some(FilterOperator::Gte),
            "lte" => Some(FilterOperator::Lte),
            _ => None,
        }
    }
}

/// Sort directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

/// A single column filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub field: String,
    pub operator: FilterOperator,
    pub value: String,
}

/// A single sort step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortField {
    pub field: String,
    pub direction: SortDirection,
}

/// Free-text search over a set of searchable fields.
#[derive(Debug, Clone, Default)]
pub struct GlobalSearch {
    pub query: String,
    /// Override of the resource's default searchable fields.
    pub fields: Option<Vec<String>>,
}

/// Raw list-endpoint query parameters, repeated keys collected into vectors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableQuery {
    #[serde(default)]
    pub filter: Vec<String>,
    #[serde(default)]
    pub sort: Vec<String>,
    pub q: Option<String>,
    pub page: Option<i64>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<i64>,
}

/// Paginated API response.
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    #[serde(rename = "pageSize")]
    pub page_size: i64,
    #[serde(rename = "pageCount")]
    pub page_count: i64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: i64, page: i64, page_size: i64) -> Self {
        let page_count = if page_size > 0 {
            (total + page_size - 1) / page_size
        } else {
            0
        };
        Self {
            items,
            total,
            page,
            page_size,
            page_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_round_trips_through_wire_token() {
        for op in [
            FilterOperator::Contains,
            FilterOperator::StartsWith,
            FilterOperator::Exact,
            FilterOperator::Equals,
            FilterOperator::Between,
            FilterOperator::In,
            FilterOperator::Gt,
            FilterOperator::Lt,
            FilterOperator::Gte,
            FilterOperator::Lte,
        ] {
            assert_eq!(FilterOperator::from_string(op.as_str()), Some(op));
        }
        assert_eq!(FilterOperator::from_string("invalid_op"), None);
    }

    #[test]
    fn page_count_uses_ceiling_division() {
        let resp = PaginatedResponse::<i32>::new(vec![], 150, 1, 10);
        assert_eq!(resp.page_count, 15);

        let resp = PaginatedResponse::<i32>::new(vec![], 4, 3, 2);
        assert_eq!(resp.page_count, 2);
        assert_eq!(resp.total, 4);

        let resp = PaginatedResponse::<i32>::new(vec![], 0, 1, 10);
        assert_eq!(resp.page_count, 0);
    }
}
