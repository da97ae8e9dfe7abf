//! SQL building for list endpoints: column filters, stable sorting,
//! free-text search and pagination over a per-resource whitelist.
//!
//! Every referenced field must appear in the resource's static
//! [`ResourceConfig`]; anything else is rejected before touching SQL.

use chrono::NaiveDate;
use tracing::warn;

use crate::error::AppError;
use crate::models::table::{
    ColumnFilter, FilterOperator, GlobalSearch, SortDirection, SortField,
};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 1000;

/// Value domain of a filterable column, used to pick parse and compare
/// behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Int,
    Float,
    Bool,
    Date,
}

/// One whitelisted field: its wire name and the qualified SQL column it
/// maps to.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
    /// True when the column lives on a joined table.
    pub joined: bool,
}

impl FieldDef {
    pub const fn own(name: &'static str, column: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            column,
            kind,
            joined: false,
        }
    }

    pub const fn joined(name: &'static str, column: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            column,
            kind,
            joined: true,
        }
    }
}

/// Join needed when filtering, sorting or searching on joined fields.
#[derive(Debug, Clone, Copy)]
pub struct JoinSpec {
    pub clause: &'static str,
    pub select_extra: &'static str,
}

/// Static query surface of one resource.
#[derive(Debug, Clone, Copy)]
pub struct ResourceConfig {
    pub table: &'static str,
    pub primary_key: &'static str,
    pub filterable: &'static [FieldDef],
    pub sortable: &'static [&'static str],
    pub searchable: &'static [&'static str],
    pub join: Option<JoinSpec>,
}

impl ResourceConfig {
    fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.filterable.iter().find(|f| f.name == name)
    }
}

/// A value bound into the generated SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
}

/// Parsed and validated list request.
#[derive(Debug, Clone, Default)]
pub struct QuerySpec {
    pub filters: Vec<ColumnFilter>,
    pub sort: Vec<SortField>,
    pub search: Option<GlobalSearch>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// SQL ready for execution: one statement for the page of items and one
/// for the unpaginated count, sharing the same bind list prefix.
#[derive(Debug, Clone)]
pub struct BuiltQuery {
    pub items_sql: String,
    pub count_sql: String,
    pub binds: Vec<BindValue>,
    pub page: i64,
    pub page_size: i64,
}

/// Escape LIKE wildcards so user input matches literally.
pub fn escape_wildcards(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Parse `field:operator:value` filter parameters. Malformed entries are
/// skipped with a warning; an unknown operator is a hard error.
pub fn parse_filter_params(params: &[String]) -> Result<Vec<ColumnFilter>, AppError> {
    let mut filters = Vec::new();
    for raw in params {
        let mut parts = raw.splitn(3, ':');
        let (field, op, value) = match (parts.next(), parts.next(), parts.next()) {
            (Some(f), Some(o), Some(v)) => (f, o, v),
            _ => {
                warn!(filter = %raw, "skipping malformed filter parameter");
                continue;
            }
        };
        let operator = FilterOperator::from_string(op)
            .ok_or_else(|| AppError::bad_request(format!("Invalid filter operator: {op}")))?;
        filters.push(ColumnFilter {
            field: field.to_string(),
            operator,
            value: value.to_string(),
        });
    }
    Ok(filters)
}

/// Parse `field:direction` sort parameters. Malformed entries are skipped
/// with a warning; an unknown direction is a hard error.
pub fn parse_sort_params(params: &[String]) -> Result<Vec<SortField>, AppError> {
    let mut sorts = Vec::new();
    for raw in params {
        let parts: Vec<&str> = raw.split(':').collect();
        if parts.len() != 2 {
            warn!(sort = %raw, "skipping malformed sort parameter");
            continue;
        }
        let direction = SortDirection::from_string(parts[1]).ok_or_else(|| {
            AppError::bad_request(format!(
                "Invalid sort direction: {} (use 'asc' or 'desc')",
                parts[1]
            ))
        })?;
        sorts.push(SortField {
            field: parts[0].to_string(),
            direction,
        });
    }
    Ok(sorts)
}

struct SqlBuilder {
    binds: Vec<BindValue>,
}

impl SqlBuilder {
    fn new() -> Self {
        Self { binds: Vec::new() }
    }

    fn push(&mut self, value: BindValue) -> String {
        self.binds.push(value);
        format!("${}", self.binds.len())
    }
}

fn parse_typed(field: &FieldDef, value: &str) -> Result<BindValue, AppError> {
    let parse_err = |detail: String| {
        AppError::bad_request(format!(
            "Error applying filter on field '{}': {detail}",
            field.name
        ))
    };
    match field.kind {
        FieldKind::Text => Ok(BindValue::Text(value.to_string())),
        FieldKind::Int => value
            .trim()
            .parse::<i64>()
            .map(BindValue::Int)
            .map_err(|_| parse_err(format!("'{value}' is not a valid integer"))),
        FieldKind::Float => value
            .trim()
            .parse::<f64>()
            .map(BindValue::Float)
            .map_err(|_| parse_err(format!("'{value}' is not a valid number"))),
        FieldKind::Bool => match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(BindValue::Bool(true)),
            "false" | "0" => Ok(BindValue::Bool(false)),
            _ => Err(parse_err(format!("'{value}' is not a valid boolean"))),
        },
        FieldKind::Date => NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map(BindValue::Date)
            .map_err(|_| parse_err(format!("'{value}' is not a valid date (use YYYY-MM-DD)"))),
    }
}

/// Column expression usable with ILIKE regardless of the column type.
fn text_expr(field: &FieldDef) -> String {
    if field.kind == FieldKind::Text {
        field.column.to_string()
    } else {
        format!("{}::text", field.column)
    }
}

fn filter_condition(
    builder: &mut SqlBuilder,
    field: &FieldDef,
    filter: &ColumnFilter,
) -> Result<String, AppError> {
    match filter.operator {
        FilterOperator::Contains => {
            let pattern = format!("%{}%", escape_wildcards(&filter.value));
            let ph = builder.push(BindValue::Text(pattern));
            Ok(format!("{} ILIKE {ph} ESCAPE '\\'", text_expr(field)))
        }
        FilterOperator::StartsWith => {
            let pattern = format!("{}%", escape_wildcards(&filter.value));
            let ph = builder.push(BindValue::Text(pattern));
            Ok(format!("{} ILIKE {ph} ESCAPE '\\'", text_expr(field)))
        }
        FilterOperator::Exact => {
            let pattern = escape_wildcards(&filter.value);
            let ph = builder.push(BindValue::Text(pattern));
            Ok(format!("{} ILIKE {ph} ESCAPE '\\'", text_expr(field)))
        }
        FilterOperator::Equals => {
            let ph = builder.push(parse_typed(field, &filter.value)?);
            Ok(format!("{} = {ph}", field.column))
        }
        FilterOperator::Gt => {
            let ph = builder.push(parse_typed(field, &filter.value)?);
            Ok(format!("{} > {ph}", field.column))
        }
        FilterOperator::Lt => {
            let ph = builder.push(parse_typed(field, &filter.value)?);
            Ok(format!("{} < {ph}", field.column))
        }
        FilterOperator::Gte => {
            let ph = builder.push(parse_typed(field, &filter.value)?);
            Ok(format!("{} >= {ph}", field.column))
        }
        FilterOperator::Lte => {
            let ph = builder.push(parse_typed(field, &filter.value)?);
            Ok(format!("{} <= {ph}", field.column))
        }
        FilterOperator::Between => {
            let parts: Vec<&str> = filter.value.splitn(2, ',').collect();
            if parts.len() != 2 {
                return Err(AppError::bad_request(format!(
                    "Error applying filter on field '{}': 'between' expects 'min,max'",
                    field.name
                )));
            }
            let lo = builder.push(parse_typed(field, parts[0])?);
            let hi = builder.push(parse_typed(field, parts[1])?);
            Ok(format!(
                "({col} >= {lo} AND {col} <= {hi})",
                col = field.column
            ))
        }
        FilterOperator::In => {
            let mut placeholders = Vec::new();
            for part in filter.value.split(',') {
                placeholders.push(builder.push(parse_typed(field, part)?));
            }
            if placeholders.is_empty() {
                return Err(AppError::bad_request(format!(
                    "Error applying filter on field '{}': 'in' expects at least one value",
                    field.name
                )));
            }
            Ok(format!("{} IN ({})", field.column, placeholders.join(", ")))
        }
    }
}

/// Build the items and count statements for one list request.
pub fn build_query(config: &ResourceConfig, spec: &QuerySpec) -> Result<BuiltQuery, AppError> {
    let mut builder = SqlBuilder::new();
    let mut conditions = Vec::new();
    let mut uses_join = false;

    for filter in &spec.filters {
        let field = config.field(&filter.field).ok_or_else(|| {
            AppError::bad_request(format!("Field '{}' not allowed for filtering", filter.field))
        })?;
        uses_join |= field.joined;
        conditions.push(filter_condition(&mut builder, field, filter)?);
    }

    if let Some(search) = &spec.search {
        let query = search.query.trim();
        if !query.is_empty() {
            let field_names: Vec<&str> = match &search.fields {
                Some(overrides) => overrides.iter().map(String::as_str).collect(),
                None => config.searchable.to_vec(),
            };
            let mut clauses = Vec::new();
            let pattern = format!("%{}%", escape_wildcards(query));
            for name in field_names {
                let field = config.field(name).ok_or_else(|| {
                    AppError::bad_request(format!("Field '{name}' not allowed for searching"))
                })?;
                uses_join |= field.joined;
                let ph = builder.push(BindValue::Text(pattern.clone()));
                clauses.push(format!("{} ILIKE {ph} ESCAPE '\\'", text_expr(field)));
            }
            if !clauses.is_empty() {
                conditions.push(format!("({})", clauses.join(" OR ")));
            }
        }
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    // Stable ordering: the primary key is always the final tiebreaker.
    let mut order_parts = Vec::new();
    let mut pk_sorted = false;
    for sort in &spec.sort {
        if !config.sortable.contains(&sort.field.as_str()) {
            return Err(AppError::bad_request(format!(
                "Field '{}' not allowed for sorting",
                sort.field
            )));
        }
        let field = config.field(&sort.field).ok_or_else(|| {
            AppError::bad_request(format!("Field '{}' not allowed for sorting", sort.field))
        })?;
        uses_join |= field.joined;
        pk_sorted |= sort.field == config.primary_key;
        order_parts.push(format!("{} {}", field.column, sort.direction.as_sql()));
    }
    if !pk_sorted {
        order_parts.push(format!("{}.{} ASC", config.table, config.primary_key));
    }
    let order_clause = format!(" ORDER BY {}", order_parts.join(", "));

    let page = spec.page.unwrap_or(1).max(1);
    let page_size = spec
        .page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = (page - 1) * page_size;
    let limit_clause = format!(" LIMIT {page_size} OFFSET {offset}");

    let (items_sql, count_sql) = match (uses_join, config.join) {
        (true, Some(join)) => (
            format!(
                "SELECT DISTINCT {table}.*{extra} FROM {table} {join_clause}{where_clause}{order_clause}{limit_clause}",
                table = config.table,
                extra = join.select_extra,
                join_clause = join.clause,
            ),
            format!(
                "SELECT COUNT(DISTINCT {table}.{pk}) FROM {table} {join_clause}{where_clause}",
                table = config.table,
                pk = config.primary_key,
                join_clause = join.clause,
            ),
        ),
        _ => (
            format!(
                "SELECT {table}.* FROM {table}{where_clause}{order_clause}{limit_clause}",
                table = config.table,
            ),
            format!(
                "SELECT COUNT(*) FROM {table}{where_clause}",
                table = config.table,
            ),
        ),
    };

    Ok(BuiltQuery {
        items_sql,
        count_sql,
        binds: builder.binds,
        page,
        page_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CUSTOMER_TABLE, INVOICE_TABLE};

    fn spec_with_filters(filters: Vec<ColumnFilter>) -> QuerySpec {
        QuerySpec {
            filters,
            ..Default::default()
        }
    }

    fn filter(field: &str, operator: FilterOperator, value: &str) -> ColumnFilter {
        ColumnFilter {
            field: field.to_string(),
            operator,
            value: value.to_string(),
        }
    }

    #[test]
    fn wildcards_are_escaped_literally() {
        assert_eq!(escape_wildcards("100%"), "100\\%");
        assert_eq!(escape_wildcards("a_b"), "a\\_b");
        assert_eq!(escape_wildcards("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn contains_filter_builds_ilike_with_escape() {
        let spec = spec_with_filters(vec![filter("name", FilterOperator::Contains, "50%")]);
        let built = build_query(&CUSTOMER_TABLE, &spec).unwrap();
        assert!(built.items_sql.contains("customers.name ILIKE $1 ESCAPE '\\'"));
        assert_eq!(built.binds, vec![BindValue::Text("%50\\%%".to_string())]);
    }

    #[test]
    fn unknown_filter_field_rejected() {
        let spec = spec_with_filters(vec![filter("secret", FilterOperator::Contains, "x")]);
        let err = build_query(&CUSTOMER_TABLE, &spec).unwrap_err();
        assert!(err.to_string().contains("Field 'secret' not allowed for filtering"));
    }

    #[test]
    fn unknown_sort_field_rejected() {
        let spec = QuerySpec {
            sort: vec![SortField {
                field: "note".to_string(),
                direction: SortDirection::Asc,
            }],
            ..Default::default()
        };
        let err = build_query(&CUSTOMER_TABLE, &spec).unwrap_err();
        assert!(err.to_string().contains("Field 'note' not allowed for sorting"));
    }

    #[test]
    fn primary_key_appended_as_tiebreaker() {
        let spec = QuerySpec {
            sort: vec![SortField {
                field: "name".to_string(),
                direction: SortDirection::Desc,
            }],
            ..Default::default()
        };
        let built = build_query(&CUSTOMER_TABLE, &spec).unwrap();
        assert!(built
            .items_sql
            .contains("ORDER BY customers.name DESC, customers.id ASC"));
    }

    #[test]
    fn explicit_pk_sort_not_duplicated() {
        let spec = QuerySpec {
            sort: vec![SortField {
                field: "id".to_string(),
                direction: SortDirection::Desc,
            }],
            ..Default::default()
        };
        let built = build_query(&CUSTOMER_TABLE, &spec).unwrap();
        assert!(built.items_sql.contains("ORDER BY customers.id DESC LIMIT"));
    }

    #[test]
    fn default_sort_is_primary_key() {
        let built = build_query(&CUSTOMER_TABLE, &QuerySpec::default()).unwrap();
        assert!(built.items_sql.contains("ORDER BY customers.id ASC"));
    }

    #[test]
    fn pagination_clamped_and_offset_computed() {
        let spec = QuerySpec {
            page: Some(0),
            page_size: Some(5000),
            ..Default::default()
        };
        let built = build_query(&CUSTOMER_TABLE, &spec).unwrap();
        assert_eq!(built.page, 1);
        assert_eq!(built.page_size, MAX_PAGE_SIZE);
        assert!(built.items_sql.ends_with("LIMIT 1000 OFFSET 0"));

        let spec = QuerySpec {
            page: Some(3),
            page_size: Some(10),
            ..Default::default()
        };
        let built = build_query(&CUSTOMER_TABLE, &spec).unwrap();
        assert!(built.items_sql.ends_with("LIMIT 10 OFFSET 20"));
    }

    #[test]
    fn between_filter_binds_two_values() {
        let spec = spec_with_filters(vec![filter(
            "total_amount",
            FilterOperator::Between,
            "10,250.5",
        )]);
        let built = build_query(&INVOICE_TABLE, &spec).unwrap();
        assert!(built
            .items_sql
            .contains("(invoices.total_amount >= $1 AND invoices.total_amount <= $2)"));
        assert_eq!(
            built.binds,
            vec![BindValue::Float(10.0), BindValue::Float(250.5)]
        );
    }

    #[test]
    fn in_filter_binds_each_value() {
        let spec = spec_with_filters(vec![filter("customer_id", FilterOperator::In, "1,2,3")]);
        let built = build_query(&INVOICE_TABLE, &spec).unwrap();
        assert!(built.items_sql.contains("invoices.customer_id IN ($1, $2, $3)"));
        assert_eq!(
            built.binds,
            vec![BindValue::Int(1), BindValue::Int(2), BindValue::Int(3)]
        );
    }

    #[test]
    fn typed_parse_failure_names_the_field() {
        let spec = spec_with_filters(vec![filter("customer_id", FilterOperator::Equals, "abc")]);
        let err = build_query(&INVOICE_TABLE, &spec).unwrap_err();
        assert!(err
            .to_string()
            .contains("Error applying filter on field 'customer_id'"));
    }

    #[test]
    fn joined_field_switches_to_distinct_join_query() {
        let spec = spec_with_filters(vec![filter(
            "customer_name",
            FilterOperator::Contains,
            "GmbH",
        )]);
        let built = build_query(&INVOICE_TABLE, &spec).unwrap();
        assert!(built.items_sql.starts_with("SELECT DISTINCT invoices.*"));
        assert!(built
            .items_sql
            .contains("LEFT JOIN customers ON customers.id = invoices.customer_id"));
        assert!(built.count_sql.contains("COUNT(DISTINCT invoices.id)"));
    }

    #[test]
    fn search_spans_searchable_fields() {
        let spec = QuerySpec {
            search: Some(GlobalSearch {
                query: "Muster".to_string(),
                fields: None,
            }),
            ..Default::default()
        };
        let built = build_query(&CUSTOMER_TABLE, &spec).unwrap();
        assert!(built.items_sql.contains(" OR "));
        assert_eq!(built.binds.len(), CUSTOMER_TABLE.searchable.len());
    }

    #[test]
    fn blank_search_query_ignored() {
        let spec = QuerySpec {
            search: Some(GlobalSearch {
                query: "   ".to_string(),
                fields: None,
            }),
            ..Default::default()
        };
        let built = build_query(&CUSTOMER_TABLE, &spec).unwrap();
        assert!(!built.items_sql.contains("WHERE"));
    }

    #[test]
    fn non_text_filter_casts_for_ilike() {
        let spec = spec_with_filters(vec![filter("number", FilterOperator::StartsWith, "25 |")]);
        let built = build_query(&INVOICE_TABLE, &spec).unwrap();
        assert!(built.items_sql.contains("invoices.number ILIKE $1"));

        let spec = spec_with_filters(vec![filter("customer_id", FilterOperator::Contains, "4")]);
        let built = build_query(&INVOICE_TABLE, &spec).unwrap();
        assert!(built.items_sql.contains("invoices.customer_id::text ILIKE $1"));
    }

    #[test]
    fn malformed_filter_params_skipped() {
        let filters = parse_filter_params(&[
            "name:contains:Acme".to_string(),
            "garbage".to_string(),
        ])
        .unwrap();
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].field, "name");
    }

    #[test]
    fn invalid_operator_is_hard_error() {
        let err = parse_filter_params(&["name:matches:Acme".to_string()]).unwrap_err();
        assert!(err.to_string().contains("Invalid filter operator: matches"));
    }

    #[test]
    fn filter_value_may_contain_colons() {
        let filters = parse_filter_params(&["number:contains:25 | 001".to_string()]).unwrap();
        assert_eq!(filters[0].value, "25 | 001");
        let filters = parse_filter_params(&["name:exact:a:b:c".to_string()]).unwrap();
        assert_eq!(filters[0].value, "a:b:c");
    }

    #[test]
    fn invalid_sort_direction_is_hard_error() {
        let err = parse_sort_params(&["name:upwards".to_string()]).unwrap_err();
        assert!(err
            .to_string()
            .contains("Invalid sort direction: upwards (use 'asc' or 'desc')"));
    }

    #[test]
    fn malformed_sort_params_skipped() {
        let sorts = parse_sort_params(&["name".to_string(), "id:desc".to_string()]).unwrap();
        assert_eq!(sorts.len(), 1);
        assert_eq!(sorts[0].field, "id");
    }
}
