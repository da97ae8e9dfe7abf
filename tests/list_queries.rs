//! List-endpoint query pipeline: wire parameters through SQL generation.

use faktura_service::models::table::{GlobalSearch, TableQuery};
use faktura_service::models::{CUSTOMER_TABLE, INVOICE_TABLE};
use faktura_service::services::query::{
    build_query, parse_filter_params, parse_sort_params, BindValue, QuerySpec,
};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn wire_filters_become_parameterized_sql() {
    let filters = parse_filter_params(&strings(&[
        "name:contains:Müller",
        "city:exact:Berlin",
    ]))
    .unwrap();
    let spec = QuerySpec {
        filters,
        ..Default::default()
    };
    let built = build_query(&CUSTOMER_TABLE, &spec).unwrap();

    assert!(built.items_sql.contains("customers.name ILIKE $1 ESCAPE '\\'"));
    assert!(built.items_sql.contains("customers.city ILIKE $2 ESCAPE '\\'"));
    assert_eq!(
        built.binds,
        vec![
            BindValue::Text("%Müller%".to_string()),
            BindValue::Text("Berlin".to_string()),
        ]
    );
    // No user input is interpolated into the statement text.
    assert!(!built.items_sql.contains("Müller"));
    assert!(!built.items_sql.contains("Berlin"));
}

#[test]
fn wildcard_input_matches_literally() {
    let filters = parse_filter_params(&strings(&["name:contains:100%_done"])).unwrap();
    let spec = QuerySpec {
        filters,
        ..Default::default()
    };
    let built = build_query(&CUSTOMER_TABLE, &spec).unwrap();
    assert_eq!(
        built.binds,
        vec![BindValue::Text("%100\\%\\_done%".to_string())]
    );
}

#[test]
fn defaults_give_first_page_of_ten() {
    let built = build_query(&CUSTOMER_TABLE, &QuerySpec::default()).unwrap();
    assert_eq!(built.page, 1);
    assert_eq!(built.page_size, 10);
    assert!(built.items_sql.ends_with("LIMIT 10 OFFSET 0"));
    assert_eq!(built.count_sql, "SELECT COUNT(*) FROM customers");
}

#[test]
fn sort_chain_ends_with_primary_key() {
    let sort = parse_sort_params(&strings(&["date:desc", "total_amount:asc"])).unwrap();
    let spec = QuerySpec {
        sort,
        ..Default::default()
    };
    let built = build_query(&INVOICE_TABLE, &spec).unwrap();
    assert!(built.items_sql.contains(
        "ORDER BY invoices.date DESC, invoices.total_amount ASC, invoices.id ASC"
    ));
}

#[test]
fn joined_field_usage_adds_join_only_when_needed() {
    let built = build_query(&INVOICE_TABLE, &QuerySpec::default()).unwrap();
    assert!(!built.items_sql.contains("LEFT JOIN"));

    let filters = parse_filter_params(&strings(&["customer_name:startsWith:Acme"])).unwrap();
    let spec = QuerySpec {
        filters,
        ..Default::default()
    };
    let built = build_query(&INVOICE_TABLE, &spec).unwrap();
    assert!(built.items_sql.contains("LEFT JOIN customers"));
    assert!(built.count_sql.contains("COUNT(DISTINCT invoices.id)"));
}

#[test]
fn search_and_filters_combine_with_and() {
    let filters = parse_filter_params(&strings(&["profile_id:equals:2"])).unwrap();
    let spec = QuerySpec {
        filters,
        search: Some(GlobalSearch {
            query: "25 |".to_string(),
            fields: None,
        }),
        ..Default::default()
    };
    let built = build_query(&INVOICE_TABLE, &spec).unwrap();
    assert!(built.items_sql.contains("invoices.profile_id = $1 AND ("));
    assert_eq!(built.binds[0], BindValue::Int(2));
}

#[test]
fn table_query_collects_repeated_parameters() {
    // Shape check for the deserialized parameter struct.
    let params = TableQuery {
        filter: strings(&["name:contains:a", "city:exact:b"]),
        sort: strings(&["name:asc"]),
        q: None,
        page: Some(2),
        page_size: Some(25),
    };
    assert_eq!(params.filter.len(), 2);
    assert_eq!(params.sort.len(), 1);
}
