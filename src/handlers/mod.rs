//! HTTP handlers, one module per resource.

pub mod customers;
pub mod invoices;
pub mod profiles;
pub mod summary_invoices;

use crate::error::AppError;
use crate::models::table::{GlobalSearch, TableQuery};
use crate::services::query::{self, QuerySpec};

/// Page size ceiling enforced on list endpoints.
const LIST_PAGE_SIZE_CAP: i64 = 100;

/// Turn raw list-endpoint parameters into a validated query spec.
pub(crate) fn build_query_spec(params: &TableQuery) -> Result<QuerySpec, AppError> {
    let filters = query::parse_filter_params(&params.filter)?;
    let sort = query::parse_sort_params(&params.sort)?;
    let search = params.q.as_ref().map(|q| GlobalSearch {
        query: q.clone(),
        fields: None,
    });
    Ok(QuerySpec {
        filters,
        sort,
        search,
        page: params.page,
        page_size: params.page_size.map(|size| size.min(LIST_PAGE_SIZE_CAP)),
    })
}
