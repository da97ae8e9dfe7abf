pub mod customer;
pub mod invoice;
pub mod profile;
pub mod summary_invoice;
pub mod table;

pub use customer::{Customer, CustomerCreate, CUSTOMER_TABLE};
pub use invoice::{
    Invoice, InvoiceCreate, InvoiceItem, InvoiceItemCreate, InvoiceRead, NewInvoice, INVOICE_TABLE,
};
pub use profile::{Profile, ProfileCreate, PROFILE_TABLE};
pub use summary_invoice::{
    NewSummaryInvoice, SummaryInvoice, SummaryInvoiceCreate, SummaryInvoiceRead,
    SUMMARY_INVOICE_TABLE,
};
pub use table::{
    ColumnFilter, FilterOperator, PaginatedResponse, SortDirection, SortField, TableQuery,
};
