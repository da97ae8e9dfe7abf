//! Database access layer backed by a PostgreSQL connection pool.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Local;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::FromRow;
use tracing::{info, instrument, warn};

use crate::error::AppError;
use crate::models::{
    Customer, CustomerCreate, Invoice, InvoiceItem, NewInvoice, NewSummaryInvoice, Profile,
    ProfileCreate, SummaryInvoice,
};
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::numbering;
use crate::services::query::{BindValue, BuiltQuery};

/// Attempts at allocating a unique invoice number before giving up.
const NUMBER_ALLOCATION_ATTEMPTS: u32 = 3;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "faktura-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["health_check"])
            .start_timer();

        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;

        timer.observe_duration();
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // =========================================================================
    // Generic list queries
    // =========================================================================

    /// Execute a built list query: one page of rows plus the total count.
    #[instrument(skip(self, query))]
    pub async fn fetch_page<T>(&self, query: &BuiltQuery) -> Result<(Vec<T>, i64), AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["fetch_page"])
            .start_timer();

        let mut items_query = sqlx::query_as::<_, T>(&query.items_sql);
        for value in &query.binds {
            items_query = match value {
                BindValue::Text(v) => items_query.bind(v.clone()),
                BindValue::Int(v) => items_query.bind(*v),
                BindValue::Float(v) => items_query.bind(*v),
                BindValue::Bool(v) => items_query.bind(*v),
                BindValue::Date(v) => items_query.bind(*v),
            };
        }
        let items = items_query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to fetch page: {}", e)))?;

        let mut count_query = sqlx::query_scalar::<_, i64>(&query.count_sql);
        for value in &query.binds {
            count_query = match value {
                BindValue::Text(v) => count_query.bind(v.clone()),
                BindValue::Int(v) => count_query.bind(*v),
                BindValue::Float(v) => count_query.bind(*v),
                BindValue::Bool(v) => count_query.bind(*v),
                BindValue::Date(v) => count_query.bind(*v),
            };
        }
        let total = count_query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to count rows: {}", e)))?;

        timer.observe_duration();
        Ok((items, total))
    }

    // =========================================================================
    // Customer Operations
    // =========================================================================

    /// Create a new customer.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_customer(&self, input: &CustomerCreate) -> Result<Customer, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_customer"])
            .start_timer();

        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (name, address, city, note)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, address, city, note
            "#,
        )
        .bind(&input.name)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.note)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to create customer: {}", e))
        })?;

        timer.observe_duration();
        info!(customer_id = customer.id, "Customer created");
        Ok(customer)
    }

    /// Get a customer by id.
    #[instrument(skip(self))]
    pub async fn get_customer(&self, id: i64) -> Result<Option<Customer>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_customer"])
            .start_timer();

        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, name, address, city, note FROM customers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get customer: {}", e)))?;

        timer.observe_duration();
        Ok(customer)
    }

    /// Replace a customer's fields. Returns `None` when the id is unknown.
    #[instrument(skip(self, input))]
    pub async fn update_customer(
        &self,
        id: i64,
        input: &CustomerCreate,
    ) -> Result<Option<Customer>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_customer"])
            .start_timer();

        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET name = $2, address = $3, city = $4, note = $5
            WHERE id = $1
            RETURNING id, name, address, city, note
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.note)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to update customer: {}", e))
        })?;

        timer.observe_duration();
        Ok(customer)
    }

    /// Delete a customer. Returns true when a row was removed.
    #[instrument(skip(self))]
    pub async fn delete_customer(&self, id: i64) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_customer"])
            .start_timer();

        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete customer: {}", e))
            })?;

        timer.observe_duration();
        Ok(result.rows_affected() > 0)
    }

    /// Fetch customer names for a set of ids.
    #[instrument(skip(self, ids))]
    pub async fn get_customer_names(&self, ids: &[i64]) -> Result<HashMap<i64, String>, AppError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_customer_names"])
            .start_timer();

        let rows = sqlx::query_as::<_, (i64, String)>(
            "SELECT id, name FROM customers WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to fetch customer names: {}", e))
        })?;

        timer.observe_duration();
        Ok(rows.into_iter().collect())
    }

    // =========================================================================
    // Profile Operations
    // =========================================================================

    /// Create a new seller profile.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_profile(&self, input: &ProfileCreate) -> Result<Profile, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_profile"])
            .start_timer();

        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (name, address, city, bank_data, tax_number, include_tax, default_tax_rate)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, address, city, bank_data, tax_number, include_tax, default_tax_rate
            "#,
        )
        .bind(&input.name)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.bank_data)
        .bind(&input.tax_number)
        .bind(input.include_tax)
        .bind(input.default_tax_rate)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create profile: {}", e)))?;

        timer.observe_duration();
        info!(profile_id = profile.id, "Profile created");
        Ok(profile)
    }

    /// Get a profile by id.
    #[instrument(skip(self))]
    pub async fn get_profile(&self, id: i64) -> Result<Option<Profile>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_profile"])
            .start_timer();

        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, name, address, city, bank_data, tax_number, include_tax, default_tax_rate
            FROM profiles WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get profile: {}", e)))?;

        timer.observe_duration();
        Ok(profile)
    }

    /// Replace a profile's fields. Returns `None` when the id is unknown.
    #[instrument(skip(self, input))]
    pub async fn update_profile(
        &self,
        id: i64,
        input: &ProfileCreate,
    ) -> Result<Option<Profile>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_profile"])
            .start_timer();

        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET name = $2, address = $3, city = $4, bank_data = $5, tax_number = $6,
                include_tax = $7, default_tax_rate = $8
            WHERE id = $1
            RETURNING id, name, address, city, bank_data, tax_number, include_tax, default_tax_rate
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.bank_data)
        .bind(&input.tax_number)
        .bind(input.include_tax)
        .bind(input.default_tax_rate)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update profile: {}", e)))?;

        timer.observe_duration();
        Ok(profile)
    }

    /// Delete a profile. Returns true when a row was removed.
    #[instrument(skip(self))]
    pub async fn delete_profile(&self, id: i64) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_profile"])
            .start_timer();

        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete profile: {}", e))
            })?;

        timer.observe_duration();
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Invoice Operations
    // =========================================================================

    /// Create an invoice and its items, allocating the next sequential
    /// number inside a transaction.
    ///
    /// A concurrent writer can allocate the same number first; the unique
    /// constraint on `invoices.number` catches that and the allocation is
    /// retried with a fresh scan.
    #[instrument(skip(self, input), fields(profile_id = input.profile_id))]
    pub async fn create_invoice(
        &self,
        input: &NewInvoice,
    ) -> Result<(Invoice, Vec<InvoiceItem>), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_invoice"])
            .start_timer();

        let year_suffix = Local::now().format("%y").to_string();
        let prefix_pattern = format!("{year_suffix} |%");

        for attempt in 1..=NUMBER_ALLOCATION_ATTEMPTS {
            let mut tx = self.pool.begin().await.map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
            })?;

            let existing: Vec<String> =
                sqlx::query_scalar("SELECT number FROM invoices WHERE number LIKE $1")
                    .bind(&prefix_pattern)
                    .fetch_all(&mut *tx)
                    .await
                    .map_err(|e| {
                        AppError::DatabaseError(anyhow::anyhow!(
                            "Failed to scan invoice numbers: {}",
                            e
                        ))
                    })?;
            let number = numbering::next_number(&year_suffix, &existing);

            let inserted = sqlx::query_as::<_, Invoice>(
                r#"
                INSERT INTO invoices (number, date, customer_id, profile_id, total_amount, include_tax, tax_rate, is_gross_amount)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING id, number, date, customer_id, profile_id, total_amount, include_tax, tax_rate, is_gross_amount
                "#,
            )
            .bind(&number)
            .bind(input.date)
            .bind(input.customer_id)
            .bind(input.profile_id)
            .bind(input.total_amount)
            .bind(input.include_tax)
            .bind(input.tax_rate)
            .bind(input.is_gross_amount)
            .fetch_one(&mut *tx)
            .await;

            let invoice = match inserted {
                Ok(invoice) => invoice,
                Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    warn!(
                        number = %number,
                        attempt = attempt,
                        "Invoice number taken concurrently, retrying"
                    );
                    tx.rollback().await.map_err(|e| {
                        AppError::DatabaseError(anyhow::anyhow!(
                            "Failed to roll back transaction: {}",
                            e
                        ))
                    })?;
                    continue;
                }
                Err(e) => {
                    return Err(AppError::DatabaseError(anyhow::anyhow!(
                        "Failed to create invoice: {}",
                        e
                    )));
                }
            };

            let mut items = Vec::with_capacity(input.items.len());
            for item in &input.items {
                let row = sqlx::query_as::<_, InvoiceItem>(
                    r#"
                    INSERT INTO invoice_items (invoice_id, quantity, description, price)
                    VALUES ($1, $2, $3, $4)
                    RETURNING id, invoice_id, quantity, description, price
                    "#,
                )
                .bind(invoice.id)
                .bind(item.quantity)
                .bind(&item.description)
                .bind(item.price)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(anyhow::anyhow!(
                        "Failed to create invoice item: {}",
                        e
                    ))
                })?;
                items.push(row);
            }

            tx.commit().await.map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
            })?;

            timer.observe_duration();
            info!(invoice_id = invoice.id, number = %invoice.number, "Invoice created");
            return Ok((invoice, items));
        }

        Err(AppError::Conflict(anyhow::anyhow!(
            "Could not allocate a unique invoice number after {} attempts",
            NUMBER_ALLOCATION_ATTEMPTS
        )))
    }

    /// Compute the number the next created invoice would receive.
    #[instrument(skip(self))]
    pub async fn preview_invoice_number(&self) -> Result<String, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["preview_invoice_number"])
            .start_timer();

        let year_suffix = Local::now().format("%y").to_string();
        let existing: Vec<String> =
            sqlx::query_scalar("SELECT number FROM invoices WHERE number LIKE $1")
                .bind(format!("{year_suffix} |%"))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(anyhow::anyhow!(
                        "Failed to scan invoice numbers: {}",
                        e
                    ))
                })?;

        timer.observe_duration();
        Ok(numbering::next_number(&year_suffix, &existing))
    }

    /// Get an invoice by id.
    #[instrument(skip(self))]
    pub async fn get_invoice(&self, id: i64) -> Result<Option<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_invoice"])
            .start_timer();

        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT id, number, date, customer_id, profile_id, total_amount, include_tax, tax_rate, is_gross_amount
            FROM invoices WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get invoice: {}", e)))?;

        timer.observe_duration();
        Ok(invoice)
    }

    /// Fetch a set of invoices by id.
    #[instrument(skip(self, ids))]
    pub async fn get_invoices_by_ids(&self, ids: &[i64]) -> Result<Vec<Invoice>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_invoices_by_ids"])
            .start_timer();

        let invoices = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT id, number, date, customer_id, profile_id, total_amount, include_tax, tax_rate, is_gross_amount
            FROM invoices WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to fetch invoices: {}", e)))?;

        timer.observe_duration();
        Ok(invoices)
    }

    /// Fetch the items of a set of invoices, grouped by invoice id.
    #[instrument(skip(self, invoice_ids))]
    pub async fn get_items_for_invoices(
        &self,
        invoice_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<InvoiceItem>>, AppError> {
        if invoice_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_items_for_invoices"])
            .start_timer();

        let rows = sqlx::query_as::<_, InvoiceItem>(
            r#"
            SELECT id, invoice_id, quantity, description, price
            FROM invoice_items WHERE invoice_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(invoice_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to fetch invoice items: {}", e))
        })?;

        timer.observe_duration();
        let mut grouped: HashMap<i64, Vec<InvoiceItem>> = HashMap::new();
        for row in rows {
            grouped.entry(row.invoice_id).or_default().push(row);
        }
        Ok(grouped)
    }

    /// Delete an invoice and its items. Returns true when a row was removed.
    #[instrument(skip(self))]
    pub async fn delete_invoice(&self, id: i64) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_invoice"])
            .start_timer();

        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete invoice: {}", e))
            })?;

        timer.observe_duration();
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Summary Invoice Operations
    // =========================================================================

    /// Persist a summary invoice and its links to the covered invoices.
    #[instrument(skip(self, input), fields(profile_id = input.profile_id))]
    pub async fn create_summary_invoice(
        &self,
        input: &NewSummaryInvoice,
    ) -> Result<SummaryInvoice, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_summary_invoice"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let summary = sqlx::query_as::<_, SummaryInvoice>(
            r#"
            INSERT INTO summary_invoices (range_text, date, profile_id, total_net, total_tax, total_gross, recipient_customer_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, range_text, date, profile_id, total_net, total_tax, total_gross, recipient_customer_id
            "#,
        )
        .bind(&input.range_text)
        .bind(input.date)
        .bind(input.profile_id)
        .bind(input.total_net)
        .bind(input.total_tax)
        .bind(input.total_gross)
        .bind(input.recipient_customer_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to create summary invoice: {}", e))
        })?;

        for invoice_id in &input.invoice_ids {
            sqlx::query(
                "INSERT INTO summary_invoice_links (summary_invoice_id, invoice_id) VALUES ($1, $2)",
            )
            .bind(summary.id)
            .bind(invoice_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!(
                    "Failed to link invoice to summary: {}",
                    e
                ))
            })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        timer.observe_duration();
        info!(summary_invoice_id = summary.id, "Summary invoice created");
        Ok(summary)
    }

    /// Get a summary invoice by id.
    #[instrument(skip(self))]
    pub async fn get_summary_invoice(&self, id: i64) -> Result<Option<SummaryInvoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_summary_invoice"])
            .start_timer();

        let summary = sqlx::query_as::<_, SummaryInvoice>(
            r#"
            SELECT id, range_text, date, profile_id, total_net, total_tax, total_gross, recipient_customer_id
            FROM summary_invoices WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get summary invoice: {}", e))
        })?;

        timer.observe_duration();
        Ok(summary)
    }

    /// Linked invoice ids for a set of summary invoices.
    #[instrument(skip(self, summary_ids))]
    pub async fn get_summary_invoice_ids(
        &self,
        summary_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<i64>>, AppError> {
        if summary_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_summary_invoice_ids"])
            .start_timer();

        let rows = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT summary_invoice_id, invoice_id
            FROM summary_invoice_links WHERE summary_invoice_id = ANY($1)
            ORDER BY invoice_id
            "#,
        )
        .bind(summary_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to fetch summary links: {}", e))
        })?;

        timer.observe_duration();
        let mut grouped: HashMap<i64, Vec<i64>> = HashMap::new();
        for (summary_id, invoice_id) in rows {
            grouped.entry(summary_id).or_default().push(invoice_id);
        }
        Ok(grouped)
    }

    /// All summary invoices of one profile, newest first.
    #[instrument(skip(self))]
    pub async fn list_summaries_by_profile(
        &self,
        profile_id: i64,
    ) -> Result<Vec<SummaryInvoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_summaries_by_profile"])
            .start_timer();

        let summaries = sqlx::query_as::<_, SummaryInvoice>(
            r#"
            SELECT id, range_text, date, profile_id, total_net, total_tax, total_gross, recipient_customer_id
            FROM summary_invoices WHERE profile_id = $1
            ORDER BY date DESC, id DESC
            "#,
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list summary invoices: {}", e))
        })?;

        timer.observe_duration();
        Ok(summaries)
    }

    /// Delete a summary invoice and its links. The covered invoices stay.
    #[instrument(skip(self))]
    pub async fn delete_summary_invoice(&self, id: i64) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_summary_invoice"])
            .start_timer();

        let result = sqlx::query("DELETE FROM summary_invoices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!(
                    "Failed to delete summary invoice: {}",
                    e
                ))
            })?;

        timer.observe_duration();
        Ok(result.rows_affected() > 0)
    }
}
