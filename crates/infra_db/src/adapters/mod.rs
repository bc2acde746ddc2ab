//! Domain Adapters
//!
//! PostgreSQL implementations of the domain ports. Each adapter wraps a
//! repository, converts rows into domain types and translates
//! [`DatabaseError`](crate::DatabaseError) into `PortError`.
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresInvoiceAdapter;
//!
//! let invoices: Arc<dyn InvoicePort> = Arc::new(PostgresInvoiceAdapter::new(pool));
//! ```

pub mod billing;
pub mod commission;
pub mod party;

pub use billing::PostgresInvoiceAdapter;
pub use commission::PostgresCommissionAdapter;
pub use party::PostgresPartyAdapter;

use sqlx::PgPool;

use core_kernel::HealthCheckResult;

/// Runs `SELECT 1` against the pool and reports the outcome for `adapter_id`
pub(crate) async fn ping(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = std::time::Instant::now();

    let result = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await;

    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => HealthCheckResult::healthy(adapter_id, latency_ms),
        Err(e) => HealthCheckResult::unhealthy(adapter_id, latency_ms, format!("Database error: {e}")),
    }
}
