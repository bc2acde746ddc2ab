//! Database Test Utilities
//!
//! Starts PostgreSQL in a test container, applies the workspace schema, and
//! seeds the tables the commission service only reads (agents, customers,
//! invoices, payments).

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};

use domain_billing::{Invoice, Payment};
use domain_party::{Agent, Customer};

/// Default PostgreSQL image for testing
const POSTGRES_IMAGE: &str = "postgres";
const POSTGRES_TAG: &str = "16-alpine";
const POSTGRES_USER: &str = "test_user";
const POSTGRES_PASSWORD: &str = "test_password";
const POSTGRES_DB: &str = "commission_test";

type TestResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Configuration for test database
#[derive(Debug, Clone)]
pub struct TestDatabaseConfig {
    pub user: String,
    pub password: String,
    pub database: String,
    pub host: String,
    pub port: u16,
}

impl Default for TestDatabaseConfig {
    fn default() -> Self {
        Self {
            user: POSTGRES_USER.to_string(),
            password: POSTGRES_PASSWORD.to_string(),
            database: POSTGRES_DB.to_string(),
            host: "localhost".to_string(),
            port: 5432,
        }
    }
}

impl TestDatabaseConfig {
    /// Creates the database connection URL
    pub fn connection_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

/// A wrapper around a PostgreSQL test container
pub struct TestDatabase {
    _container: ContainerAsync<GenericImage>,
    pub config: TestDatabaseConfig,
    pub pool: PgPool,
}

impl TestDatabase {
    /// Starts a new PostgreSQL container with the schema applied
    pub async fn new() -> TestResult<Self> {
        let container = GenericImage::new(POSTGRES_IMAGE, POSTGRES_TAG)
            .with_exposed_port(5432.tcp())
            .with_wait_for(WaitFor::message_on_stderr(
                "database system is ready to accept connections",
            ))
            .with_env_var("POSTGRES_USER", POSTGRES_USER)
            .with_env_var("POSTGRES_PASSWORD", POSTGRES_PASSWORD)
            .with_env_var("POSTGRES_DB", POSTGRES_DB)
            .start()
            .await?;

        let port = container.get_host_port_ipv4(5432).await?;
        let host = container.get_host().await?.to_string();

        let config = TestDatabaseConfig {
            host,
            port,
            ..TestDatabaseConfig::default()
        };

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.connection_url())
            .await?;

        let test_db = Self {
            _container: container,
            config,
            pool,
        };
        test_db.init_schema().await?;

        Ok(test_db)
    }

    async fn init_schema(&self) -> TestResult<()> {
        let schema = include_str!("../../../migrations/20240101_000001_initial_schema.sql");
        sqlx::raw_sql(schema).execute(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

}

/// Inserts an agent as the sales system would
pub async fn seed_agent(pool: &PgPool, agent: &Agent) -> TestResult<()> {
    sqlx::query(
        r#"
        INSERT INTO agents (id, name, phone, email, classification, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5::agent_classification, $6, $7)
        "#,
    )
    .bind(agent.id.as_str())
    .bind(&agent.name)
    .bind(&agent.contact.phone)
    .bind(&agent.contact.email)
    .bind(agent.classification.as_str())
    .bind(agent.created_at)
    .bind(agent.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn seed_customer(pool: &PgPool, customer: &Customer) -> TestResult<()> {
    sqlx::query(
        "INSERT INTO customers (id, name, phone, email, created_at) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(customer.id.as_str())
    .bind(&customer.name)
    .bind(&customer.phone)
    .bind(&customer.email)
    .bind(customer.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn seed_invoice(pool: &PgPool, invoice: &Invoice) -> TestResult<()> {
    sqlx::query(
        r#"
        INSERT INTO invoices (
            id, agent_id, customer_id, amount, eligible_amount, first_payment_date,
            full_payment_date, achieved_monthly_anp, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(invoice.id.as_str())
    .bind(invoice.agent_id.as_ref().map(|id| id.as_str()))
    .bind(invoice.customer_id.as_ref().map(|id| id.as_str()))
    .bind(invoice.amount)
    .bind(invoice.eligible_amount)
    .bind(invoice.first_payment_date)
    .bind(invoice.full_payment_date)
    .bind(invoice.achieved_monthly_anp)
    .bind(invoice.created_at)
    .bind(invoice.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn seed_payment(pool: &PgPool, payment: &Payment) -> TestResult<()> {
    sqlx::query(
        r#"
        INSERT INTO payments (id, invoice_id, amount, method, verified_by, payment_date, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(payment.id.as_str())
    .bind(payment.invoice_id.as_str())
    .bind(payment.amount)
    .bind(payment.method.as_str())
    .bind(&payment.verified_by)
    .bind(payment.payment_date)
    .bind(payment.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Creates an isolated test database for a single test
pub async fn create_isolated_test_database() -> TestResult<TestDatabase> {
    TestDatabase::new().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_connection_url() {
        let config = TestDatabaseConfig::default();
        let url = config.connection_url();

        assert!(url.starts_with("postgres://"));
        assert!(url.contains(POSTGRES_USER));
        assert!(url.contains(POSTGRES_DB));
    }
}
