//! Agent and customer repositories

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::DatabaseError;

/// Agent classification as stored in PostgreSQL
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "agent_classification", rename_all = "snake_case")]
pub enum AgentClassification {
    Internal,
    Outsource,
    Blocked,
    Unset,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AgentRow {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub classification: AgentClassification,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CustomerRow {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields of an agent contact edit; `None` leaves the column unchanged
#[derive(Debug, Clone, Default)]
pub struct AgentContactChange<'a> {
    pub name: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub email: Option<&'a str>,
}

const AGENT_COLUMNS: &str = "id, name, phone, email, classification, created_at, updated_at";

/// Repository for agent records
#[derive(Debug, Clone)]
pub struct AgentRepository {
    pool: PgPool,
}

impl AgentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> Result<AgentRow, DatabaseError> {
        sqlx::query_as::<_, AgentRow>(&format!("SELECT {AGENT_COLUMNS} FROM agents WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Agent", id))
    }

    /// Lists agents ordered by name, then id
    pub async fn list(
        &self,
        classification: Option<AgentClassification>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<AgentRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, AgentRow>(&format!(
            r#"
            SELECT {AGENT_COLUMNS}
            FROM agents
            WHERE ($1::agent_classification IS NULL OR classification = $1)
            ORDER BY name, id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(classification)
        .bind(limit)
        .bind(offset.unwrap_or(0))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn update_classification(
        &self,
        id: &str,
        classification: AgentClassification,
    ) -> Result<AgentRow, DatabaseError> {
        sqlx::query_as::<_, AgentRow>(&format!(
            r#"
            UPDATE agents SET classification = $2, updated_at = now()
            WHERE id = $1
            RETURNING {AGENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(classification)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Agent", id))
    }

    pub async fn update_contact(
        &self,
        id: &str,
        change: AgentContactChange<'_>,
    ) -> Result<AgentRow, DatabaseError> {
        sqlx::query_as::<_, AgentRow>(&format!(
            r#"
            UPDATE agents SET
                name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                email = COALESCE($4, email),
                updated_at = now()
            WHERE id = $1
            RETURNING {AGENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(change.name)
        .bind(change.phone)
        .bind(change.email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Agent", id))
    }
}

/// Repository for customer records
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> Result<CustomerRow, DatabaseError> {
        sqlx::query_as::<_, CustomerRow>(
            "SELECT id, name, phone, email, created_at FROM customers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Customer", id))
    }

    /// Case-insensitive substring search over name, phone and email
    pub async fn search(&self, text: &str, limit: i64) -> Result<Vec<CustomerRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, CustomerRow>(
            r#"
            SELECT id, name, phone, email, created_at
            FROM customers
            WHERE lower(name) LIKE $1 ESCAPE '\'
               OR lower(COALESCE(phone, '')) LIKE $1 ESCAPE '\'
               OR lower(COALESCE(email, '')) LIKE $1 ESCAPE '\'
            ORDER BY name, id
            LIMIT $2
            "#,
        )
        .bind(like_pattern(text))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

/// Builds a `%text%` LIKE pattern with wildcards in `text` escaped
pub(crate) fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
