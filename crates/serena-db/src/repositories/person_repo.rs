//! Person repository implementation
//!
//! One table backs customers, providers, and administrators; the role
//! column disambiguates. Login resolves through find_by_email.

use serena_core::{
    models::{Person, PersonRole},
    traits::{PersonRepository, Repository},
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of PersonRepository
pub struct PgPersonRepository {
    pool: PgPool,
}

impl PgPersonRepository {
    /// Create a new person repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const PERSON_COLUMNS: &str = r#"
    person_id, first_name, last_name, email, phone, password_hash,
    role, title, bio, is_active, created_at, updated_at
"#;

#[async_trait]
impl Repository<Person, i64> for PgPersonRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Person>> {
        debug!("Finding person by id: {}", id);

        let query = format!("SELECT {} FROM persons WHERE person_id = $1", PERSON_COLUMNS);

        let result = sqlx::query_as::<sqlx::Postgres, PersonRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding person {}: {}", id, e);
                AppError::Database(format!("Failed to find person: {}", e))
            })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Person>> {
        let query = format!(
            "SELECT {} FROM persons ORDER BY last_name ASC, first_name ASC LIMIT $1 OFFSET $2",
            PERSON_COLUMNS
        );

        let rows = sqlx::query_as::<sqlx::Postgres, PersonRow>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding persons: {}", e);
                AppError::Database(format!("Failed to fetch persons: {}", e))
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM persons")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting persons: {}", e);
                AppError::Database(format!("Failed to count persons: {}", e))
            })?;

        Ok(result.0)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> AppResult<bool> {
        debug!("Deleting person: {}", id);

        let result = sqlx::query("DELETE FROM persons WHERE person_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting person {}: {}", id, e);
                AppError::Database(format!("Failed to delete person: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PersonRepository for PgPersonRepository {
    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Person>> {
        debug!("Finding person by email");

        let query = format!(
            "SELECT {} FROM persons WHERE LOWER(email) = LOWER($1)",
            PERSON_COLUMNS
        );

        let result = sqlx::query_as::<sqlx::Postgres, PersonRow>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding person by email: {}", e);
                AppError::Database(format!("Failed to find person: {}", e))
            })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn list_providers(&self) -> AppResult<Vec<Person>> {
        let query = format!(
            "SELECT {} FROM persons WHERE role = 'provider' AND is_active = TRUE \
             ORDER BY last_name ASC, first_name ASC",
            PERSON_COLUMNS
        );

        let rows = sqlx::query_as::<sqlx::Postgres, PersonRow>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error listing providers: {}", e);
                AppError::Database(format!("Failed to fetch providers: {}", e))
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Helper struct for mapping person rows
#[derive(Debug, sqlx::FromRow)]
struct PersonRow {
    person_id: i64,
    first_name: String,
    last_name: String,
    email: String,
    phone: Option<String>,
    password_hash: String,
    role: String,
    title: Option<String>,
    bio: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<PersonRow> for Person {
    fn from(row: PersonRow) -> Self {
        Self {
            person_id: row.person_id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            password_hash: row.password_hash,
            role: PersonRole::from_str(&row.role).unwrap_or(PersonRole::Customer),
            title: row.title,
            bio: row.bio,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
