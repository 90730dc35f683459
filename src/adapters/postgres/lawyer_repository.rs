//! PostgreSQL implementation of LawyerRepository.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{AssistantRef, DomainError, ErrorCode, LawyerId, Timestamp};
use crate::domain::lawyer::{Lawyer, Specialization};
use crate::ports::LawyerRepository;

/// PostgreSQL implementation of LawyerRepository.
#[derive(Clone)]
pub struct PostgresLawyerRepository {
    pool: PgPool,
}

impl PostgresLawyerRepository {
    /// Creates a new PostgresLawyerRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const LAWYER_COLUMNS: &str = "id, name, specialization, assistant_id, personality, \
                              response_time, rating, cases_completed, is_available, \
                              created_at, updated_at";

#[async_trait]
impl LawyerRepository for PostgresLawyerRepository {
    async fn create(&self, lawyer: &Lawyer) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO lawyers (
                id, name, specialization, assistant_id, personality,
                response_time, rating, cases_completed, is_available,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(lawyer.id().as_uuid())
        .bind(lawyer.name())
        .bind(lawyer.specialization().as_code())
        .bind(lawyer.assistant_id().as_str())
        .bind(lawyer.personality())
        .bind(lawyer.response_time())
        .bind(lawyer.rating())
        .bind(lawyer.cases_completed())
        .bind(lawyer.is_available())
        .bind(lawyer.created_at().as_datetime())
        .bind(lawyer.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to insert lawyer: {}", e)))?;

        Ok(())
    }

    async fn update(&self, lawyer: &Lawyer) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE lawyers SET
                rating = $2,
                cases_completed = $3,
                is_available = $4,
                updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(lawyer.id().as_uuid())
        .bind(lawyer.rating())
        .bind(lawyer.cases_completed())
        .bind(lawyer.is_available())
        .bind(lawyer.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update lawyer: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::LawyerNotFound,
                format!("lawyer {} not found", lawyer.id()),
            ));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: LawyerId) -> Result<Option<Lawyer>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM lawyers WHERE id = $1",
            LAWYER_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch lawyer: {}", e)))?;

        row.map(row_to_lawyer).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Lawyer>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM lawyers WHERE name = $1",
            LAWYER_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch lawyer by name: {}", e)))?;

        row.map(row_to_lawyer).transpose()
    }

    async fn list(&self) -> Result<Vec<Lawyer>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM lawyers ORDER BY rating DESC, name ASC",
            LAWYER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to list lawyers: {}", e)))?;

        rows.into_iter().map(row_to_lawyer).collect()
    }
}

// === Helper Functions ===

fn row_to_lawyer(row: sqlx::postgres::PgRow) -> Result<Lawyer, DomainError> {
    let id: uuid::Uuid = row.get("id");
    let specialization_str: &str = row.get("specialization");
    let assistant_id: String = row.get("assistant_id");
    let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");
    let updated_at: chrono::DateTime<chrono::Utc> = row.get("updated_at");

    let specialization = Specialization::parse(specialization_str).ok_or_else(|| {
        DomainError::new(
            ErrorCode::InternalError,
            format!("Invalid specialization: {}", specialization_str),
        )
    })?;

    Ok(Lawyer::reconstitute(
        LawyerId::from_uuid(id),
        row.get("name"),
        specialization,
        AssistantRef::new(assistant_id),
        row.get("personality"),
        row.get("response_time"),
        row.get("rating"),
        row.get("cases_completed"),
        row.get("is_available"),
        Timestamp::from_datetime(created_at),
        Timestamp::from_datetime(updated_at),
    ))
}
