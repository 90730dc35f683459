//! PostgreSQL implementation of ReviewRepository.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{DomainError, LawyerId, Timestamp};
use crate::domain::lawyer::{LawyerReview, ReviewId};
use crate::ports::{ReviewRepository, ReviewStats};

/// PostgreSQL implementation of ReviewRepository.
#[derive(Clone)]
pub struct PostgresReviewRepository {
    pool: PgPool,
}

impl PostgresReviewRepository {
    /// Creates a new PostgresReviewRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewRepository for PostgresReviewRepository {
    async fn create(&self, review: &LawyerReview) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO lawyer_reviews (
                id, lawyer_id, client_name, rating, comment, is_approved, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(review.id().as_uuid())
        .bind(review.lawyer_id().as_uuid())
        .bind(review.client_name())
        .bind(review.rating() as i16)
        .bind(review.comment())
        .bind(review.is_approved())
        .bind(review.created_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to insert review: {}", e)))?;

        Ok(())
    }

    async fn approved_stats(
        &self,
        lawyer_id: LawyerId,
    ) -> Result<Option<ReviewStats>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT AVG(rating)::DOUBLE PRECISION AS average_rating,
                   COUNT(*)::INTEGER AS approved_count
            FROM lawyer_reviews
            WHERE lawyer_id = $1 AND is_approved
            "#,
        )
        .bind(lawyer_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to aggregate reviews: {}", e)))?;

        let average_rating: Option<f64> = row.get("average_rating");
        let approved_count: i32 = row.get("approved_count");

        Ok(average_rating.map(|average_rating| ReviewStats {
            average_rating,
            approved_count,
        }))
    }

    async fn list_for_lawyer(
        &self,
        lawyer_id: LawyerId,
    ) -> Result<Vec<LawyerReview>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, lawyer_id, client_name, rating, comment, is_approved, created_at
            FROM lawyer_reviews
            WHERE lawyer_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(lawyer_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to list reviews: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let id: uuid::Uuid = row.get("id");
                let lawyer_id: uuid::Uuid = row.get("lawyer_id");
                let rating: i16 = row.get("rating");
                let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");

                LawyerReview::reconstitute(
                    ReviewId::from_uuid(id),
                    LawyerId::from_uuid(lawyer_id),
                    row.get("client_name"),
                    rating as u8,
                    row.get("comment"),
                    row.get("is_approved"),
                    Timestamp::from_datetime(created_at),
                )
            })
            .collect())
    }
}
