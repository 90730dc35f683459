//! Client reviews of lawyer personas.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, LawyerId, Timestamp, ValidationError};

/// Unique identifier for a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(Uuid);

impl ReviewId {
    /// Creates a new random ReviewId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a ReviewId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ReviewId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ReviewId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A client review of a lawyer, rated 1 to 5 stars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LawyerReview {
    id: ReviewId,
    lawyer_id: LawyerId,
    client_name: String,
    rating: u8,
    comment: String,
    is_approved: bool,
    created_at: Timestamp,
}

impl LawyerReview {
    /// Creates a new, approved review.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the client name or comment is blank
    /// - `OutOfRange` if the rating is not 1..=5
    pub fn new(
        lawyer_id: LawyerId,
        client_name: &str,
        rating: u8,
        comment: &str,
    ) -> Result<Self, DomainError> {
        let client_name = client_name.trim();
        if client_name.is_empty() {
            return Err(ValidationError::empty_field("client_name").into());
        }
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(ValidationError::empty_field("comment").into());
        }
        if !(1..=5).contains(&rating) {
            return Err(ValidationError::out_of_range("rating", 1, 5, rating as i32).into());
        }

        Ok(Self {
            id: ReviewId::new(),
            lawyer_id,
            client_name: client_name.to_string(),
            rating,
            comment: comment.to_string(),
            is_approved: true,
            created_at: Timestamp::now(),
        })
    }

    /// Reconstitute a review from persistence.
    pub fn reconstitute(
        id: ReviewId,
        lawyer_id: LawyerId,
        client_name: String,
        rating: u8,
        comment: String,
        is_approved: bool,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            lawyer_id,
            client_name,
            rating,
            comment,
            is_approved,
            created_at,
        }
    }

    pub fn id(&self) -> ReviewId {
        self.id
    }

    pub fn lawyer_id(&self) -> LawyerId {
        self.lawyer_id
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn rating(&self) -> u8 {
        self.rating
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn is_approved(&self) -> bool {
        self.is_approved
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

/// Average rating and count over the approved subset of `reviews`.
///
/// Returns `None` when no review is approved.
pub fn approved_stats(reviews: &[LawyerReview]) -> Option<(f64, i32)> {
    let approved: Vec<&LawyerReview> = reviews.iter().filter(|r| r.is_approved()).collect();
    if approved.is_empty() {
        return None;
    }
    let sum: u32 = approved.iter().map(|r| r.rating() as u32).sum();
    Some((sum as f64 / approved.len() as f64, approved.len() as i32))
}
