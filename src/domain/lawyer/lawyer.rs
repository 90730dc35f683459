//! Lawyer record backing a persona.
//!
//! Records are created lazily: the first chat with a persona creates the
//! row, keyed by display name. Rating statistics are recalculated by the
//! review flow, not by the chat flow.

use crate::domain::foundation::{AssistantRef, LawyerId, Timestamp};

use super::persona::Persona;
use super::specialization::Specialization;

/// Default rating for a lawyer with no approved reviews yet.
pub const DEFAULT_RATING: f64 = 5.0;

/// Persistent lawyer record.
#[derive(Debug, Clone, PartialEq)]
pub struct Lawyer {
    id: LawyerId,
    name: String,
    specialization: Specialization,
    assistant_id: AssistantRef,
    personality: String,
    response_time: String,
    rating: f64,
    cases_completed: i32,
    is_available: bool,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Lawyer {
    /// Creates a lawyer record pre-populated from persona defaults.
    pub fn from_persona(persona: &Persona) -> Self {
        let now = Timestamp::now();
        Self {
            id: LawyerId::new(),
            name: persona.name.clone(),
            specialization: persona.code,
            assistant_id: persona.assistant_id.clone(),
            personality: persona.personality.clone(),
            response_time: persona.response_time.clone(),
            rating: DEFAULT_RATING,
            cases_completed: 0,
            is_available: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstitute a lawyer from persistence.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: LawyerId,
        name: String,
        specialization: Specialization,
        assistant_id: AssistantRef,
        personality: String,
        response_time: String,
        rating: f64,
        cases_completed: i32,
        is_available: bool,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            name,
            specialization,
            assistant_id,
            personality,
            response_time,
            rating,
            cases_completed,
            is_available,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> LawyerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn specialization(&self) -> Specialization {
        self.specialization
    }

    pub fn assistant_id(&self) -> &AssistantRef {
        &self.assistant_id
    }

    pub fn personality(&self) -> &str {
        &self.personality
    }

    pub fn response_time(&self) -> &str {
        &self.response_time
    }

    pub fn rating(&self) -> f64 {
        self.rating
    }

    pub fn cases_completed(&self) -> i32 {
        self.cases_completed
    }

    pub fn is_available(&self) -> bool {
        self.is_available
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Applies recalculated review aggregates.
    ///
    /// Called by the review flow after an approved review is recorded.
    pub fn apply_review_stats(&mut self, average_rating: f64, approved_count: i32) {
        self.rating = (average_rating * 10.0).round() / 10.0;
        self.cases_completed = approved_count;
        self.updated_at = Timestamp::now();
    }
}
