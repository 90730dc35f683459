//! Lawyer personas, records and reviews.

mod lawyer;
mod persona;
mod review;
mod specialization;

pub use lawyer::{Lawyer, DEFAULT_RATING};
pub use persona::{Persona, PersonaDirectory};
pub use review::{approved_stats, LawyerReview, ReviewId};
pub use specialization::Specialization;
