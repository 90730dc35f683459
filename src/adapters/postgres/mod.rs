//! PostgreSQL repository adapters.

mod chat_repository;
mod lawyer_repository;
mod request_repository;
mod review_repository;

pub use chat_repository::PostgresChatRepository;
pub use lawyer_repository::PostgresLawyerRepository;
pub use request_repository::PostgresRequestRepository;
pub use review_repository::PostgresReviewRepository;
