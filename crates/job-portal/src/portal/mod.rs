//! Job postings and the application lifecycle built on top of them.

pub mod actor;
pub mod applications;
pub mod import;
pub mod jobs;
pub mod memory;
pub mod repository;

pub use actor::{Actor, ActorId, ActorRejection, ActorRole};
pub use repository::RepositoryError;
