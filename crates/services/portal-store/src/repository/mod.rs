//! Repository layer for data access.
//!
//! SeaORM stores for production and in-memory stores for tests and
//! embedding. Both implement the domain ports.

mod account_repository;
pub mod entities;
mod federation_repository;
mod memory;

use sea_orm::{DbErr, SqlErr};

use portal_domain::DomainError;

pub use account_repository::DbAccountStore;
pub use federation_repository::DbFederationStore;
pub use memory::{InMemoryAccountStore, InMemoryFederationRepository};

/// A unique-constraint hit on insert means a concurrent create won the race.
fn insert_error(err: DbErr, identifier: String) -> DomainError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => DomainError::duplicate(identifier),
        _ => DomainError::persistence(err),
    }
}
