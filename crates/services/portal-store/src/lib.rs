//! Portal Store Library
//!
//! Persistence for the site portal: SeaORM and in-memory implementations of
//! the account and federation ports, schema migrations, and bootstrap of
//! the protected built-in accounts.

pub mod bootstrap;
pub mod config;
pub mod infra;
pub mod repository;

use std::sync::Arc;

use tracing::info;

use crate::config::StoreConfig;
use crate::infra::Database;

pub use bootstrap::ensure_protected_accounts;
pub use repository::{
    DbAccountStore, DbFederationStore, InMemoryAccountStore, InMemoryFederationRepository,
};

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = StoreConfig::from_env();
    let db = Database::connect_without_migrations(&config.database_url).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Create missing protected accounts in the configured database.
pub async fn run_bootstrap() -> Result<(), Box<dyn std::error::Error>> {
    let config = StoreConfig::from_env();
    let password = config
        .bootstrap_password
        .clone()
        .ok_or("PORTAL_BOOTSTRAP_PASSWORD must be set")?;

    let db = Database::connect(&config.database_url).await?;
    let store = Arc::new(DbAccountStore::new(db.get_connection()));
    let policy = Arc::new(config.account_policy());
    let created = ensure_protected_accounts(store, policy, &password).await?;

    if created.is_empty() {
        info!("All protected accounts already exist");
    } else {
        info!(accounts = ?created, "Bootstrap complete");
    }
    Ok(())
}
