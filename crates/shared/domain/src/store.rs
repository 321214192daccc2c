//! Persistence port for the Account aggregate.

use async_trait::async_trait;

use crate::account::{AccountData, AccountId, NewAccount};
use crate::error::DomainResult;
use crate::password::Password;
use crate::permission::PermissionInfo;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Account storage used by the aggregate.
///
/// Lookups and writes are keyed by the immutable id. Soft-deleted accounts
/// are invisible to every method. Each update must be atomic for its row.
/// Storage faults surface as [`DomainError::Persistence`](crate::DomainError::Persistence),
/// including updates that target an id with no live row.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fails with `NotFound` when no live account has this id
    async fn load_by_id(&self, id: AccountId) -> DomainResult<AccountData>;

    /// Fails with `NotFound` when no live account has this name
    async fn load_by_name(&self, name: &str) -> DomainResult<AccountData>;

    /// All live accounts
    async fn list(&self) -> DomainResult<Vec<AccountData>>;

    /// Insert a new account; `DuplicateIdentifier` if the name or uuid is taken
    async fn create(&self, account: NewAccount) -> DomainResult<AccountData>;

    /// Replace the stored permission set
    async fn update_permissions_by_id(&self, id: AccountId, info: &PermissionInfo)
        -> DomainResult<()>;

    /// Replace the stored credential hash
    async fn update_password_by_id(&self, id: AccountId, credential: &Password)
        -> DomainResult<()>;
}
