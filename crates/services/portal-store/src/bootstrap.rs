//! Creation of the protected built-in accounts.

use std::sync::Arc;

use tracing::info;

use portal_domain::{
    Account, AccountPolicy, AccountStore, DomainError, DomainResult, PermissionInfo,
};

/// Make sure every protected account exists.
///
/// Missing accounts are provisioned with full permissions and
/// `initial_password`. Existing accounts are left untouched, so running
/// this twice is a no-op. Returns the names that were created.
pub async fn ensure_protected_accounts(
    store: Arc<dyn AccountStore>,
    policy: Arc<AccountPolicy>,
    initial_password: &str,
) -> DomainResult<Vec<String>> {
    let mut created = Vec::new();

    for name in &policy.protected_account_names {
        match store.load_by_name(name).await {
            Ok(_) => continue,
            Err(DomainError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        Account::provision(
            name,
            initial_password,
            PermissionInfo::full(),
            store.clone(),
            policy.clone(),
        )
        .await?;
        info!(account = %name, "Protected account created");
        created.push(name.clone());
    }

    Ok(created)
}
