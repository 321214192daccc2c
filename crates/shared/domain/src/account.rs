//! Account aggregate and its persisted data.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{DomainResult, PolicyViolation, ValidationError};
use crate::password::{Password, PasswordPolicy};
use crate::permission::{Capability, PermissionInfo};
use crate::policy::AccountPolicy;
use crate::store::AccountStore;

/// Store-assigned account key. Never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(pub i32);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account state as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountData {
    pub id: AccountId,
    /// External reference, unique
    pub uuid: String,
    /// Login name, unique
    pub name: String,
    #[serde(skip_serializing)]
    pub credential: Password,
    pub permissions: PermissionInfo,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft delete timestamp (None = active, Some = deleted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl AccountData {
    /// Check if account is soft deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Check if account is active (not deleted)
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Input for [`AccountStore::create`]; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub uuid: String,
    pub name: String,
    pub credential: Password,
    pub permissions: PermissionInfo,
}

/// A site user. Every mutation checks its invariants first and touches
/// in-memory state only after the store accepted the change.
pub struct Account {
    data: AccountData,
    store: Arc<dyn AccountStore>,
    policy: Arc<AccountPolicy>,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("data", &self.data)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Account {
    /// Wrap already loaded data.
    pub fn new(
        data: AccountData,
        store: Arc<dyn AccountStore>,
        policy: Arc<AccountPolicy>,
    ) -> Self {
        Self {
            data,
            store,
            policy,
        }
    }

    /// Load by id; `NotFound` if absent.
    pub async fn load(
        id: AccountId,
        store: Arc<dyn AccountStore>,
        policy: Arc<AccountPolicy>,
    ) -> DomainResult<Self> {
        let data = store.load_by_id(id).await?;
        Ok(Self::new(data, store, policy))
    }

    /// Load by login name; `NotFound` if absent.
    pub async fn load_by_name(
        name: &str,
        store: Arc<dyn AccountStore>,
        policy: Arc<AccountPolicy>,
    ) -> DomainResult<Self> {
        let data = store.load_by_name(name).await?;
        Ok(Self::new(data, store, policy))
    }

    /// Create and persist a new account with a fresh external uuid.
    pub async fn provision(
        name: &str,
        plain_password: &str,
        permissions: PermissionInfo,
        store: Arc<dyn AccountStore>,
        policy: Arc<AccountPolicy>,
    ) -> DomainResult<Self> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyAccountName.into());
        }
        PasswordPolicy::validate(plain_password)?;
        ensure_portal_kept(&policy, name, &permissions)?;

        let credential = hash_or_abort(plain_password, &policy, name)?;
        let data = store
            .create(NewAccount {
                uuid: Uuid::new_v4().to_string(),
                name: name.to_string(),
                credential,
                permissions,
            })
            .await?;

        info!(account_id = %data.id, account = %data.name, "Account provisioned");
        Ok(Self::new(data, store, policy))
    }

    pub fn id(&self) -> AccountId {
        self.data.id
    }

    pub fn uuid(&self) -> &str {
        &self.data.uuid
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn permissions(&self) -> &PermissionInfo {
        &self.data.permissions
    }

    pub fn data(&self) -> &AccountData {
        &self.data
    }

    pub fn into_data(self) -> AccountData {
        self.data
    }

    /// Check a login attempt against the stored hash.
    pub fn verify_password(&self, plain_text: &str) -> bool {
        self.data.credential.verify(plain_text)
    }

    /// `AccessDenied` unless the capability is granted. Pure read.
    pub fn check_access(&self, capability: Capability) -> DomainResult<()> {
        if self.data.permissions.is_granted(capability) {
            return Ok(());
        }
        Err(PolicyViolation::AccessDenied {
            account: self.data.name.clone(),
            capability: capability.to_string(),
        }
        .into())
    }

    /// Replace the whole permission set.
    ///
    /// # Errors
    /// - `AdminLockout` if this is a protected account and `info` revokes
    ///   site portal access. Nothing is written.
    /// - whatever the store returns; in-memory permissions stay unchanged.
    pub async fn update_permissions(&mut self, info: PermissionInfo) -> DomainResult<()> {
        ensure_portal_kept(&self.policy, &self.data.name, &info)?;

        self.store
            .update_permissions_by_id(self.data.id, &info)
            .await?;

        self.data.permissions = info;
        self.data.updated_at = Utc::now();
        info!(account_id = %self.data.id, "Account permissions updated");
        Ok(())
    }

    /// Change the password after checking the current one.
    ///
    /// Order: current password, unchanged, strength rules, hash, persist.
    /// Validation failures never reach the store.
    pub async fn change_password(&mut self, current: &str, new: &str) -> DomainResult<()> {
        if !self.data.credential.verify(current) {
            warn!(
                account_id = %self.data.id,
                "Password change rejected: current password mismatch"
            );
            return Err(ValidationError::InvalidCredential.into());
        }
        if new == current {
            return Err(ValidationError::PasswordUnchanged.into());
        }
        PasswordPolicy::validate(new)?;

        let credential = hash_or_abort(new, &self.policy, &self.data.name)?;
        self.store
            .update_password_by_id(self.data.id, &credential)
            .await?;

        self.data.credential = credential;
        self.data.updated_at = Utc::now();
        info!(account_id = %self.data.id, "Account password changed");
        Ok(())
    }
}

fn ensure_portal_kept(
    policy: &AccountPolicy,
    name: &str,
    info: &PermissionInfo,
) -> DomainResult<()> {
    if policy.is_protected(name) && !info.is_granted(Capability::SitePortal) {
        warn!(account = %name, "Rejected site portal revocation on protected account");
        return Err(PolicyViolation::AdminLockout {
            account: name.to_string(),
        }
        .into());
    }
    Ok(())
}

fn hash_or_abort(
    plain_text: &str,
    policy: &AccountPolicy,
    account: &str,
) -> DomainResult<Password> {
    Password::hash_with(plain_text, policy.hash_cost).map_err(|e| {
        error!(account = %account, error = %e, "Credential hashing failed");
        e
    })
}
