//! In-memory stores.
//!
//! Same contracts as the database stores, including soft delete, held in a
//! `RwLock`ed map. Every write happens under one write guard, so each
//! update is atomic for its record.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use portal_domain::{
    AccountData, AccountId, AccountStore, DomainError, DomainResult, FederationDescriptor,
    FederationRepository, NewAccount, Password, PermissionInfo,
};

fn read<T>(lock: &RwLock<T>) -> DomainResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| DomainError::persistence("in-memory store lock poisoned"))
}

fn write<T>(lock: &RwLock<T>) -> DomainResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| DomainError::persistence("in-memory store lock poisoned"))
}

#[derive(Default)]
struct AccountTable {
    next_id: i32,
    rows: BTreeMap<AccountId, AccountData>,
}

impl AccountTable {
    fn live(&self, id: AccountId) -> Option<&AccountData> {
        self.rows.get(&id).filter(|a| a.is_active())
    }

    fn live_mut(&mut self, id: AccountId) -> DomainResult<&mut AccountData> {
        self.rows
            .get_mut(&id)
            .filter(|a| a.is_active())
            .ok_or_else(|| DomainError::persistence(format!("account {} has no live row", id)))
    }
}

/// Thread-safe map-backed AccountStore.
#[derive(Clone, Default)]
pub struct InMemoryAccountStore {
    table: Arc<RwLock<AccountTable>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an account deleted. Provisioning flows own deletion; the
    /// aggregate never calls this.
    pub fn soft_delete(&self, id: AccountId) -> DomainResult<()> {
        let mut table = write(&self.table)?;
        let account = table.live_mut(id)?;
        let now = Utc::now();
        account.deleted_at = Some(now);
        account.updated_at = now;
        Ok(())
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn load_by_id(&self, id: AccountId) -> DomainResult<AccountData> {
        read(&self.table)?
            .live(id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("account {}", id)))
    }

    async fn load_by_name(&self, name: &str) -> DomainResult<AccountData> {
        read(&self.table)?
            .rows
            .values()
            .find(|a| a.is_active() && a.name == name)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("account {}", name)))
    }

    async fn list(&self) -> DomainResult<Vec<AccountData>> {
        Ok(read(&self.table)?
            .rows
            .values()
            .filter(|a| a.is_active())
            .cloned()
            .collect())
    }

    async fn create(&self, new: NewAccount) -> DomainResult<AccountData> {
        let mut table = write(&self.table)?;
        if let Some(existing) = table
            .rows
            .values()
            .find(|a| a.name == new.name || a.uuid == new.uuid)
        {
            return Err(DomainError::duplicate(format!(
                "account {} / {}",
                existing.name, existing.uuid
            )));
        }

        table.next_id += 1;
        let now = Utc::now();
        let account = AccountData {
            id: AccountId(table.next_id),
            uuid: new.uuid,
            name: new.name,
            credential: new.credential,
            permissions: new.permissions,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        table.rows.insert(account.id, account.clone());
        Ok(account)
    }

    async fn update_permissions_by_id(
        &self,
        id: AccountId,
        info: &PermissionInfo,
    ) -> DomainResult<()> {
        let mut table = write(&self.table)?;
        let account = table.live_mut(id)?;
        account.permissions = info.clone();
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn update_password_by_id(
        &self,
        id: AccountId,
        credential: &Password,
    ) -> DomainResult<()> {
        let mut table = write(&self.table)?;
        let account = table.live_mut(id)?;
        account.credential = credential.clone();
        account.updated_at = Utc::now();
        Ok(())
    }
}

struct FederationEntry<D> {
    descriptor: D,
    deleted_at: Option<DateTime<Utc>>,
}

/// Thread-safe map-backed FederationRepository for one kind.
pub struct InMemoryFederationRepository<D> {
    entries: Arc<RwLock<HashMap<String, FederationEntry<D>>>>,
}

impl<D> Clone for InMemoryFederationRepository<D> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<D> Default for InMemoryFederationRepository<D> {
    fn default() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<D: FederationDescriptor> InMemoryFederationRepository<D> {
    pub fn new() -> Self {
        Self::default()
    }

    fn not_found(uuid: &str) -> DomainError {
        DomainError::not_found(format!("{} federation {}", D::KIND, uuid))
    }
}

#[async_trait]
impl<D: FederationDescriptor> FederationRepository<D> for InMemoryFederationRepository<D> {
    async fn create(&self, descriptor: &D) -> DomainResult<()> {
        let mut entries = write(&self.entries)?;
        let uuid = descriptor.identifier();
        if entries.contains_key(uuid) {
            return Err(DomainError::duplicate(format!("federation {}", uuid)));
        }
        entries.insert(
            uuid.to_string(),
            FederationEntry {
                descriptor: descriptor.clone(),
                deleted_at: None,
            },
        );
        Ok(())
    }

    async fn list(&self) -> DomainResult<Vec<D>> {
        Ok(read(&self.entries)?
            .values()
            .filter(|e| e.deleted_at.is_none())
            .map(|e| e.descriptor.clone())
            .collect())
    }

    async fn delete_by_uuid(&self, uuid: &str) -> DomainResult<()> {
        let mut entries = write(&self.entries)?;
        match entries.get_mut(uuid) {
            Some(entry) if entry.deleted_at.is_none() => {
                entry.deleted_at = Some(Utc::now());
                Ok(())
            }
            _ => Err(Self::not_found(uuid)),
        }
    }

    async fn get_by_uuid(&self, uuid: &str) -> DomainResult<D> {
        read(&self.entries)?
            .get(uuid)
            .filter(|e| e.deleted_at.is_none())
            .map(|e| e.descriptor.clone())
            .ok_or_else(|| Self::not_found(uuid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_domain::{Capability, FateFederation, FederationInfo, HashCost};

    fn new_account(name: &str) -> NewAccount {
        NewAccount {
            uuid: format!("uuid-{}", name),
            name: name.to_string(),
            credential: Password::hash_with("InitPass1", HashCost::new(8, 1, 1)).unwrap(),
            permissions: PermissionInfo::full(),
        }
    }

    #[tokio::test]
    async fn test_ids_are_assigned_sequentially() {
        let store = InMemoryAccountStore::new();
        let first = store.create(new_account("alice")).await.unwrap();
        let second = store.create(new_account("bob")).await.unwrap();

        assert_eq!(first.id, AccountId(1));
        assert_eq!(second.id, AccountId(2));
    }

    #[tokio::test]
    async fn test_soft_deleted_account_is_hidden_but_reserved() {
        let store = InMemoryAccountStore::new();
        let alice = store.create(new_account("alice")).await.unwrap();
        store.soft_delete(alice.id).unwrap();

        assert!(matches!(
            store.load_by_id(alice.id).await,
            Err(DomainError::NotFound(_))
        ));
        assert!(store.list().await.unwrap().is_empty());
        assert!(matches!(
            store.create(new_account("alice")).await,
            Err(DomainError::DuplicateIdentifier(_))
        ));
        assert!(matches!(
            store
                .update_permissions_by_id(alice.id, &PermissionInfo::none())
                .await,
            Err(DomainError::Persistence(_))
        ));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = InMemoryAccountStore::new();
        let alice = store.create(new_account("alice")).await.unwrap();
        let other = store.clone();

        let info = PermissionInfo::none().with(Capability::SitePortal, true);
        other.update_permissions_by_id(alice.id, &info).await.unwrap();

        assert_eq!(store.load_by_id(alice.id).await.unwrap().permissions, info);
    }

    #[tokio::test]
    async fn test_federation_identifier_reserved_after_delete() {
        let repo = InMemoryFederationRepository::<FateFederation>::new();
        let federation = FateFederation {
            info: FederationInfo::new("fate", ""),
            domain: "fate.example.com".to_string(),
        };

        repo.create(&federation).await.unwrap();
        repo.delete_by_uuid(federation.identifier()).await.unwrap();

        assert!(matches!(
            repo.create(&federation).await,
            Err(DomainError::DuplicateIdentifier(_))
        ));
    }
}
