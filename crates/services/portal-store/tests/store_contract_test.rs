//! Store contract tests, run against the in-memory stores and against
//! SQLite through the SeaORM stores.

use std::collections::BTreeMap;
use std::sync::Arc;

use sea_orm::{ConnectOptions, DatabaseConnection};

use portal_domain::{
    Account, AccountId, AccountPolicy, AccountStore, Capability, DomainError, FateFederation,
    FederationDescriptor, FederationInfo, FederationRepository, HashCost, NewAccount,
    OpenFlFederation, Password, PermissionInfo, ShardDescriptorConfig, ValidationError,
};
use portal_store::infra::Database;
use portal_store::{
    DbAccountStore, DbFederationStore, InMemoryAccountStore, InMemoryFederationRepository,
};

const FAST: HashCost = HashCost::new(8, 1, 1);

async fn sqlite() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    Database::connect_with(options)
        .await
        .expect("sqlite connection")
        .get_connection()
}

fn policy() -> Arc<AccountPolicy> {
    Arc::new(AccountPolicy::default().with_hash_cost(FAST))
}

fn new_account(name: &str, password: &str, permissions: PermissionInfo) -> NewAccount {
    NewAccount {
        uuid: uuid::Uuid::new_v4().to_string(),
        name: name.to_string(),
        credential: Password::hash_with(password, FAST).unwrap(),
        permissions,
    }
}

fn fate(name: &str) -> FateFederation {
    FateFederation {
        info: FederationInfo::new(name, "test federation"),
        domain: format!("{}.example.com", name),
    }
}

fn openfl(name: &str) -> OpenFlFederation {
    OpenFlFederation {
        info: FederationInfo::new(name, ""),
        domain: format!("{}.example.com", name),
        use_customized_shard_descriptor: true,
        shard_descriptor: Some(ShardDescriptorConfig {
            sample_shape: vec!["784".to_string()],
            target_shape: vec!["1".to_string()],
            template: "shard.Descriptor".to_string(),
            python_files: BTreeMap::from([("shard.py".to_string(), "pass".to_string())]),
        }),
    }
}

// =============================================================================
// Account contract
// =============================================================================

async fn account_round_trip(store: Arc<dyn AccountStore>) {
    let permissions = PermissionInfo::from_grants([
        (Capability::SitePortal, true),
        (Capability::FateBoard, false),
        (Capability::Notebook, true),
    ]);
    let created = store
        .create(new_account("alice", "AlicePass1", permissions.clone()))
        .await
        .unwrap();

    let loaded = store.load_by_id(created.id).await.unwrap();
    assert_eq!(loaded.uuid, created.uuid);
    assert_eq!(loaded.name, "alice");
    assert_eq!(loaded.permissions, permissions);
    assert!(loaded.credential.verify("AlicePass1"));
    assert!(loaded.is_active());

    let by_name = store.load_by_name("alice").await.unwrap();
    assert_eq!(by_name.id, created.id);
    assert_eq!(store.list().await.unwrap().len(), 1);
}

async fn account_missing_and_duplicate(store: Arc<dyn AccountStore>) {
    assert!(matches!(
        store.load_by_id(AccountId(999)).await,
        Err(DomainError::NotFound(_))
    ));
    assert!(matches!(
        store.load_by_name("nobody").await,
        Err(DomainError::NotFound(_))
    ));

    let original = store
        .create(new_account("bob", "BobPass12", PermissionInfo::full()))
        .await
        .unwrap();
    let duplicate = store
        .create(new_account("bob", "OtherPass1", PermissionInfo::none()))
        .await;
    assert!(matches!(duplicate, Err(DomainError::DuplicateIdentifier(_))));

    let stored = store.load_by_id(original.id).await.unwrap();
    assert!(stored.credential.verify("BobPass12"));
    assert_eq!(stored.permissions, PermissionInfo::full());

    let orphan_write = store
        .update_password_by_id(
            AccountId(999),
            &Password::hash_with("Orphan123", FAST).unwrap(),
        )
        .await;
    assert!(matches!(orphan_write, Err(DomainError::Persistence(_))));
}

async fn alice_changes_password(store: Arc<dyn AccountStore>) {
    let created = store
        .create(new_account(
            "alice",
            "AlicePass1",
            PermissionInfo::from_grants([(Capability::SitePortal, true)]),
        ))
        .await
        .unwrap();

    let mut alice = Account::load(created.id, store.clone(), policy()).await.unwrap();

    let err = alice.change_password("wrong", "NewPass1").await.unwrap_err();
    assert_eq!(err, DomainError::Validation(ValidationError::InvalidCredential));

    let err = alice.change_password("AlicePass1", "weak").await.unwrap_err();
    assert_eq!(
        err,
        DomainError::Validation(ValidationError::PasswordTooShort { min: 8 })
    );

    alice.change_password("AlicePass1", "GoodPass1").await.unwrap();

    let reloaded = store.load_by_id(created.id).await.unwrap();
    assert!(reloaded.credential.verify("GoodPass1"));
    assert!(!reloaded.credential.verify("AlicePass1"));
}

async fn admin_keeps_portal_access(store: Arc<dyn AccountStore>) {
    let mut admin = Account::provision(
        "Admin",
        "AdminPass1",
        PermissionInfo::full(),
        store.clone(),
        policy(),
    )
    .await
    .unwrap();

    let err = admin
        .update_permissions(PermissionInfo::full().with(Capability::SitePortal, false))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ADMIN_LOCKOUT");
    assert_eq!(
        store.load_by_id(admin.id()).await.unwrap().permissions,
        PermissionInfo::full()
    );

    let reduced = PermissionInfo::full().with(Capability::Notebook, false);
    admin.update_permissions(reduced.clone()).await.unwrap();
    assert_eq!(store.load_by_id(admin.id()).await.unwrap().permissions, reduced);
    assert!(admin.check_access(Capability::Notebook).is_err());
}

async fn sparse_permissions_reload_equal(store: Arc<dyn AccountStore>) {
    let portal_only = PermissionInfo::from_grants([(Capability::SitePortal, true)]);
    let mut carol = Account::provision(
        "carol",
        "CarolPass1",
        portal_only.clone(),
        store.clone(),
        policy(),
    )
    .await
    .unwrap();
    assert_eq!(store.load_by_id(carol.id()).await.unwrap().permissions, portal_only);

    let with_notebook = PermissionInfo::from_grants([
        (Capability::SitePortal, true),
        (Capability::Notebook, true),
    ]);
    carol.update_permissions(with_notebook.clone()).await.unwrap();

    let stored = store.load_by_id(carol.id()).await.unwrap().permissions;
    assert_eq!(stored, with_notebook);
    assert_eq!(carol.permissions(), &stored);
}

// =============================================================================
// Federation contract
// =============================================================================

async fn federation_round_trip<R>(fates: &R)
where
    R: FederationRepository<FateFederation>,
{
    assert!(fates.list().await.unwrap().is_empty());

    let federation = fate("alpha");
    fates.create(&federation).await.unwrap();

    let loaded = fates.get_by_uuid(federation.identifier()).await.unwrap();
    assert_eq!(loaded, federation);
    assert_eq!(fates.list().await.unwrap(), vec![federation]);
}

async fn federation_duplicate_is_rejected<R>(fates: &R)
where
    R: FederationRepository<FateFederation>,
{
    let original = fate("beta");
    fates.create(&original).await.unwrap();

    let mut impostor = fate("impostor");
    impostor.info.uuid = original.info.uuid.clone();
    let result = fates.create(&impostor).await;
    assert!(matches!(result, Err(DomainError::DuplicateIdentifier(_))));

    let stored = fates.get_by_uuid(original.identifier()).await.unwrap();
    assert_eq!(stored, original);
}

async fn federation_delete_is_not_idempotent<R>(fates: &R)
where
    R: FederationRepository<FateFederation>,
{
    let federation = fate("gamma");
    let uuid = federation.identifier().to_string();
    fates.create(&federation).await.unwrap();

    fates.delete_by_uuid(&uuid).await.unwrap();

    assert!(matches!(
        fates.get_by_uuid(&uuid).await,
        Err(DomainError::NotFound(_))
    ));
    assert!(matches!(
        fates.delete_by_uuid(&uuid).await,
        Err(DomainError::NotFound(_))
    ));
    assert!(fates.list().await.unwrap().is_empty());
}

async fn federation_keeps_caller_identifier<R>(fates: &R)
where
    R: FederationRepository<FateFederation>,
{
    let mut federation = fate("theta");
    federation.info.uuid = format!("site-a/{}", "f".repeat(120));
    fates.create(&federation).await.unwrap();

    let loaded = fates.get_by_uuid(federation.identifier()).await.unwrap();
    assert_eq!(loaded.identifier(), federation.identifier());
    assert_eq!(loaded, federation);
}

async fn openfl_round_trip<R>(openfls: &R)
where
    R: FederationRepository<OpenFlFederation>,
{
    let federation = openfl("delta");
    openfls.create(&federation).await.unwrap();

    let loaded = openfls.get_by_uuid(federation.identifier()).await.unwrap();
    assert_eq!(loaded, federation);
}

// =============================================================================
// In-memory
// =============================================================================

#[tokio::test]
async fn test_memory_account_round_trip() {
    account_round_trip(Arc::new(InMemoryAccountStore::new())).await;
}

#[tokio::test]
async fn test_memory_account_missing_and_duplicate() {
    account_missing_and_duplicate(Arc::new(InMemoryAccountStore::new())).await;
}

#[tokio::test]
async fn test_memory_alice_changes_password() {
    alice_changes_password(Arc::new(InMemoryAccountStore::new())).await;
}

#[tokio::test]
async fn test_memory_admin_keeps_portal_access() {
    admin_keeps_portal_access(Arc::new(InMemoryAccountStore::new())).await;
}

#[tokio::test]
async fn test_memory_sparse_permissions_reload_equal() {
    sparse_permissions_reload_equal(Arc::new(InMemoryAccountStore::new())).await;
}

#[tokio::test]
async fn test_memory_federations() {
    let fates = InMemoryFederationRepository::<FateFederation>::new();
    federation_round_trip(&fates).await;
    federation_duplicate_is_rejected(&fates).await;

    federation_delete_is_not_idempotent(&InMemoryFederationRepository::new()).await;
    federation_keeps_caller_identifier(&InMemoryFederationRepository::new()).await;
    openfl_round_trip(&InMemoryFederationRepository::new()).await;
}

// =============================================================================
// SQLite via SeaORM
// =============================================================================

#[tokio::test]
async fn test_db_account_round_trip() {
    account_round_trip(Arc::new(DbAccountStore::new(sqlite().await))).await;
}

#[tokio::test]
async fn test_db_account_missing_and_duplicate() {
    account_missing_and_duplicate(Arc::new(DbAccountStore::new(sqlite().await))).await;
}

#[tokio::test]
async fn test_db_alice_changes_password() {
    alice_changes_password(Arc::new(DbAccountStore::new(sqlite().await))).await;
}

#[tokio::test]
async fn test_db_admin_keeps_portal_access() {
    admin_keeps_portal_access(Arc::new(DbAccountStore::new(sqlite().await))).await;
}

#[tokio::test]
async fn test_db_sparse_permissions_reload_equal() {
    sparse_permissions_reload_equal(Arc::new(DbAccountStore::new(sqlite().await))).await;
}

#[tokio::test]
async fn test_db_federations() {
    let db = sqlite().await;
    let fates = DbFederationStore::<FateFederation>::new(db.clone());
    federation_round_trip(&fates).await;
    federation_duplicate_is_rejected(&fates).await;

    let db = sqlite().await;
    federation_delete_is_not_idempotent(&DbFederationStore::new(db)).await;

    let db = sqlite().await;
    federation_keeps_caller_identifier(&DbFederationStore::new(db)).await;

    let db = sqlite().await;
    openfl_round_trip(&DbFederationStore::new(db)).await;
}

#[tokio::test]
async fn test_db_federation_kinds_are_isolated() {
    let db = sqlite().await;
    let fates = DbFederationStore::<FateFederation>::new(db.clone());
    let openfls = DbFederationStore::<OpenFlFederation>::new(db);

    let fate_federation = fate("epsilon");
    fates.create(&fate_federation).await.unwrap();
    openfls.create(&openfl("zeta")).await.unwrap();

    assert_eq!(fates.list().await.unwrap().len(), 1);
    assert_eq!(openfls.list().await.unwrap().len(), 1);
    assert!(matches!(
        openfls.get_by_uuid(fate_federation.identifier()).await,
        Err(DomainError::NotFound(_))
    ));
    assert!(matches!(
        openfls.delete_by_uuid(fate_federation.identifier()).await,
        Err(DomainError::NotFound(_))
    ));

    // Identifiers are unique across kinds
    let mut clash = openfl("eta");
    clash.info.uuid = fate_federation.info.uuid.clone();
    assert!(matches!(
        openfls.create(&clash).await,
        Err(DomainError::DuplicateIdentifier(_))
    ));
}
