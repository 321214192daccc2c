//! Domain layer - Accounts, credentials and federation descriptors.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! Persistence is reached only through the [`AccountStore`] and
//! [`FederationRepository`] ports, implemented by the store crate.

pub mod account;
pub mod constants;
pub mod error;
pub mod federation;
pub mod password;
pub mod permission;
pub mod policy;
pub mod store;

pub use account::{Account, AccountData, AccountId, NewAccount};
pub use constants::*;
pub use error::{DomainError, DomainResult, PolicyViolation, ValidationError};
pub use federation::{
    FateFederation, Federation, FederationDescriptor, FederationInfo, FederationKind,
    FederationRepository, OpenFlFederation, ShardDescriptorConfig,
};
pub use password::{HashCost, Password, PasswordPolicy};
pub use permission::{Capability, PermissionInfo};
pub use policy::AccountPolicy;
pub use store::AccountStore;

// Export mock for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use store::MockAccountStore;
