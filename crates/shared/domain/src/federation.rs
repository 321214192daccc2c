//! Federation descriptors and their repository port.
//!
//! Each federation kind is its own struct sharing [`FederationInfo`].
//! Repositories are generic over the kind, so callers always get back the
//! concrete type they stored. [`Federation`] is the closed union for code
//! that needs to hold mixed kinds.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{FEDERATION_KIND_FATE, FEDERATION_KIND_OPENFL};
use crate::error::DomainResult;

/// Federation kinds known to the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FederationKind {
    #[serde(rename = "FATE")]
    Fate,
    #[serde(rename = "OpenFL")]
    OpenFl,
}

impl FederationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FederationKind::Fate => FEDERATION_KIND_FATE,
            FederationKind::OpenFl => FEDERATION_KIND_OPENFL,
        }
    }
}

impl fmt::Display for FederationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields common to every federation kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederationInfo {
    /// Lookup key
    pub uuid: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FederationInfo {
    /// New info with a fresh uuid.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            uuid: Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// FATE federation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FateFederation {
    #[serde(flatten)]
    pub info: FederationInfo,
    /// Domain name used for ingress of FATE components
    pub domain: String,
}

/// Shard descriptor settings for OpenFL envoys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardDescriptorConfig {
    pub sample_shape: Vec<String>,
    pub target_shape: Vec<String>,
    pub template: String,
    /// File name to content
    pub python_files: BTreeMap<String, String>,
}

/// OpenFL federation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenFlFederation {
    #[serde(flatten)]
    pub info: FederationInfo,
    pub domain: String,
    pub use_customized_shard_descriptor: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub shard_descriptor: Option<ShardDescriptorConfig>,
}

/// One concrete federation shape.
///
/// Implementors are plain data; repositories persist them through serde
/// and key them by [`identifier`](Self::identifier).
pub trait FederationDescriptor:
    Clone + Send + Sync + Serialize + DeserializeOwned + 'static
{
    const KIND: FederationKind;

    fn info(&self) -> &FederationInfo;

    fn identifier(&self) -> &str {
        &self.info().uuid
    }
}

impl FederationDescriptor for FateFederation {
    const KIND: FederationKind = FederationKind::Fate;

    fn info(&self) -> &FederationInfo {
        &self.info
    }
}

impl FederationDescriptor for OpenFlFederation {
    const KIND: FederationKind = FederationKind::OpenFl;

    fn info(&self) -> &FederationInfo {
        &self.info
    }
}

/// Any federation, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Federation {
    #[serde(rename = "FATE")]
    Fate(FateFederation),
    #[serde(rename = "OpenFL")]
    OpenFl(OpenFlFederation),
}

impl Federation {
    pub fn kind(&self) -> FederationKind {
        match self {
            Federation::Fate(_) => FederationKind::Fate,
            Federation::OpenFl(_) => FederationKind::OpenFl,
        }
    }

    pub fn info(&self) -> &FederationInfo {
        match self {
            Federation::Fate(f) => &f.info,
            Federation::OpenFl(f) => &f.info,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.info().uuid
    }
}

impl From<FateFederation> for Federation {
    fn from(federation: FateFederation) -> Self {
        Federation::Fate(federation)
    }
}

impl From<OpenFlFederation> for Federation {
    fn from(federation: OpenFlFederation) -> Self {
        Federation::OpenFl(federation)
    }
}

/// Identifier-keyed storage for one federation kind.
///
/// There is no update; change a federation by deleting and recreating it.
/// Deletion is soft: a deleted identifier stays reserved and `create` with
/// it fails. No isolation is promised across calls.
#[async_trait]
pub trait FederationRepository<D: FederationDescriptor>: Send + Sync {
    /// `DuplicateIdentifier` if the identifier was ever stored
    async fn create(&self, descriptor: &D) -> DomainResult<()>;

    /// All live descriptors of this kind, in no particular order
    async fn list(&self) -> DomainResult<Vec<D>>;

    /// `NotFound` if no live descriptor of this kind has the identifier
    async fn delete_by_uuid(&self, uuid: &str) -> DomainResult<()>;

    /// `NotFound` if no live descriptor of this kind has the identifier
    async fn get_by_uuid(&self, uuid: &str) -> DomainResult<D>;
}
