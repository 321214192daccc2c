//! Account capabilities and the PermissionInfo value object.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Capabilities an account can be granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    SitePortal,
    FateBoard,
    Notebook,
}

impl Capability {
    /// Every capability, in display order
    pub const ALL: [Capability; 3] = [
        Capability::SitePortal,
        Capability::FateBoard,
        Capability::Notebook,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::SitePortal => "site_portal",
            Capability::FateBoard => "fate_board",
            Capability::Notebook => "notebook",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownCapability(s.to_string()))
    }
}

/// What an account may access.
///
/// Immutable: changes produce a new value, and the aggregate swaps the whole
/// set at once. Every capability always has an entry; one that was never
/// granted is stored as denied, so equal grants compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredGrants")]
pub struct PermissionInfo {
    grants: BTreeMap<Capability, bool>,
}

#[derive(Deserialize)]
struct StoredGrants {
    #[serde(default)]
    grants: BTreeMap<Capability, bool>,
}

impl From<StoredGrants> for PermissionInfo {
    fn from(stored: StoredGrants) -> Self {
        Self::from_grants(stored.grants)
    }
}

impl Default for PermissionInfo {
    fn default() -> Self {
        Self::none()
    }
}

impl PermissionInfo {
    /// No capability granted.
    pub fn none() -> Self {
        Self {
            grants: Capability::ALL.into_iter().map(|c| (c, false)).collect(),
        }
    }

    /// Every capability granted.
    pub fn full() -> Self {
        Self::from_grants(Capability::ALL.into_iter().map(|c| (c, true)))
    }

    /// Capabilities left out of `grants` are denied.
    pub fn from_grants(grants: impl IntoIterator<Item = (Capability, bool)>) -> Self {
        let mut info = Self::none();
        info.grants.extend(grants);
        info
    }

    /// Copy of this value with one grant changed.
    pub fn with(&self, capability: Capability, granted: bool) -> Self {
        let mut grants = self.grants.clone();
        grants.insert(capability, granted);
        Self { grants }
    }

    pub fn is_granted(&self, capability: Capability) -> bool {
        self.grants.get(&capability).copied().unwrap_or(false)
    }

    /// Every capability with its grant.
    pub fn grants(&self) -> impl Iterator<Item = (Capability, bool)> + '_ {
        self.grants.iter().map(|(c, g)| (*c, *g))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_capability_is_denied() {
        let info = PermissionInfo::from_grants([(Capability::SitePortal, true)]);
        assert!(info.is_granted(Capability::SitePortal));
        assert!(!info.is_granted(Capability::Notebook));
        assert!(!PermissionInfo::none().is_granted(Capability::SitePortal));
    }

    #[test]
    fn test_with_returns_new_value() {
        let original = PermissionInfo::full();
        let revoked = original.with(Capability::FateBoard, false);

        assert!(original.is_granted(Capability::FateBoard));
        assert!(!revoked.is_granted(Capability::FateBoard));
        assert!(revoked.is_granted(Capability::SitePortal));
    }

    #[test]
    fn test_capability_names_round_trip() {
        for capability in Capability::ALL {
            assert_eq!(capability.as_str().parse::<Capability>(), Ok(capability));
        }
        assert_eq!(
            "admin_console".parse::<Capability>(),
            Err(ValidationError::UnknownCapability("admin_console".to_string()))
        );
    }

    #[test]
    fn test_sparse_and_complete_grants_compare_equal() {
        let sparse = PermissionInfo::from_grants([(Capability::SitePortal, true)]);
        let complete = PermissionInfo::from_grants([
            (Capability::SitePortal, true),
            (Capability::FateBoard, false),
            (Capability::Notebook, false),
        ]);

        assert_eq!(sparse, complete);
        assert_eq!(sparse.grants().count(), Capability::ALL.len());
        assert_eq!(PermissionInfo::none(), PermissionInfo::default());
        assert_eq!(
            PermissionInfo::none().with(Capability::Notebook, true),
            PermissionInfo::from_grants([(Capability::Notebook, true)])
        );
    }

    #[test]
    fn test_serializes_as_name_map() {
        let info = PermissionInfo::from_grants([
            (Capability::SitePortal, true),
            (Capability::Notebook, false),
        ]);
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "grants": { "site_portal": true, "fate_board": false, "notebook": false }
            })
        );
    }

    #[test]
    fn test_deserialized_sparse_map_is_completed() {
        let info: PermissionInfo =
            serde_json::from_value(serde_json::json!({ "grants": { "fate_board": true } }))
                .unwrap();
        assert_eq!(info, PermissionInfo::from_grants([(Capability::FateBoard, true)]));
        assert_eq!(info.grants().count(), Capability::ALL.len());
    }
}
