//! Account policy injected into every aggregate.

use std::collections::BTreeSet;

use crate::constants::DEFAULT_PROTECTED_ACCOUNT;
use crate::password::HashCost;

/// Rules that vary per deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountPolicy {
    /// Accounts whose site portal access can never be revoked
    pub protected_account_names: BTreeSet<String>,
    /// Work factor for new credential hashes
    pub hash_cost: HashCost,
}

impl Default for AccountPolicy {
    fn default() -> Self {
        Self {
            protected_account_names: BTreeSet::from([DEFAULT_PROTECTED_ACCOUNT.to_string()]),
            hash_cost: HashCost::default(),
        }
    }
}

impl AccountPolicy {
    /// Replace the protected account set.
    pub fn with_protected_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.protected_account_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_hash_cost(mut self, cost: HashCost) -> Self {
        self.hash_cost = cost;
        self
    }

    /// Exact, case-sensitive match on the account name.
    pub fn is_protected(&self, name: &str) -> bool {
        self.protected_account_names.contains(name)
    }
}
