//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Accounts
// =============================================================================

/// Account that can never lose site portal access unless configured otherwise
pub const DEFAULT_PROTECTED_ACCOUNT: &str = "Admin";

// =============================================================================
// Password Policy
// =============================================================================

/// Minimum password length in characters
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length in characters
pub const MAX_PASSWORD_LENGTH: usize = 20;

// =============================================================================
// Credential Hashing (argon2id work factor)
// =============================================================================

/// Memory cost in KiB
pub const HASH_MEMORY_KIB: u32 = 19 * 1024;

/// Number of passes over memory
pub const HASH_ITERATIONS: u32 = 2;

/// Degree of parallelism
pub const HASH_PARALLELISM: u32 = 1;

// =============================================================================
// Federations
// =============================================================================

/// Kind tag stored for FATE federations
pub const FEDERATION_KIND_FATE: &str = "FATE";

/// Kind tag stored for OpenFL federations
pub const FEDERATION_KIND_OPENFL: &str = "OpenFL";
