/// Default page size for pagination
#[allow(dead_code)]
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
#[allow(dead_code)]
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// API KEYS
// =============================================================================

/// The only recognized key type for caller credentials
pub const PBM_API_KEY_TYPE: &str = "pbm_api_key";

/// Prefix for newly minted caller keys
pub const API_KEY_PREFIX: &str = "pbm_";

// =============================================================================
// AUDIT REDACTION
// =============================================================================

/// Replaces the caller-supplied provider key in logged request bodies
pub const REDACTED_API_KEY: &str = "[REDACTED]";

/// Replaces the prompt password in logged request bodies
pub const REDACTED_PASSWORD: &str = "********";
