//! Constants Module - Single Source of Truth
//!
//! Default endpoints, polling budget and address rules for the analysis client.
//! Everything here can be overridden through `ForensicsConfig`.

// ============================================
// APPLICATION
// ============================================

/// Application name (used in logs and banners)
pub const APP_NAME: &str = "SolForensics";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent sent to the analysis backend
pub const USER_AGENT: &str = concat!("SolForensics/", env!("CARGO_PKG_VERSION"));

// ============================================
// BACKEND ENDPOINTS
// ============================================

/// Default analysis backend base URL
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5025";

/// Job submission endpoint
pub const DEFAULT_ANALYZE_PATH: &str = "/api/analyze_address";

/// Job status / result endpoint
pub const DEFAULT_RESULTS_PATH: &str = "/api/get_results";

/// Per-request HTTP timeout (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// ============================================
// POLLING BUDGET
// ============================================

/// Wait between two result polls (seconds)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Poll attempts before giving up (12 x 5s = 1 minute)
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 12;

// ============================================
// ADDRESSES
// ============================================

/// Length of a base58 Solana account address as entered by users
pub const SOLANA_ADDRESS_LENGTH: usize = 44;

/// Addresses the backend has already analyzed; their results are fetched
/// with the address itself as the job id.
pub const DEFAULT_CACHED_ADDRESSES: [&str; 3] = [
    "AGPZnBZUxmhAtcp8XjT4n8bCia9dEYhhm16M2sfFvmTU",
    "CoaKnxNQCJ91FyyNqxmwxEHwzdw8YHmgF3ZpLNjf1TzG",
    "8psNvWTrdNTiVRNzAgsou9kETXNJm2SXZyaKuJraVRtf",
];

/// Label the backend uses for addresses it could not attribute
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Alternative unknown sentinel seen in backend node labels
pub const UNKNOWN_ADDRESS_LABEL: &str = "Unknown Address";

/// Native asset symbol for display
pub const NATIVE_SYMBOL: &str = "SOL";
