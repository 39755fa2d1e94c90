/// Default REST API base URL
pub const DEFAULT_API_BASE: &str = "http://localhost:5000/api";

/// Default realtime endpoint (primary transport)
pub const DEFAULT_WS_URL: &str = "ws://localhost:5000/chathub";

/// Fallback realtime endpoint tried when the primary fails
pub const DEFAULT_WS_FALLBACK_URL: &str = "ws://localhost:5001/chathub";

/// Message history page size
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Two messages from the same sender with the same content closer together
/// than this are treated as one message
pub const DEDUP_WINDOW_MS: i64 = 500;

/// Outbound typing indicator: inactivity before "stopped typing" is sent
pub const TYPING_DEBOUNCE_MS: u64 = 1_000;

/// Inbound typing entries older than this are swept
pub const TYPING_TTL_SECS: u64 = 5;

/// Interval of the typing sweep tick
pub const TYPING_SWEEP_INTERVAL_MS: u64 = 1_000;

/// Reconnect backoff: first delay
pub const RECONNECT_INITIAL_DELAY_MS: u64 = 500;

/// Reconnect backoff: delay cap
pub const RECONNECT_MAX_DELAY_MS: u64 = 30_000;

/// Reconnect attempts before the connection is considered permanently down
pub const RECONNECT_MAX_ATTEMPTS: u32 = 8;

/// Display name used when a direct chat's peer cannot be resolved
pub const UNKNOWN_USER_PLACEHOLDER: &str = "Unknown user";
