//! System-wide default constants.
//!
//! Centralises the framework's magic numbers, grouped by subsystem.

// ============================================================================
// Circuit breaker
// ============================================================================

/// Consecutive failures (since the last success) before a breaker opens.
pub const FAILURE_THRESHOLD: usize = 5;

/// Cooldown before an open breaker re-admits a call (milliseconds).
pub const RECOVERY_TIMEOUT_MS: u64 = 60_000;

// ============================================================================
// Health monitor
// ============================================================================

/// Interval between health-monitor ticks (milliseconds).
pub const CHECK_INTERVAL_MS: u64 = 30_000;

/// Bounded health history length; the oldest report is evicted beyond this.
pub const HEALTH_HISTORY_CAPACITY: usize = 10;

// ============================================================================
// Dispatch
// ============================================================================

/// Constant low score of the Echo Chamber fallback, so it only wins when
/// every other expert scores 0.
pub const ECHO_FALLBACK_SCORE: f64 = 0.1;

/// Probe prompt scored against every expert during activation diagnostics.
pub const DIAGNOSTIC_PROBE: &str = "test diagnostic prompt";

/// Random suffix length of generated request ids.
pub const REQUEST_ID_SUFFIX_LEN: usize = 9;

/// Prompt preview length in dispatch log lines (characters).
pub const PROMPT_LOG_PREVIEW_CHARS: usize = 80;

/// Prompt preview length echoed back in the fallback response (characters).
pub const ECHO_PREVIEW_CHARS: usize = 100;

// ============================================================================
// Server
// ============================================================================

/// Default HTTP bind address.
pub const SERVER_BIND_ADDR: &str = "0.0.0.0:8080";
