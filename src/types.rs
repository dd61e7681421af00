//! Shared types for the MOEX expert-routing framework.
//!
//! Everything a caller can observe — expert results, health reports,
//! circuit-breaker snapshots, system status — lives here as plain serde
//! structs so the library API and the HTTP surface serialize identically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Circuit breaker
// ============================================================================

/// Circuit breaker states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    /// Normal operation — calls pass through.
    Closed,
    /// Failing fast — calls are rejected without invoking the operation.
    Open,
    /// Probing recovery — the next call is attempted.
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "CLOSED"),
            CircuitState::Open => write!(f, "OPEN"),
            CircuitState::HalfOpen => write!(f, "HALF_OPEN"),
        }
    }
}

/// Point-in-time snapshot of one expert's circuit breaker.
#[derive(Debug, Clone, Serialize)]
pub struct BreakerStatus {
    pub expert: String,
    pub state: CircuitState,
    pub failure_count: usize,
    pub is_healthy: bool,
    /// Milliseconds until an open breaker re-admits a call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_retry_in_ms: Option<u64>,
}

// ============================================================================
// Expert health
// ============================================================================

/// Coarse expert health classification derived from the lifetime success
/// ratio (> 0.8 healthy, > 0.5 degraded, else failed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Failed,
}

impl HealthStatus {
    /// Classify a success ratio.
    #[must_use]
    pub fn from_success_rate(rate: f64) -> Self {
        if rate > 0.8 {
            HealthStatus::Healthy
        } else if rate > 0.5 {
            HealthStatus::Degraded
        } else {
            HealthStatus::Failed
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "HEALTHY"),
            HealthStatus::Degraded => write!(f, "DEGRADED"),
            HealthStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// Full health snapshot for one expert, as reported by the registry.
#[derive(Debug, Clone, Serialize)]
pub struct ExpertHealthReport {
    pub name: String,
    pub specialty: String,
    pub health: HealthStatus,
    pub success_rate: f64,
    pub process_count: u64,
    pub circuit_breaker: BreakerStatus,
    pub last_health_check: DateTime<Utc>,
}

/// One health-monitor tick: aggregate counts plus per-expert detail.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub timestamp: DateTime<Utc>,
    pub total_experts: usize,
    pub healthy_experts: usize,
    pub degraded_experts: usize,
    pub failed_experts: usize,
    pub experts: Vec<ExpertHealthReport>,
}

/// Overall system health derived from the most recent monitor tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallHealth {
    Healthy,
    Degraded,
    Critical,
    NoData,
}

/// Condensed system health: overall status plus expert counts.
#[derive(Debug, Clone, Serialize)]
pub struct HealthSummary {
    pub status: OverallHealth,
    pub healthy: usize,
    pub degraded: usize,
    pub failed: usize,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_check: Option<DateTime<Utc>>,
}

impl HealthSummary {
    /// Summary before any monitor tick has run.
    #[must_use]
    pub fn no_data() -> Self {
        Self {
            status: OverallHealth::NoData,
            healthy: 0,
            degraded: 0,
            failed: 0,
            total: 0,
            last_check: None,
        }
    }

    /// Derive the overall status from a monitor tick: any failed expert is
    /// CRITICAL, any degraded expert is DEGRADED, otherwise HEALTHY.
    #[must_use]
    pub fn from_report(report: &HealthReport) -> Self {
        let status = if report.failed_experts > 0 {
            OverallHealth::Critical
        } else if report.degraded_experts > 0 {
            OverallHealth::Degraded
        } else {
            OverallHealth::Healthy
        };
        Self {
            status,
            healthy: report.healthy_experts,
            degraded: report.degraded_experts,
            failed: report.failed_experts,
            total: report.total_experts,
            last_check: Some(report.timestamp),
        }
    }
}

/// Health monitor runtime status.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorStatus {
    pub running: bool,
    pub check_interval_ms: u64,
    pub history_length: usize,
    pub summary: HealthSummary,
}

// ============================================================================
// Dispatch results
// ============================================================================

/// Severity of a canned bug archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BugSeverity {
    High,
    Medium,
}

impl std::fmt::Display for BugSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BugSeverity::High => write!(f, "HIGH"),
            BugSeverity::Medium => write!(f, "MEDIUM"),
        }
    }
}

/// Expert-specific payload. Serialized flattened into [`ExpertResult`], so
/// each variant's fields appear alongside the shared ones.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ResultDetail {
    /// DNA Transcription Specialist output.
    Dna {
        sequence: String,
        base_pairs: Vec<String>,
        visualization: String,
    },
    /// Bug Hunter Detective output.
    Bug {
        severity: BugSeverity,
        solution: String,
        prevention: String,
    },
    /// Terminal Command Specialist output.
    Terminal {
        suggestions: Vec<String>,
        safety: String,
    },
    /// Echo Chamber fallback output.
    Echo {
        response: String,
        suggestions: Vec<String>,
    },
}

/// One entry of the per-request score vector.
#[derive(Debug, Clone, Serialize)]
pub struct ExpertScore {
    pub expert: String,
    pub score: f64,
}

/// Metadata attached to a successfully dispatched request.
#[derive(Debug, Clone, Serialize)]
pub struct RequestMetadata {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    pub processing_time_ms: u64,
    pub expert_scores: Vec<ExpertScore>,
    pub system_health: HealthSummary,
}

/// Result of processing one request with one expert.
#[derive(Debug, Clone, Serialize)]
pub struct ExpertResult {
    pub expert: String,
    pub analysis: String,
    #[serde(flatten)]
    pub detail: ResultDetail,
    pub confidence: f64,
    /// Present only when the dispatch loop completed normally; direct expert
    /// queries and fallback responses carry no metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RequestMetadata>,
}

// ============================================================================
// System status
// ============================================================================

/// Full framework status, as returned by `get_system_status`.
#[derive(Debug, Clone, Serialize)]
pub struct SystemStatus {
    pub active: bool,
    pub total_requests: u64,
    pub last_request_time: Option<DateTime<Utc>>,
    pub experts_registered: usize,
    pub expert_health: Vec<ExpertHealthReport>,
    pub health_monitor: MonitorStatus,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_thresholds() {
        assert_eq!(HealthStatus::from_success_rate(1.0), HealthStatus::Healthy);
        assert_eq!(HealthStatus::from_success_rate(0.81), HealthStatus::Healthy);
        assert_eq!(HealthStatus::from_success_rate(0.8), HealthStatus::Degraded);
        assert_eq!(HealthStatus::from_success_rate(0.51), HealthStatus::Degraded);
        assert_eq!(HealthStatus::from_success_rate(0.5), HealthStatus::Failed);
        assert_eq!(HealthStatus::from_success_rate(0.0), HealthStatus::Failed);
    }

    #[test]
    fn test_circuit_state_serializes_screaming() {
        let json = serde_json::to_string(&CircuitState::HalfOpen).unwrap();
        assert_eq!(json, "\"HALF_OPEN\"");
    }

    #[test]
    fn test_result_detail_flattens_into_result() {
        let result = ExpertResult {
            expert: "Echo Chamber".to_string(),
            analysis: "🔄 Echo Response Generated".to_string(),
            detail: ResultDetail::Echo {
                response: "Acknowledged: \"hi\"".to_string(),
                suggestions: vec!["try again".to_string()],
            },
            confidence: 0.1,
            metadata: None,
        };

        let v = serde_json::to_value(&result).unwrap();
        assert_eq!(v["expert"], "Echo Chamber");
        // Variant fields sit at the top level, not nested under "detail"
        assert!(v["response"].as_str().is_some());
        assert!(v.get("detail").is_none());
        assert!(v.get("metadata").is_none());
    }

    #[test]
    fn test_no_data_summary() {
        let summary = HealthSummary::no_data();
        assert_eq!(summary.status, OverallHealth::NoData);
        let v = serde_json::to_value(&summary).unwrap();
        assert_eq!(v["status"], "NO_DATA");
        assert!(v.get("last_check").is_none());
    }
}
