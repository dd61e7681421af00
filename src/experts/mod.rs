//! Expert trait and implementations for MOEX request routing.
//!
//! Each expert scores free-text prompts from its own domain perspective and
//! produces a canned, deterministic transformation. An [`ExpertHandle`]
//! wraps every registered expert with its own circuit breaker and lifetime
//! health metrics.
//!
//! ## Experts
//!
//! 1. **DNA Transcription Specialist** — genetic visualization of code-like input
//! 2. **Bug Hunter Detective** — canned debugging analysis
//! 3. **Terminal Command Specialist** — shell command suggestions
//! 4. **Echo Chamber** — always-available fallback (constant score 0.1)

pub mod bug_hunter;
pub mod dna;
pub mod echo;
pub mod terminal;

pub use bug_hunter::BugHunterExpert;
pub use dna::DnaExpert;
pub use echo::EchoExpert;
pub use terminal::TerminalExpert;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use crate::breaker::CircuitBreaker;
use crate::config::BreakerConfig;
use crate::types::{BreakerStatus, ExpertHealthReport, ExpertResult, HealthStatus};

/// Name of the irremovable fallback expert.
pub const ECHO_EXPERT_NAME: &str = "Echo Chamber";

/// Errors from scoring or processing a single expert.
#[derive(Debug, Error)]
pub enum ExpertError {
    /// Synthetic rejection raised without invoking the wrapped operation.
    /// Signals "temporarily unavailable, retry later".
    #[error("circuit breaker open for {expert} (retry in {retry_in_ms} ms)")]
    BreakerOpen { expert: String, retry_in_ms: u64 },

    /// The expert's own scoring or processing logic failed.
    #[error("expert failure: {0}")]
    Failed(String),
}

/// Capability interface every expert implements.
///
/// `can_handle` is a cheap case-insensitive keyword predicate.
/// `calculate_score` is 0 whenever `can_handle` is false, otherwise a base
/// score plus additive keyword bonuses, capped at 1.0.
#[async_trait]
pub trait Expert: Send + Sync {
    /// Expert name (e.g. "Bug Hunter Detective"). Unique within a registry.
    fn name(&self) -> &str;

    /// Specialty description; its first word is the registry category.
    fn specialty(&self) -> &str;

    /// Cheap keyword predicate, case-insensitive.
    fn can_handle(&self, prompt: &str) -> bool;

    /// Confidence score in [0, 1]; 0 whenever `can_handle` is false.
    fn calculate_score(&self, prompt: &str) -> Result<f64, ExpertError>;

    /// Produce the expert's canned transformation of the prompt.
    async fn process(&self, prompt: &str) -> Result<ExpertResult, ExpertError>;
}

/// Create the default expert set. Echo Chamber is registered last, as the
/// fallback.
#[must_use]
pub fn default_experts() -> Vec<Box<dyn Expert>> {
    vec![
        Box::new(DnaExpert),
        Box::new(BugHunterExpert),
        Box::new(TerminalExpert),
        Box::new(EchoExpert),
    ]
}

// ============================================================================
// Health metrics
// ============================================================================

/// Lifetime success counters for one expert.
///
/// The success ratio is cumulative over the whole process lifetime — never
/// windowed or decayed — so a long healthy history can mask a recent outage
/// and vice versa.
#[derive(Debug, Clone)]
pub struct HealthMetrics {
    pub process_count: u64,
    pub success_count: u64,
    pub status: HealthStatus,
    pub last_health_check: DateTime<Utc>,
}

impl HealthMetrics {
    fn new() -> Self {
        Self {
            process_count: 0,
            success_count: 0,
            status: HealthStatus::Healthy,
            last_health_check: Utc::now(),
        }
    }

    /// Record one scoring/processing outcome and re-derive the status.
    fn record(&mut self, success: bool) {
        self.process_count += 1;
        if success {
            self.success_count += 1;
        }
        self.last_health_check = Utc::now();
        self.status = HealthStatus::from_success_rate(self.success_rate());
    }

    /// Success ratio; 1.0 before any call has been recorded.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.process_count == 0 {
            1.0
        } else {
            self.success_count as f64 / self.process_count as f64
        }
    }
}

// ============================================================================
// Expert handle
// ============================================================================

/// An expert wrapped with its own circuit breaker and health metrics.
///
/// The registry stores handles; all scoring and processing goes through
/// here so every call updates the breaker and the lifetime counters.
pub struct ExpertHandle {
    expert: Box<dyn Expert>,
    breaker: CircuitBreaker,
    metrics: RwLock<HealthMetrics>,
}

impl ExpertHandle {
    pub fn new(expert: Box<dyn Expert>, breaker_config: &BreakerConfig) -> Self {
        let breaker = CircuitBreaker::new(expert.name(), breaker_config);
        Self {
            expert,
            breaker,
            metrics: RwLock::new(HealthMetrics::new()),
        }
    }

    pub fn name(&self) -> &str {
        self.expert.name()
    }

    pub fn specialty(&self) -> &str {
        self.expert.specialty()
    }

    pub fn can_handle(&self, prompt: &str) -> bool {
        self.expert.can_handle(prompt)
    }

    /// Score the expert through its circuit breaker.
    ///
    /// Breaker rejection and scoring failure are absorbed to a score of 0,
    /// so a broken expert can never abort a dispatch pass.
    pub async fn confidence_score(&self, prompt: &str) -> f64 {
        match self
            .breaker
            .execute(|| async { self.expert.calculate_score(prompt) })
            .await
        {
            Ok(score) => {
                self.metrics.write().await.record(true);
                score
            }
            Err(err) => {
                self.metrics.write().await.record(false);
                debug!(expert = %self.expert.name(), error = %err, "⚠️ Expert scoring failed — scoring 0");
                0.0
            }
        }
    }

    /// Process through the circuit breaker. Failures update health metrics
    /// and propagate to the caller.
    pub async fn process(&self, prompt: &str) -> Result<ExpertResult, ExpertError> {
        match self.breaker.execute(|| self.expert.process(prompt)).await {
            Ok(result) => {
                self.metrics.write().await.record(true);
                Ok(result)
            }
            Err(err) => {
                self.metrics.write().await.record(false);
                Err(err)
            }
        }
    }

    /// Full health snapshot for this expert.
    pub async fn health_report(&self) -> ExpertHealthReport {
        let metrics = self.metrics.read().await.clone();
        ExpertHealthReport {
            name: self.expert.name().to_string(),
            specialty: self.expert.specialty().to_string(),
            health: metrics.status,
            success_rate: metrics.success_rate(),
            process_count: metrics.process_count,
            circuit_breaker: self.breaker.status().await,
            last_health_check: metrics.last_health_check,
        }
    }

    /// Circuit breaker snapshot only.
    pub async fn breaker_status(&self) -> BreakerStatus {
        self.breaker.status().await
    }
}

// ============================================================================
// Tests
// ============================================================================
