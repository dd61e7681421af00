//! MOEX dispatch core.
//!
//! One [`MoexFramework`] instance owns the registry, the health monitor, and
//! the request counters — construct one per process (or per test); there is
//! no ambient global state.
//!
//! ## Dispatch algorithm
//!
//! 1. Score every registered expert concurrently; a failing expert scores 0
//!    and never aborts the pass.
//! 2. Select the strict-maximum score (first-registered wins exact ties).
//! 3. Process with the winner; on error fall back to the Echo Chamber
//!    directly, bypassing scoring. If the echo also fails, its error
//!    propagates unmodified.
//! 4. Attach request metadata (id, timing, score vector, health summary) on
//!    success.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use rand::Rng;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::config::{defaults, MoexConfig};
use crate::experts::{ExpertError, ExpertHandle, ECHO_EXPERT_NAME};
use crate::monitor::HealthMonitor;
use crate::registry::ExpertRegistry;
use crate::types::{ExpertResult, ExpertScore, RequestMetadata, SystemStatus};

/// Error type for dispatch operations.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// `process_request` called before `activate()`.
    #[error("framework not activated — call activate() first")]
    NotActivated,

    /// The registry was empty at selection time.
    #[error("no expert available to handle request")]
    NoExpertAvailable,

    /// Direct query addressed to an unregistered expert.
    #[error("unknown expert: {0}")]
    UnknownExpert(String),

    /// Processing failed and no fallback succeeded.
    #[error(transparent)]
    Expert(#[from] ExpertError),
}

/// The MOEX dispatch framework.
pub struct MoexFramework {
    registry: Arc<ExpertRegistry>,
    monitor: HealthMonitor,
    active: AtomicBool,
    total_requests: AtomicU64,
    last_request_time: RwLock<Option<DateTime<Utc>>>,
}

impl MoexFramework {
    /// Build a framework with the default expert set.
    pub async fn new(config: MoexConfig) -> Self {
        let registry =
            Arc::new(ExpertRegistry::with_default_experts(config.breaker.clone()).await);
        Self::with_registry(registry, &config)
    }

    /// Build a framework over a caller-supplied registry.
    #[must_use]
    pub fn with_registry(registry: Arc<ExpertRegistry>, config: &MoexConfig) -> Self {
        let monitor = HealthMonitor::new(Arc::clone(&registry), &config.monitor);
        Self {
            registry,
            monitor,
            active: AtomicBool::new(false),
            total_requests: AtomicU64::new(0),
            last_request_time: RwLock::new(None),
        }
    }

    /// Shared registry handle (for runtime registration and lookups).
    #[must_use]
    pub fn registry(&self) -> &Arc<ExpertRegistry> {
        &self.registry
    }

    /// The owned health monitor.
    #[must_use]
    pub fn monitor(&self) -> &HealthMonitor {
        &self.monitor
    }

    /// Whether `activate()` has run (and `shutdown()` has not).
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Activate the framework: start health monitoring, probe every expert,
    /// mark active. Diagnostics never fail the activation.
    pub async fn activate(&self) -> SystemStatus {
        info!("⚡ Activating MOEX framework");

        self.monitor.start().await;
        self.run_diagnostics().await;
        self.active.store(true, Ordering::SeqCst);

        info!("✅ MOEX framework activated");
        self.get_system_status().await
    }

    /// One-shot diagnostic pass: score every expert with a fixed probe.
    async fn run_diagnostics(&self) {
        info!("🔍 Running expert diagnostics");

        let handles = self.registry.get_all_experts().await;
        let probes = handles.iter().map(|handle| async move {
            let score = handle.confidence_score(defaults::DIAGNOSTIC_PROBE).await;
            (handle.name().to_string(), score)
        });

        for (expert, probe_score) in join_all(probes).await {
            info!(expert = %expert, probe_score, "Diagnostic probe complete");
        }
    }

    /// Dispatch one request to the best-scoring expert.
    pub async fn process_request(&self, prompt: &str) -> Result<ExpertResult, DispatchError> {
        if !self.is_active() {
            return Err(DispatchError::NotActivated);
        }

        // Bookkeeping happens before scoring, so a failed request still counts.
        let request_number = self.total_requests.fetch_add(1, Ordering::SeqCst) + 1;
        let started = Instant::now();
        *self.last_request_time.write().await = Some(Utc::now());

        info!(
            request = request_number,
            prompt = %preview(prompt, defaults::PROMPT_LOG_PREVIEW_CHARS),
            "⚡ Processing request"
        );

        let handles = self.registry.get_all_experts().await;
        let scores = score_experts(&handles, prompt).await;

        // Strict-maximum selection: first-registered wins exact ties.
        let mut best: Option<(usize, f64)> = None;
        for (index, (_, score)) in scores.iter().enumerate() {
            let replace = match best {
                Some((_, best_score)) => *score > best_score,
                None => true,
            };
            if replace {
                best = Some((index, *score));
            }
        }
        let Some((winner_index, winner_score)) = best else {
            return Err(DispatchError::NoExpertAvailable);
        };
        let winner = &handles[winner_index];

        info!(expert = %winner.name(), confidence = winner_score, "🎯 Expert selected");

        let mut result = match winner.process(prompt).await {
            Ok(result) => result,
            Err(err) => {
                error!(
                    expert = %winner.name(),
                    error = %err,
                    "❌ Expert processing failed — falling back to echo"
                );
                // Fallback responses are returned as-is, without metadata.
                return match self.registry.get_expert(ECHO_EXPERT_NAME).await {
                    Some(echo) => echo.process(prompt).await.map_err(DispatchError::from),
                    None => Err(err.into()),
                };
            }
        };

        result.metadata = Some(RequestMetadata {
            request_id: generate_request_id(),
            timestamp: Utc::now(),
            processing_time_ms: started.elapsed().as_millis() as u64,
            expert_scores: scores
                .into_iter()
                .map(|(expert, score)| ExpertScore { expert, score })
                .collect(),
            system_health: self.monitor.health_summary().await,
        });

        Ok(result)
    }

    /// Direct query to a named expert, bypassing scoring and fallback.
    pub async fn process_with(&self, name: &str, prompt: &str) -> Result<ExpertResult, DispatchError> {
        if !self.is_active() {
            return Err(DispatchError::NotActivated);
        }
        let handle = self
            .registry
            .get_expert(name)
            .await
            .ok_or_else(|| DispatchError::UnknownExpert(name.to_string()))?;
        Ok(handle.process(prompt).await?)
    }

    /// Full framework status snapshot.
    pub async fn get_system_status(&self) -> SystemStatus {
        SystemStatus {
            active: self.is_active(),
            total_requests: self.total_requests.load(Ordering::SeqCst),
            last_request_time: *self.last_request_time.read().await,
            experts_registered: self.registry.len().await,
            expert_health: self.registry.health_report().await,
            health_monitor: self.monitor.status().await,
        }
    }

    /// Stop the health monitor and deactivate.
    pub async fn shutdown(&self) {
        info!("⚡ Shutting down MOEX framework");
        self.monitor.stop().await;
        self.active.store(false, Ordering::SeqCst);
        info!("✅ MOEX framework shutdown complete");
    }
}

/// Score all experts concurrently; the handle absorbs per-expert failures
/// to 0, so the vector always has one entry per registered expert.
async fn score_experts(handles: &[Arc<ExpertHandle>], prompt: &str) -> Vec<(String, f64)> {
    join_all(handles.iter().map(|handle| async move {
        (
            handle.name().to_string(),
            handle.confidence_score(prompt).await,
        )
    }))
    .await
}

/// `moex_<epoch-ms>_<random-suffix>` request identifier.
fn generate_request_id() -> String {
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..defaults::REQUEST_ID_SUFFIX_LEN)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();
    format!("moex_{}_{}", Utc::now().timestamp_millis(), suffix)
}

/// First `max_chars` characters of a prompt for log lines.
fn preview(prompt: &str, max_chars: usize) -> String {
    if prompt.chars().count() <= max_chars {
        prompt.to_string()
    } else {
        let head: String = prompt.chars().take(max_chars).collect();
        format!("{head}...")
    }
}

// ============================================================================
// Tests
// ============================================================================
