//! Health monitor — periodic snapshot of every expert's health.
//!
//! A background task samples the registry on a fixed interval, keeps a
//! bounded history of reports (oldest evicted first), and logs an alert
//! whenever any expert is classified FAILED. The task is owned by the
//! monitor and stopped through an explicit cancellation signal.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::MonitorConfig;
use crate::registry::ExpertRegistry;
use crate::types::{HealthReport, HealthStatus, HealthSummary, MonitorStatus};

/// Health monitor over a shared expert registry.
pub struct HealthMonitor {
    registry: Arc<ExpertRegistry>,
    check_interval: Duration,
    history_capacity: usize,
    history: Arc<RwLock<VecDeque<HealthReport>>>,
    running: AtomicBool,
    cancel: Mutex<Option<CancellationToken>>,
}

impl HealthMonitor {
    #[must_use]
    pub fn new(registry: Arc<ExpertRegistry>, config: &MonitorConfig) -> Self {
        Self {
            registry,
            check_interval: config.check_interval(),
            history_capacity: config.history_capacity,
            history: Arc::new(RwLock::new(VecDeque::new())),
            running: AtomicBool::new(false),
            cancel: Mutex::new(None),
        }
    }

    /// Start the periodic check task. No-op if already running.
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        info!(
            interval_ms = self.check_interval.as_millis() as u64,
            "🏥 Health monitor starting"
        );

        let token = CancellationToken::new();
        *self.cancel.lock().await = Some(token.clone());

        let registry = Arc::clone(&self.registry);
        let history = Arc::clone(&self.history);
        let capacity = self.history_capacity;
        let interval = self.check_interval;

        tokio::spawn(async move {
            // First tick lands one full interval after start, so the summary
            // reads NO_DATA until a check has actually run.
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    _ = ticker.tick() => check_cycle(&registry, &history, capacity).await,
                }
            }
        });
    }

    /// Stop the periodic task. No-op if not running.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(token) = self.cancel.lock().await.take() {
            token.cancel();
        }
        info!("🏥 Health monitor stopped");
    }

    /// Whether the periodic task is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Run one health check immediately, outside the periodic schedule.
    pub async fn check_now(&self) {
        check_cycle(&self.registry, &self.history, self.history_capacity).await;
    }

    /// Summary derived from the most recent report; NO_DATA before the
    /// first check.
    pub async fn health_summary(&self) -> HealthSummary {
        match self.history.read().await.back() {
            Some(report) => HealthSummary::from_report(report),
            None => HealthSummary::no_data(),
        }
    }

    /// Monitor runtime status, including the current summary.
    pub async fn status(&self) -> MonitorStatus {
        MonitorStatus {
            running: self.is_running(),
            check_interval_ms: self.check_interval.as_millis() as u64,
            history_length: self.history.read().await.len(),
            summary: self.health_summary().await,
        }
    }

    /// Full report history, oldest first.
    pub async fn history(&self) -> Vec<HealthReport> {
        self.history.read().await.iter().cloned().collect()
    }
}

/// Build one health report and append it to the bounded history.
async fn check_cycle(
    registry: &ExpertRegistry,
    history: &RwLock<VecDeque<HealthReport>>,
    capacity: usize,
) {
    let experts = registry.health_report().await;

    let mut report = HealthReport {
        timestamp: Utc::now(),
        total_experts: experts.len(),
        healthy_experts: 0,
        degraded_experts: 0,
        failed_experts: 0,
        experts,
    };
    for expert in &report.experts {
        match expert.health {
            HealthStatus::Healthy => report.healthy_experts += 1,
            HealthStatus::Degraded => report.degraded_experts += 1,
            HealthStatus::Failed => report.failed_experts += 1,
        }
    }

    if report.failed_experts > 0 {
        error!(
            failed = report.failed_experts,
            "🚨 Health alert: experts in FAILED state"
        );
    }

    let mut history = history.write().await;
    history.push_back(report);
    while history.len() > capacity {
        history.pop_front();
    }
}

// ============================================================================
// Tests
// ============================================================================
