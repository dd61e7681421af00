//! Pluggable expert registry.
//!
//! Holds every registered expert behind its [`ExpertHandle`], preserving
//! registration order (the dispatch tie-break), plus a category index keyed
//! by the first word of each specialty. The Echo Chamber fallback can never
//! be unregistered.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::BreakerConfig;
use crate::experts::{self, Expert, ExpertHandle, ECHO_EXPERT_NAME};
use crate::types::ExpertHealthReport;

/// Error type for registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("cannot unregister fallback expert \"Echo Chamber\"")]
    ReservedFallback,
}

/// Registration-ordered store plus the derived category index.
struct RegistryInner {
    experts: Vec<Arc<ExpertHandle>>,
    categories: HashMap<String, Vec<String>>,
}

/// Expert registry. Interior lock so runtime registration can coexist with
/// dispatch passes; a dispatch snapshots the handle list at scoring time.
pub struct ExpertRegistry {
    breaker_config: BreakerConfig,
    inner: RwLock<RegistryInner>,
}

impl ExpertRegistry {
    /// Empty registry. Most callers want [`Self::with_default_experts`].
    #[must_use]
    pub fn new(breaker_config: BreakerConfig) -> Self {
        Self {
            breaker_config,
            inner: RwLock::new(RegistryInner {
                experts: Vec::new(),
                categories: HashMap::new(),
            }),
        }
    }

    /// Registry pre-loaded with the default expert set (Echo Chamber last).
    pub async fn with_default_experts(breaker_config: BreakerConfig) -> Self {
        let registry = Self::new(breaker_config);
        for expert in experts::default_experts() {
            registry.register(expert).await;
        }
        registry
    }

    /// Register an expert, wrapping it with a fresh circuit breaker.
    ///
    /// Re-registering an existing name replaces the expert in place,
    /// keeping its registration position.
    pub async fn register(&self, expert: Box<dyn Expert>) {
        let handle = Arc::new(ExpertHandle::new(expert, &self.breaker_config));
        let name = handle.name().to_string();
        let category = category_of(handle.specialty());

        let mut inner = self.inner.write().await;
        if let Some(position) = inner.experts.iter().position(|h| h.name() == name) {
            inner.experts[position] = handle;
        } else {
            inner.experts.push(handle);
        }
        let bucket = inner.categories.entry(category.clone()).or_default();
        if !bucket.iter().any(|n| n == &name) {
            bucket.push(name.clone());
        }

        info!(expert = %name, category = %category, "✅ Expert registered");
    }

    /// Unregister an expert by name.
    ///
    /// Fails for the reserved Echo Chamber fallback; unknown names are a
    /// no-op. The expert is removed from its category bucket as well.
    pub async fn unregister(&self, name: &str) -> Result<(), RegistryError> {
        if name == ECHO_EXPERT_NAME {
            return Err(RegistryError::ReservedFallback);
        }

        let mut inner = self.inner.write().await;
        inner.experts.retain(|h| h.name() != name);
        for bucket in inner.categories.values_mut() {
            bucket.retain(|n| n != name);
        }
        inner.categories.retain(|_, bucket| !bucket.is_empty());

        warn!(expert = %name, "🗑️ Expert unregistered");
        Ok(())
    }

    /// Look up an expert by exact name.
    pub async fn get_expert(&self, name: &str) -> Option<Arc<ExpertHandle>> {
        self.inner
            .read()
            .await
            .experts
            .iter()
            .find(|h| h.name() == name)
            .cloned()
    }

    /// All registered experts, in registration order.
    pub async fn get_all_experts(&self) -> Vec<Arc<ExpertHandle>> {
        self.inner.read().await.experts.clone()
    }

    /// Experts whose specialty starts with `category` (case-insensitive).
    pub async fn get_experts_by_category(&self, category: &str) -> Vec<Arc<ExpertHandle>> {
        let inner = self.inner.read().await;
        let Some(names) = inner.categories.get(&category.to_lowercase()) else {
            return Vec::new();
        };
        names
            .iter()
            .filter_map(|name| inner.experts.iter().find(|h| h.name() == name).cloned())
            .collect()
    }

    /// Number of registered experts.
    pub async fn len(&self) -> usize {
        self.inner.read().await.experts.len()
    }

    /// Whether the registry is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.experts.is_empty()
    }

    /// Health snapshot of every expert, in registration order.
    pub async fn health_report(&self) -> Vec<ExpertHealthReport> {
        let handles = self.get_all_experts().await;
        let mut reports = Vec::with_capacity(handles.len());
        for handle in &handles {
            reports.push(handle.health_report().await);
        }
        reports
    }
}

/// Registry category: first word of the specialty, lower-cased.
fn category_of(specialty: &str) -> String {
    specialty
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_lowercase()
}

// ============================================================================
// Tests
// ============================================================================
