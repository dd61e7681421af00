//! MOEX: Multi-Objective Experience expert routing
//!
//! Routes free-text requests to the best-scoring expert from a pluggable
//! registry, with per-expert circuit breakers and background health
//! monitoring.
//!
//! ## Architecture
//!
//! - **Experts**: trait-based handlers (DNA, Bug Hunter, Terminal, Echo),
//!   each scoring prompts by keyword and producing a deterministic canned
//!   transformation
//! - **Circuit Breaker**: per-expert failure gate with a fixed threshold and
//!   fixed recovery timeout
//! - **Registry**: registration-ordered expert store with a category index;
//!   the Echo Chamber fallback is irremovable
//! - **Health Monitor**: periodic snapshots with a bounded history
//! - **Dispatch Framework**: concurrent scoring, strict-max selection, echo
//!   fallback, request metadata

pub mod api;
pub mod breaker;
pub mod config;
pub mod experts;
pub mod framework;
pub mod monitor;
pub mod registry;
pub mod types;

// Re-export configuration
pub use config::MoexConfig;

// Re-export the dispatch core
pub use framework::{DispatchError, MoexFramework};

// Re-export expert machinery
pub use experts::{
    default_experts, BugHunterExpert, DnaExpert, EchoExpert, Expert, ExpertError, ExpertHandle,
    TerminalExpert, ECHO_EXPERT_NAME,
};

// Re-export supporting components
pub use breaker::CircuitBreaker;
pub use monitor::HealthMonitor;
pub use registry::{ExpertRegistry, RegistryError};

// Re-export commonly used types
pub use types::{
    BreakerStatus, CircuitState, ExpertHealthReport, ExpertResult, ExpertScore, HealthReport,
    HealthStatus, HealthSummary, MonitorStatus, OverallHealth, RequestMetadata, ResultDetail,
    SystemStatus,
};
