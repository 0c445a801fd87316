//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! All fields are cheap to clone (`Arc`s or handles), so the state can
//! be moved into spawned coaching tasks.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::coach::CoachService;
use crate::config::AppConfig;
use crate::repositories::HabitRepository;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Entry log and profile
    pub repo: Arc<HabitRepository>,
    /// Coaching collaborator with fallbacks applied
    pub coach: CoachService,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Prometheus exporter, when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create a new application state
    pub fn new(repo: Arc<HabitRepository>, coach: CoachService, config: AppConfig) -> Self {
        Self {
            repo,
            coach,
            config: Arc::new(config),
            metrics: None,
        }
    }

    /// Attach the Prometheus handle rendered by `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    #[inline]
    pub fn repo(&self) -> &HabitRepository {
        &self.repo
    }

    #[inline]
    pub fn coach(&self) -> &CoachService {
        &self.coach
    }

    /// Current time in the configured local offset
    pub fn now(&self) -> DateTime<FixedOffset> {
        self.config.clock.now()
    }
}
