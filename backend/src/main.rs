//! Habit Coach Backend
//!
//! A single-user habit log with an AI coach.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! - Routes: HTTP request handling and routing
//! - Services: Business logic and coaching orchestration
//! - Repositories: In-memory state over whole-record snapshots
//! - Storage: File, Redis or in-memory snapshot backends

use std::sync::Arc;

use anyhow::Result;
use habit_coach_backend::coach::{CoachService, CoachingCollaborator, DisabledCoach, GeminiCoach};
use habit_coach_backend::config::{self, AiConfig, StorageBackend};
use habit_coach_backend::repositories::{HabitRepository, SnapshotKeys};
use habit_coach_backend::{routes, state::AppState, storage};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use secrecy::Secret;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let config = config::AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() { "production" } else { "development" },
        "Starting Habit Coach Backend"
    );

    // Validate production configuration
    if config::AppConfig::is_production() {
        validate_production_config(&config)?;
    }

    // Open snapshot storage and load state
    info!(backend = ?config.storage.backend, "Opening storage...");
    let store = storage::open_store(&config.storage).await?;
    let keys = SnapshotKeys {
        entries: config.storage.entries_key.clone(),
        profile: config.storage.profile_key.clone(),
    };
    let repo = HabitRepository::load(store, keys, config.storage.seed_demo).await?;

    // Coaching collaborator
    let coach = CoachService::new(build_coach(&config.ai), config.ai.timeout());

    // Create application state
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let mut state = AppState::new(Arc::new(repo), coach, config);
    if let Some(handle) = install_metrics() {
        state = state.with_metrics(handle);
    }

    // Build application
    let app = routes::create_router(state);

    // Start server
    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Pick the coaching collaborator
///
/// Without an API key the app still runs; every coaching call answers
/// with a fallback message.
fn build_coach(ai: &AiConfig) -> Arc<dyn CoachingCollaborator> {
    match ai.api_key.as_deref().map(str::trim) {
        Some(key) if ai.enabled && !key.is_empty() => {
            info!(model = %ai.model, "AI coaching enabled");
            Arc::new(GeminiCoach::new(
                Secret::new(key.to_string()),
                ai.base_url.clone(),
                ai.model.clone(),
            ))
        }
        _ if ai.enabled => {
            warn!("AI coaching enabled but no API key configured. Fallback messages will be used.");
            Arc::new(DisabledCoach)
        }
        _ => {
            info!("AI coaching disabled");
            Arc::new(DisabledCoach)
        }
    }
}

/// Install the Prometheus recorder
///
/// Returns None if a recorder is already installed, leaving `/metrics` off.
fn install_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Failed to install metrics recorder: {}. /metrics will be disabled.", e);
            None
        }
    }
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "habit_coach_backend=info,tower_http=info".into()
        } else {
            "habit_coach_backend=debug,tower_http=debug".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Pretty logging for development
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Validate configuration for production deployment
fn validate_production_config(config: &config::AppConfig) -> Result<()> {
    let mut errors = Vec::new();

    // In-memory storage loses every entry on restart
    if config.storage.backend == StorageBackend::Memory {
        errors.push("Storage backend must be 'file' or 'redis' in production");
    }

    if config.ai.enabled && config.ai.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
        errors.push("AI coaching is enabled but HC__AI__API_KEY is not set");
    }

    if config.storage.backend == StorageBackend::Redis
        && (config.storage.redis_url.contains("localhost")
            || config.storage.redis_url.contains("127.0.0.1"))
    {
        warn!("Redis URL contains localhost - ensure this is intentional for production");
    }

    if config.storage.seed_demo {
        warn!("Demo seeding is enabled in production");
    }

    if !errors.is_empty() {
        for err in &errors {
            error!("Configuration error: {}", err);
        }
        anyhow::bail!("Invalid production configuration");
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
