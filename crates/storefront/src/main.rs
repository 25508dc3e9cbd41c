//! repX Storefront - JSON API for the repX gym-wear shop.
//!
//! Serves the catalog, per-shopper carts and Razorpay checkout. The browser
//! renders everything; this process only answers `/api/*` with JSON.
//!
//! # Architecture
//!
//! - Axum router from [`repx_storefront::app`]
//! - `repx-core` for cart, pricing and checkout rules
//! - tower-sessions cookie carrying only the shopper ID
//! - Cart snapshots on disk (`REPX_DATA_DIR`) or in memory
//! - Razorpay Checkout opened in the browser from server-built options
//!
//! # Environment
//!
//! See [`StorefrontConfig::from_env`]; `RUST_LOG` overrides the default log
//! filter.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::borrow::Cow;

use repx_storefront::config::StorefrontConfig;
use repx_storefront::state::AppState;
use sentry::integrations::tracing::{self as sentry_tracing, EventFilter};
use tracing::Level;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "repx_storefront=info,repx_core=info,tower_http=debug";

/// Start the Sentry client when a DSN is configured. The guard flushes
/// pending events on drop, so it has to outlive the server.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_deref()?;
    let options = sentry::ClientOptions {
        release: sentry::release_name!(),
        environment: config.sentry_environment.clone().map(Cow::Owned),
        sample_rate: config.sentry_sample_rate,
        traces_sample_rate: config.sentry_traces_sample_rate,
        attach_stacktrace: true,
        ..Default::default()
    };
    Some(sentry::init((dsn, options)))
}

/// Warnings and errors become Sentry events; info and debug become
/// breadcrumbs on whatever event follows.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> EventFilter {
    match *metadata.level() {
        Level::ERROR | Level::WARN => EventFilter::Event,
        Level::INFO | Level::DEBUG => EventFilter::Breadcrumb,
        Level::TRACE => EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let config = StorefrontConfig::from_env().expect("Invalid storefront configuration");

    // Sentry before the subscriber, so the tracing layer has a client to report to
    let sentry_guard = init_sentry(&config);
    init_tracing();
    if sentry_guard.is_some() {
        tracing::info!(
            environment = config.sentry_environment.as_deref().unwrap_or("default"),
            "Sentry enabled"
        );
    }

    if config.razorpay_key_id.is_none() {
        tracing::warn!("RAZORPAY_KEY_ID not set; checkout will run in demo mode");
    }
    if let Some(timeout) = config.checkout_timeout {
        tracing::info!(
            seconds = timeout.num_seconds(),
            "Unanswered checkouts can be restarted after timeout"
        );
    }

    let addr = config.socket_addr();
    let state = AppState::new(config).expect("Failed to load catalog");

    let app = repx_storefront::app(state)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind {addr}: {e}"));
    tracing::info!(%addr, "repX storefront listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Storefront stopped");
}

/// Resolve on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl-C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {},
        () = terminate => {},
    }

    tracing::info!("Shutting down; draining in-flight requests");
}
