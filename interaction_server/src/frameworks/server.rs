// Framework bootstrap for the interaction service runtime.

use crate::domain::ports::{AccessPolicy, AllowAll, AllowList};
use crate::frameworks::config;
use crate::interface_adapters::clients::BridgeClient;
use crate::interface_adapters::routes::app;
use crate::interface_adapters::state::{AppState, SystemClock};
use crate::use_cases::features::{
    ArcheryFeature, AutoForgeFeature, CombatFeature, DrinkingFeature, GestureFeature,
    RosterButtonFeature, SocialButtonFeature, StarlightFeature, StoneTeleportFeature,
    TavernFeature,
};
use crate::use_cases::{Scheduler, SchedulerHandle, SessionContext};

use std::net::SocketAddr;
use std::{io::Result, sync::Arc};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Starts every feature loop against `ctx` and serves the status surface on `listener`.
pub async fn run(listener: tokio::net::TcpListener, ctx: Arc<SessionContext>) -> Result<()> {
    let address = listener.local_addr()?;
    let scheduler = spawn_features(ctx.clone());

    let router = app(AppState { ctx });
    tracing::info!(%address, features = scheduler.task_count(), "listening");

    // Serve app and report errors rather than panicking
    let served = axum::serve(listener, router).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    });
    scheduler.shutdown().await;
    served
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let ctx = build_context()?;
    let address = SocketAddr::from(([127, 0, 0, 1], config::status_port()));

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener, ctx).await
}

/// Wires the bridge client, clock, access policy and tuning from the environment.
pub fn build_context() -> Result<Arc<SessionContext>> {
    let bridge_url = config::session_bridge_url();
    let timeout = config::session_request_timeout();
    let bridge = Arc::new(
        BridgeClient::new(bridge_url.clone(), timeout)
            .map_err(|e| std::io::Error::other(format!("failed to initialize bridge client: {e}")))?,
    );
    tracing::debug!(
        bridge_url = %bridge_url,
        request_timeout_ms = timeout.map(|t| t.as_millis() as u64),
        "session bridge configured"
    );

    let tuning = config::load_tuning().inspect_err(|e| {
        tracing::error!(error = %e, "failed to load tuning");
    })?;

    let allowed = config::allowed_actors();
    let access: Arc<dyn AccessPolicy> = if allowed.is_empty() {
        tracing::warn!("ALLOWED_ACTORS is empty; every actor is authorized");
        Arc::new(AllowAll)
    } else {
        tracing::info!(count = allowed.len(), "actor allow list loaded");
        Arc::new(AllowList::new(allowed))
    };

    Ok(Arc::new(SessionContext::new(
        bridge.clone(),
        bridge,
        Arc::new(SystemClock),
        access,
        tuning,
    )))
}

pub fn spawn_features(ctx: Arc<SessionContext>) -> SchedulerHandle {
    Scheduler::new(ctx)
        .with_connection_probe(config::PROBE_INTERVAL)
        .register(CombatFeature, config::COMBAT_PERIOD)
        .register(ArcheryFeature, config::ARCHERY_PERIOD)
        .register(StoneTeleportFeature, config::STONE_TELEPORT_PERIOD)
        .register(AutoForgeFeature, config::AUTO_FORGE_PERIOD)
        .register(TavernFeature, config::TAVERN_PERIOD)
        .register(StarlightFeature, config::STARLIGHT_PERIOD)
        .register(GestureFeature, config::GESTURE_PERIOD)
        .register(RosterButtonFeature, config::ROSTER_PERIOD)
        .register(SocialButtonFeature, config::SOCIAL_PERIOD)
        .register(DrinkingFeature, config::DRINKING_PERIOD)
        .spawn()
}
