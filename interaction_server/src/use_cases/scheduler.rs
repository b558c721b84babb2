use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::domain::errors::SessionError;
use crate::use_cases::context::{SessionContext, SessionStatus};

/// One periodic interaction loop.
#[async_trait]
pub trait Feature: Send + Sync {
    fn name(&self) -> &'static str;

    // Runs one poll-evaluate-act cycle. An error skips the rest of this tick only.
    async fn tick(&self, ctx: &SessionContext) -> Result<(), SessionError>;
}

/// Collects features with their periods, then spawns one ticker task per feature.
pub struct Scheduler {
    ctx: Arc<SessionContext>,
    features: Vec<(Arc<dyn Feature>, Duration)>,
    probe_interval: Option<Duration>,
}

impl Scheduler {
    pub fn new(ctx: Arc<SessionContext>) -> Self {
        Self {
            ctx,
            features: Vec::new(),
            probe_interval: None,
        }
    }

    pub fn register<F>(mut self, feature: F, period: Duration) -> Self
    where
        F: Feature + 'static,
    {
        self.features.push((Arc::new(feature), period));
        self
    }

    // Polls the session on its own loop and publishes Connected / Disconnected.
    pub fn with_connection_probe(mut self, interval: Duration) -> Self {
        self.probe_interval = Some(interval);
        self
    }

    pub fn spawn(self) -> SchedulerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut tasks = Vec::with_capacity(self.features.len() + 1);

        if let Some(interval) = self.probe_interval {
            tasks.push(tokio::spawn(connection_probe(
                self.ctx.clone(),
                interval,
                shutdown_rx.clone(),
            )));
        }

        for (feature, period) in self.features {
            info!(feature = feature.name(), period_ms = period.as_millis() as u64, "feature loop started");
            tasks.push(tokio::spawn(run_feature(
                self.ctx.clone(),
                feature,
                period,
                shutdown_rx.clone(),
            )));
        }

        SchedulerHandle { shutdown_tx, tasks }
    }
}

pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl SchedulerHandle {
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Signals every loop and waits for them to exit at their next wake-up.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "feature task ended abnormally");
            }
        }
    }
}

async fn run_feature(
    ctx: Arc<SessionContext>,
    feature: Arc<dyn Feature>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let status = ctx.subscribe_status();
    // Delay keeps iterations of one loop from overlapping or bursting after a slow round-trip.
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
                continue;
            }
            _ = interval.tick() => {}
        }

        if *status.borrow() != SessionStatus::Connected {
            continue;
        }

        if let Err(e) = feature.tick(&ctx).await {
            warn!(feature = feature.name(), error = %e, "tick skipped");
        }
    }

    info!(feature = feature.name(), "feature loop stopped");
}

async fn connection_probe(
    ctx: Arc<SessionContext>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
                continue;
            }
            _ = interval.tick() => {}
        }

        match ctx.source.list_actors().await {
            Ok(actors) => {
                if ctx.set_status(SessionStatus::Connected) {
                    info!("session connected");
                }
                ctx.forget_departed(&actors).await;
            }
            Err(e) => {
                if ctx.set_status(SessionStatus::Disconnected) {
                    warn!(error = %e, "session disconnected");
                }
            }
        }
    }
}
