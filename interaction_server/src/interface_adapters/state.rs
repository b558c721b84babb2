use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::ports::Clock;
use crate::use_cases::SessionContext;

// Shared state for the operator HTTP surface.
#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<SessionContext>,
}

// Wall-clock adapter used by the feature loops.
#[derive(Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}
