//! Observability hook for conversation requests.

use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use crate::lifecycle::OutcomeKind;

/// Points in a request's life that are reported to the observer.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    Submitted {
        request_id: Uuid,
        report_id: String,
        mode: &'static str,
        override_count: usize,
    },
    Responded {
        request_id: Uuid,
        elapsed: Duration,
        applied_prediction: bool,
    },
    Failed {
        request_id: Uuid,
        elapsed: Duration,
        kind: OutcomeKind,
    },
}

/// Receives lifecycle events. Must not block.
pub trait LifecycleObserver: Send + Sync {
    fn observe(&self, event: &LifecycleEvent);
}

/// Emits each event as a structured `tracing` record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl LifecycleObserver for TracingObserver {
    fn observe(&self, event: &LifecycleEvent) {
        match event {
            LifecycleEvent::Submitted {
                request_id,
                report_id,
                mode,
                override_count,
            } => info!(
                %request_id,
                %report_id,
                mode,
                override_count,
                "Conversation request submitted"
            ),
            LifecycleEvent::Responded {
                request_id,
                elapsed,
                applied_prediction,
            } => info!(
                %request_id,
                elapsed_ms = elapsed.as_millis() as u64,
                applied_prediction,
                "Conversation request answered"
            ),
            LifecycleEvent::Failed {
                request_id,
                elapsed,
                kind,
            } => warn!(
                %request_id,
                elapsed_ms = elapsed.as_millis() as u64,
                kind = ?kind,
                "Conversation request failed"
            ),
        }
    }
}

/// Discards events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl LifecycleObserver for NoopObserver {
    fn observe(&self, _event: &LifecycleEvent) {}
}
