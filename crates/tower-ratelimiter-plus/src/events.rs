use std::time::{Duration, Instant};
use tower_resilience_core::events::ResilienceEvent;

/// Events emitted by the rate limiter middleware.
#[derive(Debug, Clone)]
pub enum RateLimiterEvent {
    /// A permit was successfully acquired.
    PermitAcquired {
        pattern_name: String,
        timestamp: Instant,
        wait_duration: Duration,
    },
    /// A request was rejected due to rate limit.
    PermitRejected {
        pattern_name: String,
        timestamp: Instant,
        timeout_duration: Duration,
    },
    /// Permits were refreshed.
    PermitsRefreshed {
        pattern_name: String,
        timestamp: Instant,
        available_permits: usize,
    },
}

impl ResilienceEvent for RateLimiterEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RateLimiterEvent::PermitAcquired { .. } => "PermitAcquired",
            RateLimiterEvent::PermitRejected { .. } => "PermitRejected",
            RateLimiterEvent::PermitsRefreshed { .. } => "PermitsRefreshed",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            RateLimiterEvent::PermitAcquired { timestamp, .. } => *timestamp,
            RateLimiterEvent::PermitRejected { timestamp, .. } => *timestamp,
            RateLimiterEvent::PermitsRefreshed { timestamp, .. } => *timestamp,
        }
    }

    fn pattern_name(&self) -> &str {
        match self {
            RateLimiterEvent::PermitAcquired { pattern_name, .. } => pattern_name,
            RateLimiterEvent::PermitRejected { pattern_name, .. } => pattern_name,
            RateLimiterEvent::PermitsRefreshed { pattern_name, .. } => pattern_name,
        }
    }
}
