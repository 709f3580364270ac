//! Health check integration for proactive circuit breaker control.
//!
//! This module provides `HealthTriggerable` implementations that allow
//! health check systems to proactively open or close the circuit breaker
//! based on external health signals.

use crate::{CircuitBreaker, CircuitBreakerWithFallback};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_resilience_core::HealthTriggerable;

use crate::circuit::Circuit;
use crate::config::CircuitBreakerConfig;

/// Internal helper to implement triggering on circuit state.
fn trigger_unhealthy_impl<C>(circuit: Arc<Mutex<Circuit>>, config: Arc<CircuitBreakerConfig<C>>)
where
    C: Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut circuit = circuit.lock().await;
        circuit.force_open(&config);
    });
}

/// Internal helper to implement triggering on circuit state.
fn trigger_healthy_impl<C>(circuit: Arc<Mutex<Circuit>>, config: Arc<CircuitBreakerConfig<C>>)
where
    C: Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut circuit = circuit.lock().await;
        circuit.force_closed(&config);
    });
}

impl<S, C> HealthTriggerable for CircuitBreaker<S, C>
where
    S: Send + Sync + 'static,
    C: Send + Sync + 'static,
{
    fn trigger_unhealthy(&self) {
        trigger_unhealthy_impl(Arc::clone(&self.circuit), Arc::clone(&self.config));
    }

    fn trigger_healthy(&self) {
        trigger_healthy_impl(Arc::clone(&self.circuit), Arc::clone(&self.config));
    }
}

impl<S, C, Req, Res, Err> HealthTriggerable for CircuitBreakerWithFallback<S, C, Req, Res, Err>
where
    S: Send + Sync + 'static,
    C: Send + Sync + 'static,
    Req: Send + Sync + 'static,
    Res: Send + Sync + 'static,
    Err: Send + Sync + 'static,
{
    fn trigger_unhealthy(&self) {
        trigger_unhealthy_impl(Arc::clone(&self.circuit), Arc::clone(&self.config));
    }

    fn trigger_healthy(&self) {
        trigger_healthy_impl(Arc::clone(&self.circuit), Arc::clone(&self.config));
    }
}
