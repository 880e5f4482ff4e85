//! Bounded readiness probing for a tenant's primary service.
//!
//! The wait loop inspects the container's run state, then issues an
//! in-container health check once it is running. The loop is bounded
//! by `max_attempts × interval` and aborts early when the caller's
//! [`CancellationToken`] fires, so an upstream request timeout never
//! leaks a blocked task.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::driver::{ContainerRuntime, ContainerState};

/// Tunable parameters for the readiness wait loop.
#[derive(Debug, Clone, Copy)]
pub struct ProbeConfig {
    /// Maximum number of inspect/health-check rounds.
    pub max_attempts: u32,
    /// Delay between rounds.
    pub interval: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval: Duration::from_secs(2),
        }
    }
}

/// Why a readiness wait ended without a passing health check.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// Every attempt was used up without a passing health check.
    #[error("service not ready after {attempts} attempts")]
    Timeout { attempts: u32 },

    /// The caller cancelled the wait.
    #[error("readiness wait cancelled")]
    Cancelled,
}

/// Wait until the container's service passes a health check.
///
/// Returns the number of attempts used on success. State-inspection and
/// health-check failures are retried until `config.max_attempts` is
/// exhausted; only cancellation ends the loop early.
pub async fn wait_until_ready(
    runtime: &dyn ContainerRuntime,
    container: &str,
    config: &ProbeConfig,
    cancel: &CancellationToken,
) -> Result<u32, ProbeError> {
    for attempt in 1..=config.max_attempts {
        if cancel.is_cancelled() {
            return Err(ProbeError::Cancelled);
        }

        match runtime.inspect_state(container).await {
            Ok(ContainerState::Running) => match runtime.health_check(container).await {
                Ok(()) => {
                    tracing::info!(container, attempt, "Service is ready");
                    return Ok(attempt);
                }
                Err(e) => {
                    tracing::debug!(
                        container,
                        attempt,
                        max_attempts = config.max_attempts,
                        error = %e,
                        "Health check failed, retrying",
                    );
                }
            },
            Ok(state) => {
                tracing::debug!(
                    container,
                    attempt,
                    max_attempts = config.max_attempts,
                    state = state.as_str(),
                    "Container not running yet",
                );
            }
            Err(e) => {
                tracing::debug!(
                    container,
                    attempt,
                    max_attempts = config.max_attempts,
                    error = %e,
                    "State inspection failed, retrying",
                );
            }
        }

        // Wait before the next attempt, respecting cancellation.
        tokio::select! {
            _ = cancel.cancelled() => return Err(ProbeError::Cancelled),
            _ = tokio::time::sleep(config.interval) => {}
        }
    }

    Err(ProbeError::Timeout {
        attempts: config.max_attempts,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
