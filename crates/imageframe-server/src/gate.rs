//! Single global cooldown gate for the run trigger.
//!
//! The gate remembers when it last let a run through. A new run is accepted
//! only once the cooldown has fully elapsed since then; rejected attempts
//! leave the timestamp alone. The timestamp is taken before the run starts,
//! so a slow run still blocks new ones for the whole window, but nothing
//! prevents a second run from starting once the window is over.
//!
//! The gate is per process: several instances behind a balancer each keep
//! their own window.

use std::sync::Mutex;
use std::time::Duration;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tokio::time::Instant;

/// Body returned while the gate is cooling down.
pub const TOO_SOON_MESSAGE: &str = "Too soon. Please wait before running again.";

/// Observable state of the gate at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    Cooling { remaining: Duration },
}

/// A trigger arrived inside the cooldown window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Too soon. Please wait before running again.")]
pub struct TooSoon {
    /// Time left until the gate opens again.
    pub retry_after: Duration,
}

impl IntoResponse for TooSoon {
    fn into_response(self) -> Response {
        let mut response = (StatusCode::TOO_MANY_REQUESTS, TOO_SOON_MESSAGE).into_response();
        let secs = self.retry_after.as_secs() + u64::from(self.retry_after.subsec_nanos() > 0);
        if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        response
    }
}

#[derive(Debug)]
pub struct CooldownGate {
    cooldown: Duration,
    last_run_at: Mutex<Option<Instant>>,
}

impl CooldownGate {
    /// Create a gate that has never run.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_run_at: Mutex::new(None),
        }
    }

    /// Try to pass the gate now.
    pub fn try_acquire(&self) -> Result<Instant, TooSoon> {
        self.try_acquire_at(Instant::now())
    }

    /// Try to pass the gate at `now`.
    ///
    /// On success the gate records `now` as the last run and returns it.
    pub fn try_acquire_at(&self, now: Instant) -> Result<Instant, TooSoon> {
        let mut last_run_at = self
            .last_run_at
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(remaining) = self.remaining(*last_run_at, now) {
            return Err(TooSoon {
                retry_after: remaining,
            });
        }

        *last_run_at = Some(now);
        Ok(now)
    }

    /// Instant of the last accepted trigger, `None` if it never ran.
    pub fn last_run_at(&self) -> Option<Instant> {
        *self
            .last_run_at
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state_at(&self, now: Instant) -> GateState {
        match self.remaining(self.last_run_at(), now) {
            Some(remaining) => GateState::Cooling { remaining },
            None => GateState::Idle,
        }
    }

    /// Time left in the window, `None` once it has elapsed.
    fn remaining(&self, last_run_at: Option<Instant>, now: Instant) -> Option<Duration> {
        let elapsed = now.saturating_duration_since(last_run_at?);
        if elapsed < self.cooldown {
            Some(self.cooldown - elapsed)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOLDOWN: Duration = Duration::from_secs(30);

    #[test]
    fn test_first_trigger_accepted() {
        let gate = CooldownGate::new(COOLDOWN);
        let now = Instant::now();

        assert_eq!(gate.state_at(now), GateState::Idle);
        assert_eq!(gate.try_acquire_at(now), Ok(now));
        assert_eq!(gate.last_run_at(), Some(now));
    }

    #[test]
    fn test_trigger_inside_window_rejected_without_update() {
        let gate = CooldownGate::new(COOLDOWN);
        let t1 = Instant::now();
        gate.try_acquire_at(t1).unwrap();

        let t2 = t1 + Duration::from_secs(5);
        let err = gate.try_acquire_at(t2).unwrap_err();

        assert_eq!(err.retry_after, Duration::from_secs(25));
        assert_eq!(gate.last_run_at(), Some(t1));
    }

    #[test]
    fn test_trigger_at_exact_window_accepted() {
        let gate = CooldownGate::new(COOLDOWN);
        let t1 = Instant::now();
        gate.try_acquire_at(t1).unwrap();

        let t2 = t1 + COOLDOWN;
        assert_eq!(gate.try_acquire_at(t2), Ok(t2));
        assert_eq!(gate.last_run_at(), Some(t2));
    }

    #[test]
    fn test_rejections_do_not_extend_window() {
        let gate = CooldownGate::new(COOLDOWN);
        let t1 = Instant::now();
        gate.try_acquire_at(t1).unwrap();

        for secs in [1, 10, 29] {
            assert!(gate.try_acquire_at(t1 + Duration::from_secs(secs)).is_err());
        }
        assert!(gate.try_acquire_at(t1 + Duration::from_secs(30)).is_ok());
    }

    #[test]
    fn test_state_transitions() {
        let gate = CooldownGate::new(COOLDOWN);
        let t1 = Instant::now();
        gate.try_acquire_at(t1).unwrap();

        assert_eq!(
            gate.state_at(t1 + Duration::from_secs(12)),
            GateState::Cooling {
                remaining: Duration::from_secs(18)
            }
        );
        assert_eq!(gate.state_at(t1 + Duration::from_secs(31)), GateState::Idle);
    }

    #[test]
    fn test_zero_cooldown_always_accepts() {
        let gate = CooldownGate::new(Duration::ZERO);
        let now = Instant::now();
        assert!(gate.try_acquire_at(now).is_ok());
        assert!(gate.try_acquire_at(now).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_reopens_with_clock() {
        let gate = CooldownGate::new(COOLDOWN);
        gate.try_acquire().unwrap();

        tokio::time::advance(Duration::from_secs(29)).await;
        assert!(gate.try_acquire().is_err());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(gate.try_acquire().is_ok());
    }

    #[test]
    fn test_too_soon_response() {
        let response = TooSoon {
            retry_after: Duration::from_millis(4_500),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER).unwrap(),
            "5"
        );
    }
}
