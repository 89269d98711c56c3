//! Wall-clock driver for the countdown.
//!
//! One repeating one-second interval ticks the engine while the timer is
//! running. The interval lives inside `drive`, so returning for any reason
//! drops it and no further ticks can fire.

use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

use super::TimerState;
use crate::engine::{GardenEngine, TickOutcome};

/// Tick `engine` once per second until the timer stops running or
/// `shutdown` resolves. Shutdown abandons the current interval.
///
/// Returns the last tick outcome, or [`TickOutcome::Inactive`] when the
/// timer was not running or was abandoned.
pub async fn drive<F, T>(engine: &mut GardenEngine, shutdown: F, mut on_tick: T) -> TickOutcome
where
    F: Future<Output = ()>,
    T: FnMut(&TickOutcome),
{
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick resolves immediately.
    interval.tick().await;
    tokio::pin!(shutdown);

    let mut last = TickOutcome::Inactive;
    while engine.timer().state() == TimerState::Running {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::debug!(remaining = engine.timer().remaining_secs(), "countdown interrupted");
                engine.reset_focus();
                return TickOutcome::Inactive;
            }
            _ = interval.tick() => {
                last = engine.tick();
                on_tick(&last);
            }
        }
    }
    engine.persist();
    last
}
