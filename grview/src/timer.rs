//! Background refresh timer.
//!
//! Wakes on a short fixed cadence and hands a [`Command::Tick`] to the event
//! loop. It never touches application state itself; whether a tick actually
//! polls is decided by [`App::dispatch`](crate::app::App::dispatch) on the
//! event-loop thread.
//!
//! The channel is bounded to [`TICK_BACKLOG`] and ticks are sent with
//! `try_send`, so ticks never pile up behind a slow poll.

use std::time::Duration;

use crossbeam_channel::{Sender, TrySendError};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::app::Command;

/// How often the timer wakes to check whether a refresh is due
pub const TIMER_CADENCE: Duration = Duration::from_millis(500);

/// Capacity of the tick channel; a pending tick already covers later ones
pub const TICK_BACKLOG: usize = 1;

/// Running tick task. Dropping it stops the ticks.
pub struct RefreshTimer {
    task: JoinHandle<()>,
}

impl RefreshTimer {
    /// Spawn the tick task on `runtime`.
    ///
    /// `commands` should be bounded to [`TICK_BACKLOG`]. A tick that finds the
    /// channel full is dropped. The task ends on its own once the receiving
    /// side is gone.
    #[must_use]
    pub fn start(runtime: &Handle, commands: Sender<Command>, cadence: Duration) -> Self {
        let task = runtime.spawn(async move {
            let mut ticker = tokio::time::interval(cadence);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match commands.try_send(Command::Tick) {
                    Ok(()) | Err(TrySendError::Full(_)) => {}
                    Err(TrySendError::Disconnected(_)) => break,
                }
            }
        });
        log::trace!("refresh timer started ({cadence:?})");
        Self { task }
    }

    pub fn stop(self) {
        drop(self);
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        self.task.abort();
        log::trace!("refresh timer stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{bounded, RecvTimeoutError};

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_timer_ticks_until_dropped() {
        let (tx, rx) = bounded(TICK_BACKLOG);
        let timer = RefreshTimer::start(&Handle::current(), tx, Duration::from_millis(20));

        let first = tokio::task::spawn_blocking({
            let rx = rx.clone();
            move || rx.recv_timeout(Duration::from_secs(2))
        })
        .await
        .unwrap();
        assert_eq!(first, Ok(Command::Tick));
        assert!(timer.is_running());

        timer.stop();

        // Aborting the task drops the only sender
        let end = tokio::task::spawn_blocking(move || loop {
            match rx.recv_timeout(Duration::from_secs(2)) {
                Ok(_) => continue,
                Err(e) => break e,
            }
        })
        .await
        .unwrap();
        assert_eq!(end, RecvTimeoutError::Disconnected);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_timer_exits_when_receiver_dropped() {
        let (tx, rx) = bounded(TICK_BACKLOG);
        let timer = RefreshTimer::start(&Handle::current(), tx, Duration::from_millis(10));
        drop(rx);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!timer.is_running());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_ticks_do_not_pile_up_while_unread() {
        let (tx, rx) = bounded(TICK_BACKLOG);
        let timer = RefreshTimer::start(&Handle::current(), tx, Duration::from_millis(5));

        // Dozens of cadences pass without the receiver reading
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(timer.is_running());
        assert_eq!(rx.len(), 1);
        assert_eq!(rx.try_recv(), Ok(Command::Tick));
    }
}
