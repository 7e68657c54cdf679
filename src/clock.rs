use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Source of the wall-clock time used for task timestamps and the pending window.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// "Friday, October 16, 2026"
pub fn format_date(date: &DateTime<Local>) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// "02:05:09 PM"
pub fn format_time(date: &DateTime<Local>) -> String {
    date.format("%I:%M:%S %p").to_string()
}

// Enough slack for a slow frame; older ticks are dropped by the interval.
const TICK_BUFFER: usize = 8;

/// Background task that refreshes the current time at a fixed interval.
///
/// The task lives as long as the `Ticker`. `stop` cancels it and waits for it
/// to finish; dropping the ticker aborts it. Ticks are only observable through
/// `next`, so none can be delivered once the ticker is gone.
pub struct Ticker {
    rx: mpsc::Receiver<DateTime<Local>>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Spawns the ticker on the current tokio runtime.
    pub fn start(period: Duration) -> Self {
        let (tx, rx) = mpsc::channel(TICK_BUFFER);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; the view already has a time.
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = interval.tick() => {
                        if tx.send(Local::now()).await.is_err() {
                            break;
                        }
                    }
                }
            }
            log::debug!("ticker stopped");
        });

        log::debug!("ticker started with period {:?}", period);
        Ticker {
            rx,
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Waits for the next tick. Returns `None` once the task has ended.
    pub async fn next(&mut self) -> Option<DateTime<Local>> {
        self.rx.recv().await
    }

    pub async fn stop(mut self) -> Result<()> {
        // Closing first unblocks a send stuck on a full channel.
        self.rx.close();
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.await.context("ticker task failed")?;
        }
        Ok(())
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
