//! Run control: interrupt flag and dashboard stop signal shared across tasks.
//!
//! An interrupt is advisory. The worker pool stops dispatching new jobs and
//! no further retry pass starts, but external processes already running are
//! left alone and may finish (or keep a partial file) on their own.

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

#[derive(Debug, Default)]
pub struct RunControl {
    interrupted: AtomicBool,
    dashboard_stopped: AtomicBool,
    wake: Notify,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Operator interrupt (Ctrl-C). Also stops the dashboard.
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
        self.stop_dashboard();
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Ask the dashboard loop to render its final summary and exit.
    pub fn stop_dashboard(&self) {
        self.dashboard_stopped.store(true, Ordering::SeqCst);
        self.wake.notify_waiters();
    }

    pub fn is_dashboard_stopped(&self) -> bool {
        self.dashboard_stopped.load(Ordering::SeqCst)
    }

    /// Resolves once the dashboard has been told to stop.
    pub async fn dashboard_stop_requested(&self) {
        loop {
            let notified = self.wake.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_dashboard_stopped() {
                return;
            }
            notified.await;
        }
    }

    /// Resolves once an interrupt has been requested.
    pub async fn interrupted(&self) {
        loop {
            let notified = self.wake.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_interrupted() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn interrupt_stops_dashboard() {
        let c = RunControl::new();
        assert!(!c.is_interrupted());
        c.interrupt();
        assert!(c.is_interrupted());
        assert!(c.is_dashboard_stopped());
    }

    #[test]
    fn stop_dashboard_is_not_an_interrupt() {
        let c = RunControl::new();
        c.stop_dashboard();
        assert!(c.is_dashboard_stopped());
        assert!(!c.is_interrupted());
    }

    #[tokio::test]
    async fn waiters_wake_on_signal() {
        let c = Arc::new(RunControl::new());
        let waiter = {
            let c = Arc::clone(&c);
            tokio::spawn(async move { c.interrupted().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        c.interrupt();
        tokio::time::timeout(Duration::from_secs(2), waiter)
            .await
            .expect("waiter woke")
            .unwrap();
        // Already-set flag resolves immediately.
        tokio::time::timeout(Duration::from_millis(100), c.dashboard_stop_requested())
            .await
            .expect("resolves immediately");
    }
}
