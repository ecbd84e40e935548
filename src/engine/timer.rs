//! Single-slot cancelable state timer.
//!
//! Each game instance owns exactly one timer slot. Starting a countdown
//! replaces any live one: the previous task is aborted and a generation
//! counter is bumped, so a callback from a superseded timer can always be
//! told apart from the current one. The owner re-checks the generation
//! under its instance lock before acting, which closes the race where a
//! task fires after its replacement was armed but before the abort landed.

use std::time::Duration;

use tokio::task::JoinHandle;

/// A single-slot countdown bound to the current state.
#[derive(Debug, Default)]
pub struct StateTimer {
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

impl StateTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer, superseding any running countdown.
    ///
    /// `on_expire` receives the generation this countdown was armed with;
    /// the owner must validate it with [`StateTimer::is_current`] before
    /// acting. Must be called from within a tokio runtime.
    pub fn start(
        &mut self,
        duration: Duration,
        on_expire: impl FnOnce(u64) + Send + 'static,
    ) -> u64 {
        self.cancel();
        let generation = self.generation;
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            on_expire(generation);
        }));
        generation
    }

    /// Cancel any running countdown. The expiry callback for it will
    /// either never run or fail the generation check.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.generation += 1;
    }

    /// Whether `generation` is the live countdown.
    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        self.handle.is_some() && self.generation == generation
    }
}

impl Drop for StateTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_fires_once() {
        let fired = Arc::new(AtomicU64::new(0));
        let mut timer = StateTimer::new();
        let counter = Arc::clone(&fired);
        timer.start(Duration::from_millis(10), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_restart_supersedes() {
        let fired = Arc::new(AtomicU64::new(0));
        let mut timer = StateTimer::new();

        let counter = Arc::clone(&fired);
        let first = timer.start(Duration::from_millis(10), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let counter = Arc::clone(&fired);
        let second = timer.start(Duration::from_millis(20), move |_| {
            counter.fetch_add(10, Ordering::SeqCst);
        });

        assert!(!timer.is_current(first));
        assert!(timer.is_current(second));

        tokio::time::sleep(Duration::from_millis(80)).await;
        // Only the second countdown ran.
        assert_eq!(fired.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn test_cancel_suppresses_expiry() {
        let fired = Arc::new(AtomicU64::new(0));
        let mut timer = StateTimer::new();
        let counter = Arc::clone(&fired);
        let generation = timer.start(Duration::from_millis(10), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        timer.cancel();
        assert!(!timer.is_current(generation));

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
