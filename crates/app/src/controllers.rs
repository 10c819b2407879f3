//! Standalone polling controllers driving a single output pin.
//!
//! Each controller runs one loop: read an input, compare, write the pin,
//! sleep. Both stop when the shutdown channel flips to `true` and leave
//! their pin de-asserted.

pub mod climate;
pub mod irrigation;

pub use climate::{ClimateConfig, ClimateController};
pub use irrigation::{IrrigationConfig, IrrigationTimer};

use std::time::Duration;

use tokio::sync::watch;

/// Sleep for `duration` unless shutdown is requested first.
///
/// Returns `true` when the controller should stop. A dropped sender counts
/// as a shutdown request.
pub(crate) async fn sleep_or_shutdown(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow_and_update() {
        return true;
    }
    tokio::select! {
        changed = shutdown.changed() => changed.is_err() || *shutdown.borrow(),
        () = tokio::time::sleep(duration) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn should_sleep_full_duration_without_shutdown() {
        let (_tx, mut rx) = watch::channel(false);
        let before = tokio::time::Instant::now();
        assert!(!sleep_or_shutdown(Duration::from_secs(10), &mut rx).await);
        assert!(before.elapsed() >= Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn should_return_immediately_when_already_shut_down() {
        let (tx, mut rx) = watch::channel(false);
        tx.send(true).unwrap();
        let before = tokio::time::Instant::now();
        assert!(sleep_or_shutdown(Duration::from_secs(10), &mut rx).await);
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn should_treat_dropped_sender_as_shutdown() {
        let (tx, mut rx) = watch::channel(false);
        drop(tx);
        assert!(sleep_or_shutdown(Duration::from_secs(3600), &mut rx).await);
    }
}
