//! Periodic player count monitoring.
//!
//! This module provides the [`AlertMonitor`] which polls a [`Probe`], runs each
//! count through [`MonitorState`] and sends an alert through a [`Notifier`] when
//! the state machine asks for it.

use std::{any::Any, panic::AssertUnwindSafe, sync::Arc, time::Duration};

use futures::FutureExt;
use log::{debug, error, info};
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::{
    commands::Commander,
    monitor::{
        Notifier,
        state::{MonitorState, Transition},
    },
    status::Probe,
};

/// Delay in seconds between the end of a cycle and the next probe.
const POLL_INTERVAL_SECS: u64 = 300; // 5 minutes
/// Delay in seconds before retrying after a cycle that panicked.
const RECOVERY_DELAY_SECS: u64 = 60; // 1 minute

/// Pauses applied by [`AlertMonitor::run`].
///
/// Both are fixed delays measured from the end of a cycle, so a slow probe or a
/// slow send stretches the effective period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorTimings {
    /// Pause after a successful cycle
    pub poll_interval: Duration,
    /// Pause after a cycle that panicked
    pub recovery_delay: Duration,
}

impl Default for MonitorTimings {
    fn default() -> Self {
        MonitorTimings {
            poll_interval: Duration::from_secs(POLL_INTERVAL_SECS),
            recovery_delay: Duration::from_secs(RECOVERY_DELAY_SECS),
        }
    }
}

/// Watches the player count of one server and alerts a room when it qualifies.
///
/// The monitor exclusively owns its [`MonitorState`]; nothing else reads or
/// writes it, so it is not behind a lock. The probe is shared with the command
/// handler through an `Arc`.
///
/// # Examples
///
/// ```no_run
/// let monitor = AlertMonitor::new(prober, notifier, 5, "play.example.com", MonitorTimings::default());
/// let cancel = CancellationToken::new();
/// let handle = tokio::spawn(monitor.run(cancel.clone()));
/// // ...
/// cancel.cancel();
/// handle.await?;
/// ```
pub struct AlertMonitor<P: Probe, N: Notifier> {
    /// Alert deduplication state
    state: MonitorState,
    /// Player count source
    prober: Arc<P>,
    /// Alert sink
    notifier: N,
    /// Minimum number of players that qualifies for an alert
    threshold: u32,
    /// Monitored server address, embedded in the alert
    server_address: String,
    /// Loop cadence
    timings: MonitorTimings,
}

impl<P: Probe, N: Notifier> AlertMonitor<P, N> {
    /// Create a new armed [AlertMonitor].
    ///
    /// # Arguments
    ///
    /// * `prober` - Shared player count source
    /// * `notifier` - Where alerts are delivered
    /// * `threshold` - Minimum number of players that qualifies for an alert
    /// * `server_address` - Address of the monitored server
    /// * `timings` - Poll interval and recovery delay
    pub fn new(
        prober: Arc<P>,
        notifier: N,
        threshold: u32,
        server_address: &str,
        timings: MonitorTimings,
    ) -> Self {
        AlertMonitor {
            state: MonitorState::new(),
            prober,
            notifier,
            threshold,
            server_address: server_address.to_owned(),
            timings,
        }
    }

    /// Runs one poll cycle: probe, apply the transition rule, notify if needed.
    ///
    /// The state transition is committed before the alert is sent. A failed
    /// delivery is logged and forgotten, it is not retried until the count
    /// changes again.
    pub async fn cycle(&mut self) -> Transition {
        let count = self.prober.probe().await;
        let transition = self.state.observe(count, self.threshold);

        match transition {
            Transition::Notify(count) => {
                info!(
                    "{} players online (threshold {}), sending alert",
                    count, self.threshold
                );
                self.notify(count).await;
            }
            Transition::Rearm => debug!(
                "{} players online, below threshold {}, alerting armed",
                count, self.threshold
            ),
            Transition::Suppress => debug!(
                "{} players online, already alerted at {}",
                count,
                self.state.last_alerted_count()
            ),
        }

        transition
    }

    async fn notify(&self, count: u32) {
        let body = Commander::get_alert_message(count, &self.server_address);

        match self.notifier.send_alert(&body).await {
            Ok(()) => info!("alert sent for {} players", count),
            Err(e) => error!("failed to deliver alert for {} players: {}", count, e),
        }
    }

    /// Polls until `cancel` fires.
    ///
    /// After a completed cycle the loop waits [`MonitorTimings::poll_interval`].
    /// A cycle that panics is logged and followed by
    /// [`MonitorTimings::recovery_delay`], the loop keeps going. Cancellation
    /// interrupts a cycle or a wait immediately and is the only way out.
    pub async fn run(mut self, cancel: CancellationToken) {
        let MonitorTimings {
            poll_interval,
            recovery_delay,
        } = self.timings;

        info!(
            "monitoring {} every {} seconds, alert threshold {} players",
            self.server_address,
            poll_interval.as_secs(),
            self.threshold
        );

        loop {
            let delay = tokio::select! {
                _ = cancel.cancelled() => break,
                result = AssertUnwindSafe(self.cycle()).catch_unwind() => match result {
                    Ok(_) => poll_interval,
                    Err(panic) => {
                        error!(
                            "monitoring cycle panicked: {}, retrying in {} seconds",
                            panic_message(panic.as_ref()),
                            recovery_delay.as_secs()
                        );
                        recovery_delay
                    }
                },
            };

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = time::sleep(delay) => {}
            }
        }

        info!("monitoring of {} stopped", self.server_address);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{
        monitor::{MockNotifier, NotifyError},
        status::MockProbe,
    };

    const ADDRESS: &str = "play.example.com";

    struct PanickingNotifier;

    impl Notifier for PanickingNotifier {
        async fn send_alert(&self, _body: &str) -> Result<(), NotifyError> {
            panic!("matrix client exploded")
        }
    }

    /// Probe returning `counts` in order and recording when each call happened.
    fn create_timed_probe(counts: Vec<u32>) -> (Arc<MockProbe>, Arc<Mutex<Vec<u64>>>) {
        let start = time::Instant::now();
        let probed_at = Arc::new(Mutex::new(Vec::new()));
        let probed_at_clone = Arc::clone(&probed_at);
        let expected = counts.len();
        let counts = Mutex::new(counts.into_iter());

        let mut mock_probe = MockProbe::new();
        mock_probe.expect_probe().times(expected).returning(move || {
            probed_at_clone
                .lock()
                .unwrap()
                .push((time::Instant::now() - start).as_secs());
            counts.lock().unwrap().next().unwrap()
        });
        (Arc::new(mock_probe), probed_at)
    }

    fn create_probe(counts: Vec<u32>) -> Arc<MockProbe> {
        let expected = counts.len();
        let counts = Mutex::new(counts.into_iter());
        let mut mock_probe = MockProbe::new();
        mock_probe
            .expect_probe()
            .times(expected)
            .returning(move || counts.lock().unwrap().next().unwrap());
        Arc::new(mock_probe)
    }

    fn create_recording_notifier() -> (MockNotifier, Arc<Mutex<Vec<String>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let mut mock_notifier = MockNotifier::new();
        let sent_clone = Arc::clone(&sent);
        mock_notifier.expect_send_alert().returning(move |body| {
            sent_clone.lock().unwrap().push(body.to_owned());
            Ok(())
        });
        (mock_notifier, sent)
    }

    async fn run_cycles(counts: Vec<u32>, threshold: u32) -> (Vec<Transition>, Vec<String>) {
        let cycles = counts.len();
        let (notifier, sent) = create_recording_notifier();
        let mut monitor = AlertMonitor::new(
            create_probe(counts),
            notifier,
            threshold,
            ADDRESS,
            MonitorTimings::default(),
        );

        let mut transitions = Vec::new();
        for _ in 0..cycles {
            transitions.push(monitor.cycle().await);
        }

        let sent = sent.lock().unwrap().clone();
        (transitions, sent)
    }

    #[tokio::test]
    async fn test_constant_count_sends_one_alert() {
        let (transitions, sent) = run_cycles(vec![12, 12, 12], 5).await;

        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("12"));
        assert_eq!(
            transitions,
            vec![
                Transition::Notify(12),
                Transition::Suppress,
                Transition::Suppress
            ]
        );
    }

    #[tokio::test]
    async fn test_rearm_sends_two_alerts() {
        let (_, sent) = run_cycles(vec![10, 2, 10], 5).await;

        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|body| body.contains("10")));
    }

    #[tokio::test]
    async fn test_count_equal_to_threshold_sends_alert() {
        let (_, sent) = run_cycles(vec![5], 5).await;
        assert_eq!(sent.len(), 1);
    }

    #[tokio::test]
    async fn test_alert_payloads() {
        let (_, sent) = run_cycles(vec![0, 6, 6, 3, 7], 5).await;

        assert_eq!(
            sent,
            vec![
                Commander::get_alert_message(6, ADDRESS),
                Commander::get_alert_message(7, ADDRESS)
            ]
        );
        assert!(sent.iter().all(|body| body.contains(ADDRESS)));
    }

    #[tokio::test]
    async fn test_delivery_failure_is_not_retried() {
        let mut mock_notifier = MockNotifier::new();
        mock_notifier
            .expect_send_alert()
            .times(1)
            .returning(|_| Err(NotifyError::Delivery("connection reset".to_owned())));

        let mut monitor = AlertMonitor::new(
            create_probe(vec![8, 8]),
            mock_notifier,
            5,
            ADDRESS,
            MonitorTimings::default(),
        );

        assert_eq!(monitor.cycle().await, Transition::Notify(8));
        // The failed alert still counts as sent
        assert_eq!(monitor.cycle().await, Transition::Suppress);
    }

    #[tokio::test]
    async fn test_unavailable_room_is_absorbed_and_commits_state() {
        let mut mock_notifier = MockNotifier::new();
        mock_notifier
            .expect_send_alert()
            .times(1)
            .returning(|_| Err(NotifyError::RoomUnavailable("!room:example.com".to_owned())));

        let mut monitor = AlertMonitor::new(
            create_probe(vec![8, 8]),
            mock_notifier,
            5,
            ADDRESS,
            MonitorTimings::default(),
        );

        assert_eq!(monitor.cycle().await, Transition::Notify(8));
        assert_eq!(monitor.cycle().await, Transition::Suppress);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_polls_with_fixed_delay_until_cancelled() {
        let (notifier, sent) = create_recording_notifier();
        // Probes at 0, 300, 600, 900 and 1200 seconds
        let monitor = AlertMonitor::new(
            create_probe(vec![0, 6, 6, 3, 7]),
            notifier,
            5,
            ADDRESS,
            MonitorTimings::default(),
        );

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(monitor.run(cancel.clone()));

        time::sleep(Duration::from_secs(1250)).await;
        cancel.cancel();
        handle.await.unwrap();

        assert_eq!(
            *sent.lock().unwrap(),
            vec![
                Commander::get_alert_message(6, ADDRESS),
                Commander::get_alert_message(7, ADDRESS)
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_keeps_poll_interval_after_undeliverable_alert() {
        let (prober, probed_at) = create_timed_probe(vec![9, 3]);

        let mut mock_notifier = MockNotifier::new();
        mock_notifier
            .expect_send_alert()
            .times(1)
            .returning(|_| Err(NotifyError::RoomUnavailable("!room:example.com".to_owned())));

        let monitor = AlertMonitor::new(
            prober,
            mock_notifier,
            5,
            ADDRESS,
            MonitorTimings::default(),
        );

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(monitor.run(cancel.clone()));

        time::sleep(Duration::from_secs(400)).await;
        cancel.cancel();
        handle.await.unwrap();

        assert_eq!(*probed_at.lock().unwrap(), vec![0, 300]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_survives_panicking_cycle() {
        // Panics at 0, recovers at 60, then back to the poll interval
        let (prober, probed_at) = create_timed_probe(vec![9, 9, 9]);

        let monitor = AlertMonitor::new(
            prober,
            PanickingNotifier,
            5,
            ADDRESS,
            MonitorTimings::default(),
        );

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(monitor.run(cancel.clone()));

        time::sleep(Duration::from_secs(400)).await;
        assert!(!handle.is_finished());

        cancel.cancel();
        handle.await.unwrap();

        assert_eq!(*probed_at.lock().unwrap(), vec![0, 60, 360]);
    }

    #[test]
    fn test_panic_message() {
        let static_payload: Box<dyn Any + Send> = Box::new("boom");
        let owned_payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        let other_payload: Box<dyn Any + Send> = Box::new(42u32);

        assert_eq!(panic_message(static_payload.as_ref()), "boom");
        assert_eq!(panic_message(owned_payload.as_ref()), "bang");
        assert_eq!(panic_message(other_payload.as_ref()), "unknown panic");
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_immediately_when_cancelled() {
        let mut mock_probe = MockProbe::new();
        mock_probe.expect_probe().times(1).return_const(0u32);

        let monitor = AlertMonitor::new(
            Arc::new(mock_probe),
            MockNotifier::new(),
            5,
            ADDRESS,
            MonitorTimings::default(),
        );

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(monitor.run(cancel.clone()));

        // Let the first cycle run, the loop is now waiting for the next poll
        time::sleep(Duration::from_secs(1)).await;
        cancel.cancel();

        let started = time::Instant::now();
        handle.await.unwrap();
        assert!(time::Instant::now() - started < Duration::from_secs(1));
    }
}
