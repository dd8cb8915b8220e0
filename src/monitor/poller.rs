//! Periodic health polling with teardown-safe state publication.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::metrics;
use crate::probe::{HealthProbe, ProbeKind};

use super::status::Snapshot;

/// Default time between poll cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Floor applied to the poll interval; `tokio::time::interval` rejects zero.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Run one poll cycle: query both endpoints concurrently and wait for both.
pub async fn poll_once<P>(probe: &P, cycle: u64) -> Snapshot
where
    P: HealthProbe + ?Sized,
{
    let (liveness, readiness) = tokio::join!(probe.check_liveness(), probe.check_readiness());

    for (kind, outcome) in ProbeKind::ALL.into_iter().zip([&liveness, &readiness]) {
        match outcome {
            Err(err) => warn!(probe = %kind, error = %err, "Health query failed"),
            Ok(body) => {
                for (name, check) in body.failing_checks() {
                    warn!(
                        probe = %kind,
                        check = %name,
                        status = %check.status,
                        message = check.message.as_deref().unwrap_or_default(),
                        "Backend dependency check failing"
                    );
                }
            }
        }
    }

    let snapshot = Snapshot::from_outcomes(cycle, liveness, readiness);
    metrics::record_cycle(&snapshot.status);
    snapshot
}

/// Polls a [`HealthProbe`] on a fixed interval once activated.
pub struct HealthMonitor {
    probe: Arc<dyn HealthProbe>,
    interval: Duration,
}

impl HealthMonitor {
    /// Create a monitor for the given probe.
    pub fn new(probe: impl HealthProbe + 'static, interval: Duration) -> Self {
        Self::from_arc(Arc::new(probe), interval)
    }

    /// Create a monitor sharing an existing probe.
    pub fn from_arc(probe: Arc<dyn HealthProbe>, interval: Duration) -> Self {
        Self { probe, interval }
    }

    /// Start polling: one cycle immediately, then one per interval.
    ///
    /// Must be called inside a tokio runtime. Polling stops when the
    /// returned handle is deactivated or dropped.
    pub fn activate(self) -> MonitorHandle {
        let (state, _) = watch::channel(None);
        let state = Arc::new(state);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let active = Arc::new(AtomicBool::new(true));

        let task = tokio::spawn(run_loop(
            self.probe,
            self.interval.max(MIN_POLL_INTERVAL),
            state.clone(),
            shutdown_rx,
            active.clone(),
        ));

        MonitorHandle {
            active,
            shutdown: shutdown_tx,
            state,
            task: Some(task),
        }
    }
}

async fn run_loop(
    probe: Arc<dyn HealthProbe>,
    period: Duration,
    state: Arc<watch::Sender<Option<Snapshot>>>,
    mut shutdown: watch::Receiver<bool>,
    active: Arc<AtomicBool>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut cycle = 0u64;

    info!(interval_s = period.as_secs(), "Health monitor activated");

    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {}
        }

        cycle += 1;
        debug!(cycle, "Starting poll cycle");

        let snapshot = tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            snapshot = poll_once(probe.as_ref(), cycle) => snapshot,
        };

        let status = snapshot.status.clone();
        if !publish(&state, &active, snapshot) {
            break;
        }

        match status.error() {
            Some(message) => warn!(cycle, error = message, "Health poll settled with error"),
            None => info!(
                cycle,
                live = status.live(),
                ready = status.ready(),
                "Health poll settled"
            ),
        }
    }

    debug!(cycles = cycle, "Health monitor stopped");
}

/// Store `snapshot` unless the monitor was deactivated.
///
/// The flag is read under the channel's write lock, which
/// [`MonitorHandle::deactivate`] also holds while clearing it, so nothing
/// is published once `deactivate` has returned.
fn publish(
    state: &watch::Sender<Option<Snapshot>>,
    active: &AtomicBool,
    snapshot: Snapshot,
) -> bool {
    state.send_if_modified(|current| {
        if !active.load(Ordering::SeqCst) {
            return false;
        }
        *current = Some(snapshot);
        true
    })
}

/// Handle to an active [`HealthMonitor`].
///
/// State is `None` until the first poll cycle settles.
pub struct MonitorHandle {
    active: Arc<AtomicBool>,
    shutdown: watch::Sender<bool>,
    state: Arc<watch::Sender<Option<Snapshot>>>,
    task: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// Receiver notified on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Option<Snapshot>> {
        self.state.subscribe()
    }

    /// Latest published snapshot.
    pub fn current(&self) -> Option<Snapshot> {
        self.state.borrow().clone()
    }

    /// Whether the monitor may still publish.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Stop polling. Idempotent.
    pub fn deactivate(&self) {
        let mut was_active = false;
        self.state.send_if_modified(|_| {
            was_active = self.active.swap(false, Ordering::SeqCst);
            false
        });

        if was_active {
            self.shutdown.send_replace(true);
            info!("Health monitor deactivated");
        }
    }

    /// Wait for the polling task to exit without deactivating.
    ///
    /// Returns once another path ([`deactivate`](Self::deactivate) or a
    /// task failure) has stopped the loop. Cancel-safe.
    pub async fn join(&mut self) {
        if let Some(task) = self.task.as_mut() {
            let result = task.await;
            self.task = None;
            if let Err(e) = result {
                error!(error = %e, "Health monitor task failed");
            }
        }
    }

    /// Deactivate and wait for the polling task to exit.
    pub async fn shutdown(mut self) {
        self.deactivate();
        self.join().await;
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.deactivate();
    }
}
