use prometheus::IntGauge;
use rand::Rng;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::info;

use crate::engine::lifecycle::TripLifecycle;
use crate::engine::ticker::TickSource;
use crate::error::TripError;
use crate::models::coordinate::Coordinate;
use crate::models::driver::DriverContact;
use crate::models::ride::RideTier;
use crate::models::trip::{Trip, TripStatus};
use crate::observability::metrics::Metrics;

enum Command {
    Start {
        destination: String,
        tier: RideTier,
        reply: oneshot::Sender<Result<Trip, TripError>>,
    },
    Cancel {
        reply: oneshot::Sender<Option<Trip>>,
    },
    SeedOrigin {
        origin: Coordinate,
        reply: oneshot::Sender<()>,
    },
    DriverContact {
        reply: oneshot::Sender<Result<DriverContact, TripError>>,
    },
}

/// Handle to one trip lifecycle running on its own task.
///
/// The task exclusively owns the lifecycle and its tick source. Dropping the
/// handle (or calling [`TripSession::close`]) stops the task, so no timer can
/// outlive the view that owns it.
pub struct TripSession {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<Option<Trip>>,
    task: JoinHandle<()>,
}

impl TripSession {
    pub fn spawn<R, T>(
        lifecycle: TripLifecycle<R>,
        ticks: T,
        metrics: Metrics,
        command_queue_size: usize,
    ) -> Self
    where
        R: Rng + Send + 'static,
        T: TickSource,
    {
        let (commands, command_rx) = mpsc::channel(command_queue_size.max(1));
        let (snapshot_tx, snapshots) = watch::channel(lifecycle.snapshot());

        let task = tokio::spawn(run_trip_session(
            lifecycle,
            ticks,
            command_rx,
            snapshot_tx,
            metrics,
        ));

        Self {
            commands,
            snapshots,
            task,
        }
    }

    pub async fn start(&self, destination: &str, tier: RideTier) -> Result<Trip, TripError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Start {
            destination: destination.to_string(),
            tier,
            reply,
        })
        .await?;
        rx.await.map_err(|_| closed())?
    }

    pub async fn cancel(&self) -> Result<Option<Trip>, TripError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Cancel { reply }).await?;
        rx.await.map_err(|_| closed())
    }

    /// Resolves once the origin is visible in [`TripSession::snapshot`].
    pub async fn seed_origin(&self, origin: Coordinate) -> Result<(), TripError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::SeedOrigin { origin, reply }).await?;
        rx.await.map_err(|_| closed())
    }

    pub async fn driver_contact(&self) -> Result<DriverContact, TripError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::DriverContact { reply }).await?;
        rx.await.map_err(|_| closed())?
    }

    pub fn snapshot(&self) -> Option<Trip> {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Option<Trip>> {
        self.snapshots.clone()
    }

    pub fn close(&self) {
        self.task.abort();
    }

    pub fn is_closed(&self) -> bool {
        self.task.is_finished()
    }

    async fn send(&self, command: Command) -> Result<(), TripError> {
        self.commands.send(command).await.map_err(|_| closed())
    }
}

impl Drop for TripSession {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn closed() -> TripError {
    TripError::InvalidState("trip session is closed".to_string())
}

/// Counts a trip in `active_trips` for as long as it is held.
struct ActiveTrip(IntGauge);

impl ActiveTrip {
    fn new(gauge: &IntGauge) -> Self {
        gauge.inc();
        Self(gauge.clone())
    }
}

impl Drop for ActiveTrip {
    fn drop(&mut self) {
        self.0.dec();
    }
}

async fn run_trip_session<R, T>(
    mut lifecycle: TripLifecycle<R>,
    mut ticks: T,
    mut commands: mpsc::Receiver<Command>,
    snapshots: watch::Sender<Option<Trip>>,
    metrics: Metrics,
) where
    R: Rng + Send + 'static,
    T: TickSource,
{
    let mut active: Option<ActiveTrip> = None;

    loop {
        // Commands win over a tick that is ready at the same time.
        tokio::select! {
            biased;

            command = commands.recv() => {
                let Some(command) = command else {
                    break;
                };

                match command {
                    Command::Start { destination, tier, reply } => {
                        let result = lifecycle.start(&destination, tier);
                        if result.is_ok() {
                            ticks.reset();
                            metrics.trips_started_total.inc();
                            active = Some(ActiveTrip::new(&metrics.active_trips));
                            snapshots.send_replace(lifecycle.snapshot());
                        }
                        let _ = reply.send(result);
                    }
                    Command::Cancel { reply } => {
                        let was_active = lifecycle.is_active();
                        let trip = lifecycle.cancel();
                        if was_active {
                            record_transition(&metrics, TripStatus::Cancelled);
                            active = None;
                            snapshots.send_replace(trip.clone());
                        }
                        let _ = reply.send(trip);
                    }
                    Command::SeedOrigin { origin, reply } => {
                        lifecycle.set_origin(origin);
                        if lifecycle.is_active() {
                            snapshots.send_replace(lifecycle.snapshot());
                        }
                        let _ = reply.send(());
                    }
                    Command::DriverContact { reply } => {
                        let _ = reply.send(lifecycle.driver_contact());
                    }
                }
            }
            _ = ticks.tick(), if lifecycle.is_active() => {
                if let Some(status) = lifecycle.tick() {
                    record_transition(&metrics, status);
                    if status.is_terminal() {
                        active = None;
                    }
                    snapshots.send_replace(lifecycle.snapshot());
                }
            }
        }
    }

    info!(active = active.is_some(), "trip session stopped");
}

fn record_transition(metrics: &Metrics, status: TripStatus) {
    metrics
        .trip_transitions_total
        .with_label_values(&[status.as_str()])
        .inc();

    if status.is_terminal() {
        metrics
            .trips_finished_total
            .with_label_values(&[status.as_str()])
            .inc();
    }
}
