use std::future::Future;

use tokio::sync::mpsc;
use tokio::time::{interval_at, Duration, Instant, Interval, MissedTickBehavior};

/// Drives the trip lifecycle. A real matching feed can replace the timer
/// without touching the transition table.
pub trait TickSource: Send + 'static {
    /// Restarts the schedule so the next tick is one full period away.
    fn reset(&mut self);

    fn tick(&mut self) -> impl Future<Output = ()> + Send + '_;
}

/// Shortest period [`IntervalTicks`] accepts; anything below is raised to it.
pub const MIN_TICK_PERIOD: Duration = Duration::from_millis(1);

pub struct IntervalTicks {
    interval: Interval,
}

impl IntervalTicks {
    pub fn new(period: Duration) -> Self {
        let period = period.max(MIN_TICK_PERIOD);
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

impl TickSource for IntervalTicks {
    fn reset(&mut self) {
        self.interval.reset();
    }

    async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

/// Ticks only when the paired [`ManualTrigger`] fires.
pub struct ManualTicks {
    rx: mpsc::UnboundedReceiver<()>,
}

#[derive(Clone)]
pub struct ManualTrigger {
    tx: mpsc::UnboundedSender<()>,
}

impl ManualTicks {
    pub fn channel() -> (Self, ManualTrigger) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx }, ManualTrigger { tx })
    }
}

impl ManualTrigger {
    /// Returns false once the ticking side is gone.
    pub fn fire(&self) -> bool {
        self.tx.send(()).is_ok()
    }
}

impl TickSource for ManualTicks {
    fn reset(&mut self) {
        while self.rx.try_recv().is_ok() {}
    }

    async fn tick(&mut self) {
        if self.rx.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    }
}
