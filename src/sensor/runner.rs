use super::EpexImbalanceSensor;
use crate::logging::{StructuredLogger, get_logger};
use crate::schedule::{PollSchedule, Trigger};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{Duration, MissedTickBehavior, interval, sleep};

/// Drives a sensor from a [`PollSchedule`] until shutdown
pub struct SensorRunner {
    sensor: Arc<EpexImbalanceSensor>,
    schedule: PollSchedule,
    logger: StructuredLogger,
}

impl SensorRunner {
    pub fn new(sensor: Arc<EpexImbalanceSensor>, schedule: PollSchedule) -> Self {
        Self {
            sensor,
            schedule,
            logger: get_logger("runner"),
        }
    }

    fn delay_until(at: Option<DateTime<Utc>>) -> Duration {
        at.and_then(|t| (t - Utc::now()).to_std().ok())
            .unwrap_or(Duration::ZERO)
    }

    /// Run until `shutdown` flips to `true` or its sender is dropped
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        self.logger.info(&format!(
            "Starting poll loop; interval={}s (active={}), grid triggers active={}",
            self.schedule.min_interval().as_secs(),
            self.schedule.uses_interval(),
            self.schedule.uses_grid()
        ));

        self.sensor.refresh(Trigger::Startup).await;

        let mut ticker = interval(self.schedule.min_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately; the startup poll covered it
        ticker.tick().await;

        let mut last_grid: Option<DateTime<Utc>> = None;
        loop {
            // Never compute a trigger at or before the one that just fired
            let from = last_grid.map_or_else(Utc::now, |t| t.max(Utc::now()));
            let next_grid = self.schedule.next_grid_trigger(from);

            tokio::select! {
                _ = ticker.tick(), if self.schedule.uses_interval() => {
                    self.sensor.refresh(Trigger::Interval).await;
                }
                () = sleep(Self::delay_until(next_grid)), if next_grid.is_some() => {
                    last_grid = next_grid;
                    self.sensor.refresh(Trigger::GridOffset).await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        self.logger.info("Shutdown signal received");
                        break;
                    }
                }
            }
        }
    }
}
