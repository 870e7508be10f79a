use crate::state::messages::UiEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

/// How often live viewer counts are re-polled.
pub const VIEWER_REFRESH_PERIOD: Duration = Duration::from_secs(60);

/// Emits `RefreshTick` on a fixed period. The UI decides what to poll so the
/// request always targets the listing currently on screen.
pub struct PeriodicRefresher {
    ui_events: mpsc::Sender<UiEvent>,
    period: Duration,
}

impl PeriodicRefresher {
    pub fn new(ui_events: mpsc::Sender<UiEvent>) -> Self {
        Self { ui_events, period: VIEWER_REFRESH_PERIOD }
    }

    pub async fn run(self) {
        let mut refresh_interval = interval(self.period);
        // Skip the immediate first tick so startup loading isn't double-triggered.
        refresh_interval.tick().await;

        loop {
            refresh_interval.tick().await;
            if self.ui_events.send(UiEvent::RefreshTick).await.is_err() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_tick_arrives_after_one_period() {
        let (tx, mut rx) = mpsc::channel(4);
        let refresher = PeriodicRefresher { ui_events: tx, period: Duration::from_secs(60) };
        tokio::spawn(refresher.run());

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(matches!(rx.try_recv(), Ok(UiEvent::RefreshTick)));
    }
}
