use std::collections::{HashMap, HashSet};
use tokio::time::{Duration, Instant};

/// Seconds a card waits before its watch link is revealed.
pub const COUNTDOWN_SECS: u8 = 10;

/// How often the UI re-checks running countdowns. Shorter than a second so a
/// card never loses part of its first second to the shared tick.
pub const COUNTDOWN_TICK: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownPhase {
    /// Seconds left before the link shows.
    Counting(u8),
    Ready,
}

#[derive(Debug, Clone, Copy)]
struct Running {
    started: Instant,
    shown: u8,
}

/// Per-card watch-link countdowns, keyed by match id. Each card counts from
/// the moment it appeared; a shared tick only refreshes what is displayed.
/// A card's countdown lives exactly as long as the card stays on screen.
#[derive(Debug, Default)]
pub struct Countdowns {
    counting: HashMap<String, Running>,
    ready: HashSet<String>,
}

impl Countdowns {
    /// Start countdowns for newly shown cards and drop the ones whose card is
    /// gone. Cards already on screen keep their progress.
    pub fn sync<'a>(&mut self, visible: impl IntoIterator<Item = &'a str>, now: Instant) {
        let visible: HashSet<&str> = visible.into_iter().collect();
        self.counting.retain(|id, _| visible.contains(id.as_str()));
        self.ready.retain(|id| visible.contains(id.as_str()));
        for id in visible {
            if !self.ready.contains(id) && !self.counting.contains_key(id) {
                self.counting.insert(id.to_string(), Running { started: now, shown: COUNTDOWN_SECS });
            }
        }
    }

    /// Bring every running countdown up to `now`. Returns whether any card's
    /// displayed state changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;
        let mut finished = Vec::new();
        for (id, running) in self.counting.iter_mut() {
            let left = seconds_left(running.started, now);
            if left == 0 {
                finished.push(id.clone());
            } else if left != running.shown {
                running.shown = left;
                changed = true;
            }
        }
        for id in finished {
            self.counting.remove(&id);
            self.ready.insert(id);
            changed = true;
        }
        changed
    }

    pub fn phase(&self, match_id: &str) -> Option<CountdownPhase> {
        if self.ready.contains(match_id) {
            return Some(CountdownPhase::Ready);
        }
        self.counting.get(match_id).map(|running| CountdownPhase::Counting(running.shown))
    }

    /// Number of countdowns still running.
    #[cfg(test)]
    pub fn running(&self) -> usize {
        self.counting.len()
    }
}

// Whole seconds still to wait, rounded up so a fresh card shows the full count.
fn seconds_left(started: Instant, now: Instant) -> u8 {
    let total = Duration::from_secs(u64::from(COUNTDOWN_SECS));
    let remaining = total.saturating_sub(now.saturating_duration_since(started));
    let millis = remaining.as_millis();
    millis.div_ceil(1000) as u8
}
