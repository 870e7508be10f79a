use chrono::{DateTime, Utc};
use streams_api::{KNOWN_SOURCES, Match};

/// User-selected narrowing of the cached match list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Only matches whose start has been reached.
    pub live: bool,
    /// Only matches the API flags as popular.
    pub popular: bool,
    /// Only matches offered by this source. `None` means all sources.
    pub source: Option<String>,
}

impl FilterState {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    pub fn toggle_live(&mut self) {
        self.live = !self.live;
    }

    pub fn toggle_popular(&mut self) {
        self.popular = !self.popular;
    }

    /// Step through all → alpha → bravo → … → intel → all.
    pub fn cycle_source(&mut self) {
        let next = match self.source.as_deref() {
            None => KNOWN_SOURCES.first(),
            Some(current) => KNOWN_SOURCES
                .iter()
                .position(|s| *s == current)
                .and_then(|i| KNOWN_SOURCES.get(i + 1)),
        };
        self.source = next.map(|s| s.to_string());
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Labels for the active-filter tags shown above the schedule.
    pub fn active_tags(&self) -> Vec<String> {
        let mut tags = Vec::new();
        if self.live {
            tags.push("Live".to_string());
        }
        if self.popular {
            tags.push("Popular".to_string());
        }
        if let Some(source) = &self.source {
            tags.push(source.clone());
        }
        tags
    }

    pub fn accepts(&self, m: &Match, now: DateTime<Utc>) -> bool {
        if self.live && !m.is_live(now) {
            return false;
        }
        if let Some(source) = &self.source
            && !m.has_source(source)
        {
            return false;
        }
        if self.popular && !m.popular {
            return false;
        }
        true
    }
}

/// Matches from the cache that pass every active filter, in cache order.
pub fn apply_filters<'a>(matches: &'a [Match], filters: &FilterState, now: DateTime<Utc>) -> Vec<&'a Match> {
    matches.iter().filter(|m| filters.accepts(m, now)).collect()
}
