use crate::app::MenuItem;
use crate::state::aggregator::{self, BOARD_ORDER, ViewerTarget};
use crate::state::countdown::Countdowns;
use crate::state::filters::apply_filters;
use crate::state::route::Route;
use crate::state::schedule::{
    self, Links, NO_FILTER_RESULTS_MESSAGE, ScheduleView, empty_category_message,
};
use crate::state::search::SearchState;
use chrono::{DateTime, TimeZone, Utc};
use log::debug;
use std::collections::HashMap;
use streams_api::{Category, Match};

// ---------------------------------------------------------------------------
// Schedule listing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoadStatus {
    #[default]
    Loading,
    Loaded,
    Failed(String),
}

/// The listing on screen: route, cached matches for that route's category and
/// the render plan derived from them.
#[derive(Debug, Default)]
pub struct ScheduleState {
    pub route: Route,
    /// Bumped on every listing load. Responses tagged with an older value
    /// belong to a listing that is no longer shown and are discarded.
    pub generation: u64,
    pub status: LoadStatus,
    /// Matches for `route.category`, as fetched. Viewer counts are merged in.
    pub matches: Vec<Match>,
    pub view: ScheduleView,
    /// Index of the selected card in render order.
    pub selected: usize,
}

impl ScheduleState {
    /// Start loading `category`. Cache and view are cleared immediately so the
    /// previous listing never shows under the new header.
    pub fn begin_load(&mut self, category: Category) -> u64 {
        self.generation += 1;
        self.route.category = category;
        self.status = LoadStatus::Loading;
        self.matches.clear();
        self.view = ScheduleView::Loading;
        self.selected = 0;
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Returns false when the response is stale.
    pub fn on_matches_loaded(&mut self, generation: u64, matches: Vec<Match>) -> bool {
        if !self.is_current(generation) {
            debug!("dropping stale listing (generation {generation}, current {})", self.generation);
            return false;
        }
        self.matches = matches;
        self.status = LoadStatus::Loaded;
        true
    }

    pub fn on_load_failed(&mut self, generation: u64, message: String) -> bool {
        if !self.is_current(generation) {
            debug!("dropping stale failure (generation {generation}, current {})", self.generation);
            return false;
        }
        self.matches.clear();
        self.status = LoadStatus::Failed(message);
        true
    }

    /// Merge viewer totals. Returns whether anything on screen changed.
    pub fn on_viewers_updated(&mut self, generation: u64, totals: &HashMap<String, u64>) -> bool {
        if !self.is_current(generation) {
            debug!("dropping stale viewer counts (generation {generation}, current {})", self.generation);
            return false;
        }
        aggregator::apply_viewer_counts(&mut self.matches, totals)
    }

    pub fn viewer_targets(&self, now: DateTime<Utc>) -> Vec<ViewerTarget> {
        if self.status != LoadStatus::Loaded {
            return Vec::new();
        }
        aggregator::viewer_targets(&self.matches, now)
    }

    /// Recompute the render plan from cache, filters and the clock.
    pub fn rebuild<Tz: TimeZone>(&mut self, now: &DateTime<Tz>, links: &Links)
    where
        Tz::Offset: std::fmt::Display,
    {
        self.view = match &self.status {
            LoadStatus::Loading => ScheduleView::Loading,
            LoadStatus::Failed(message) => ScheduleView::Placeholder(message.clone()),
            LoadStatus::Loaded if self.matches.is_empty() => {
                ScheduleView::Placeholder(empty_category_message(self.route.category))
            }
            LoadStatus::Loaded => {
                let filtered = apply_filters(&self.matches, &self.route.filters, now.with_timezone(&Utc));
                if filtered.is_empty() {
                    ScheduleView::Placeholder(NO_FILTER_RESULTS_MESSAGE.to_string())
                } else {
                    let grouping = schedule::group_matches(&filtered, now);
                    ScheduleView::Sections(schedule::build_sections(&grouping, now, links))
                }
            }
        };
        self.selected = self.selected.min(self.view.card_count().saturating_sub(1));
    }

    pub fn select_down(&mut self) {
        let max = self.view.card_count().saturating_sub(1);
        if self.selected < max {
            self.selected += 1;
        }
    }

    pub fn select_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_card(&self) -> Option<&schedule::CardView> {
        self.view.cards().nth(self.selected)
    }
}

// ---------------------------------------------------------------------------
// Category board
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct CategoryBoardState {
    /// Categories with live viewer totals, most watched first.
    pub ranking: Vec<(Category, u64)>,
    pub loaded: bool,
    pub selected: usize,
}

impl Default for CategoryBoardState {
    fn default() -> Self {
        Self {
            ranking: BOARD_ORDER.iter().map(|c| (*c, 0)).collect(),
            loaded: false,
            selected: 0,
        }
    }
}

impl CategoryBoardState {
    pub fn load(&mut self, ranking: Vec<(Category, u64)>) {
        self.ranking = ranking;
        self.loaded = true;
        self.selected = self.selected.min(self.ranking.len().saturating_sub(1));
    }

    pub fn select_down(&mut self) {
        let max = self.ranking.len().saturating_sub(1);
        if self.selected < max {
            self.selected += 1;
        }
    }

    pub fn select_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_category(&self) -> Option<Category> {
        self.ranking.get(self.selected).map(|(c, _)| *c)
    }
}

// ---------------------------------------------------------------------------
// Root state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub last_error: Option<String>,
    pub schedule: ScheduleState,
    pub countdowns: Countdowns,
    pub search: SearchState,
    pub board: CategoryBoardState,
    pub discord_invite: Option<String>,
}

impl AppState {
    pub fn new(route: Route) -> Self {
        Self {
            schedule: ScheduleState { route, ..ScheduleState::default() },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::filters::FilterState;
    use chrono::{Duration, FixedOffset};

    fn links() -> Links {
        Links { api_base: "https://api.test".into(), site_base: "https://site.test".into() }
    }

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2026, 3, 14, 18, 0, 0).unwrap()
    }

    fn m(id: &str, offset_hours: i64) -> Match {
        Match {
            id: id.into(),
            title: id.into(),
            category: "football".into(),
            date: now().with_timezone(&Utc) + Duration::hours(offset_hours),
            ..Default::default()
        }
    }

    #[test]
    fn empty_fetch_renders_single_placeholder() {
        let mut state = ScheduleState::default();
        let generation = state.begin_load(Category::Cricket);
        assert!(state.on_matches_loaded(generation, Vec::new()));
        state.rebuild(&now(), &links());
        assert_eq!(
            state.view,
            ScheduleView::Placeholder("No matches found for Cricket. Check back later!".into())
        );
        assert_eq!(state.view.card_count(), 0);
    }

    #[test]
    fn filters_that_exclude_everything_show_filter_message() {
        let mut state = ScheduleState::default();
        let generation = state.begin_load(Category::All);
        state.on_matches_loaded(generation, vec![m("later", 3)]);
        state.route.filters = FilterState { live: true, ..Default::default() };
        state.rebuild(&now(), &links());
        assert_eq!(state.view, ScheduleView::Placeholder(NO_FILTER_RESULTS_MESSAGE.into()));
    }

    #[test]
    fn failure_shows_message_in_place_of_cards() {
        let mut state = ScheduleState::default();
        let generation = state.begin_load(Category::All);
        assert!(state.on_load_failed(generation, "offline".into()));
        state.rebuild(&now(), &links());
        assert_eq!(state.view, ScheduleView::Placeholder("offline".into()));
    }

    #[test]
    fn stale_responses_are_ignored() {
        let mut state = ScheduleState::default();
        let first = state.begin_load(Category::Football);
        let second = state.begin_load(Category::Hockey);
        assert!(first < second);

        assert!(!state.on_matches_loaded(first, vec![m("football", -1)]));
        assert!(state.matches.is_empty());
        assert_eq!(state.status, LoadStatus::Loading);

        assert!(state.on_matches_loaded(second, vec![m("hockey", -1)]));
        let totals = HashMap::from([("hockey".to_string(), 10)]);
        assert!(!state.on_viewers_updated(first, &totals));
        assert_eq!(state.matches[0].viewers, 0);
        assert!(!state.on_load_failed(first, "late failure".into()));
        assert_eq!(state.status, LoadStatus::Loaded);
    }

    #[test]
    fn viewer_update_moves_match_into_live_bucket() {
        let mut state = ScheduleState::default();
        let generation = state.begin_load(Category::All);
        let mut started = m("started", -30);
        started.sources = vec![streams_api::SourceRef { source: "alpha".into(), id: "s".into() }];
        state.on_matches_loaded(generation, vec![m("soon", 1), started]);
        state.rebuild(&now(), &links());
        assert_eq!(state.view.card_ids(), vec!["soon", "started"]);

        let targets = state.viewer_targets(now().with_timezone(&Utc));
        assert_eq!(targets.len(), 1);

        let totals = HashMap::from([("started".to_string(), 500)]);
        assert!(state.on_viewers_updated(generation, &totals));
        state.rebuild(&now(), &links());
        assert_eq!(state.view.card_ids(), vec!["started", "soon"]);

        assert!(!state.on_viewers_updated(generation, &totals));
    }

    #[test]
    fn begin_load_clears_previous_listing() {
        let mut state = ScheduleState::default();
        let generation = state.begin_load(Category::All);
        state.on_matches_loaded(generation, vec![m("a", 1), m("b", 2)]);
        state.rebuild(&now(), &links());
        state.select_down();
        assert_eq!(state.selected_card().map(|c| c.match_id.as_str()), Some("b"));

        state.begin_load(Category::Golf);
        assert!(state.matches.is_empty());
        assert_eq!(state.view, ScheduleView::Loading);
        assert_eq!(state.selected, 0);
        assert_eq!(state.route.category, Category::Golf);
    }

    #[test]
    fn board_selection_follows_ranking() {
        let mut board = CategoryBoardState::default();
        assert_eq!(board.selected_category(), Some(Category::Basketball));
        board.load(vec![(Category::Tennis, 10), (Category::Golf, 0)]);
        board.select_down();
        board.select_down();
        assert_eq!(board.selected_category(), Some(Category::Golf));
    }
}
