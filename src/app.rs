use crate::state::app_settings::AppSettings;
use crate::state::app_state::AppState;
use crate::state::messages::NetworkRequest;
use crate::state::route::Route;
use crate::state::schedule::Links;
use chrono::{Local, Utc};
use log::{debug, info};
use std::collections::HashMap;
use streams_api::{Category, Match};
use tokio::time::Instant;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Schedule,
    Search,
    Categories,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
    links: Links,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        let route = settings.initial_route.as_deref().map(Route::parse).unwrap_or_default();
        let links = settings.links();
        Self { state: AppState::new(route), settings, links }
    }

    pub fn links(&self) -> &Links {
        &self.links
    }

    /// Requests issued once at startup: the routed listing, the search index,
    /// the category board and the community invite.
    pub fn startup_requests(&mut self) -> Vec<NetworkRequest> {
        let category = self.state.schedule.route.category;
        vec![
            self.load_category(category),
            NetworkRequest::LoadSearchIndex,
            NetworkRequest::LoadCategoryBoard,
            NetworkRequest::LoadDiscordInvite { guild_id: self.settings.discord_guild.clone() },
        ]
    }

    // -----------------------------------------------------------------------
    // Routing
    // -----------------------------------------------------------------------

    /// Switch the listing to `category`. Filters carry over; the previous
    /// listing's in-flight responses become stale.
    pub fn load_category(&mut self, category: Category) -> NetworkRequest {
        let generation = self.state.schedule.begin_load(category);
        debug!("route replaced: {}", self.state.schedule.route.display());
        self.refresh_view();
        NetworkRequest::LoadMatches { category, generation }
    }

    pub fn next_category(&mut self) -> NetworkRequest {
        self.load_category(self.state.schedule.route.category.next())
    }

    pub fn prev_category(&mut self) -> NetworkRequest {
        self.load_category(self.state.schedule.route.category.prev())
    }

    /// Reload the current listing from scratch.
    pub fn reload(&mut self) -> NetworkRequest {
        self.load_category(self.state.schedule.route.category)
    }

    /// Open the schedule for the category highlighted on the board.
    pub fn open_selected_category(&mut self) -> Option<NetworkRequest> {
        let category = self.state.board.selected_category()?;
        self.update_tab(MenuItem::Schedule);
        Some(self.load_category(category))
    }

    // -----------------------------------------------------------------------
    // Filters: re-render from cache and rewrite the route, never refetch
    // -----------------------------------------------------------------------

    pub fn toggle_live_filter(&mut self) {
        self.state.schedule.route.filters.toggle_live();
        self.on_filters_changed();
    }

    pub fn toggle_popular_filter(&mut self) {
        self.state.schedule.route.filters.toggle_popular();
        self.on_filters_changed();
    }

    pub fn cycle_source_filter(&mut self) {
        self.state.schedule.route.filters.cycle_source();
        self.on_filters_changed();
    }

    pub fn clear_filters(&mut self) {
        self.state.schedule.route.filters.clear();
        self.on_filters_changed();
    }

    fn on_filters_changed(&mut self) {
        debug!("route replaced: {}", self.state.schedule.route.display());
        self.state.schedule.selected = 0;
        self.refresh_view();
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    /// Store a listing and render it. Returns the follow-up viewer poll when
    /// the listing is current and has live matches.
    pub fn on_matches_loaded(&mut self, generation: u64, matches: Vec<Match>) -> Option<NetworkRequest> {
        if !self.state.schedule.on_matches_loaded(generation, matches) {
            return None;
        }
        info!(
            "loaded {} {} matches",
            self.state.schedule.matches.len(),
            self.state.schedule.route.category.slug()
        );
        self.state.last_error = None;
        self.refresh_view();
        self.viewer_refresh_request()
    }

    pub fn on_matches_failed(&mut self, generation: u64, message: String) -> bool {
        if !self.state.schedule.on_load_failed(generation, message) {
            return false;
        }
        self.refresh_view();
        true
    }

    /// Returns whether the view needs redrawing.
    pub fn on_viewers_updated(&mut self, generation: u64, totals: &HashMap<String, u64>) -> bool {
        if !self.state.schedule.on_viewers_updated(generation, totals) {
            return false;
        }
        self.refresh_view();
        true
    }

    pub fn on_search_index_loaded(&mut self, matches: Vec<Match>) {
        self.state.search.load_index(matches);
    }

    pub fn on_category_board_loaded(&mut self, ranking: Vec<(Category, u64)>) {
        self.state.board.load(ranking);
    }

    pub fn on_discord_invite_loaded(&mut self, invite: String) {
        self.state.discord_invite = Some(invite);
    }

    pub fn on_error(&mut self, message: String) {
        self.state.last_error = Some(message);
    }

    // -----------------------------------------------------------------------
    // Timers
    // -----------------------------------------------------------------------

    /// Periodic refresh: re-derive the view so matches whose start has passed
    /// move into place, then poll viewers for the current listing.
    pub fn on_refresh_tick(&mut self) -> Option<NetworkRequest> {
        self.refresh_view();
        self.viewer_refresh_request()
    }

    pub fn viewer_refresh_request(&self) -> Option<NetworkRequest> {
        let targets = self.state.schedule.viewer_targets(Utc::now());
        if targets.is_empty() {
            return None;
        }
        Some(NetworkRequest::RefreshViewers { generation: self.state.schedule.generation, targets })
    }

    /// Returns whether any countdown changed.
    pub fn tick_countdowns(&mut self) -> bool {
        self.state.countdowns.tick(Instant::now())
    }

    /// Rebuild the render plan and keep countdowns in step with the cards on
    /// screen.
    pub fn refresh_view(&mut self) {
        self.state.schedule.rebuild(&Local::now(), &self.links);
        self.state.countdowns.sync(self.state.schedule.view.card_ids(), Instant::now());
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
        if self.state.active_tab != MenuItem::Search {
            self.state.search.composing = false;
        }
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------------

    pub fn start_search(&mut self) {
        self.update_tab(MenuItem::Search);
        self.state.search.composing = true;
    }

    pub fn stop_composing(&mut self) {
        self.state.search.composing = false;
    }

    /// Jump from a search result to its category listing.
    pub fn open_selected_result(&mut self) -> Option<NetworkRequest> {
        let category = self
            .state
            .search
            .selected_match()
            .and_then(|m| Category::from_match_category(&m.category))?;
        self.update_tab(MenuItem::Schedule);
        Some(self.load_category(category))
    }
}
