use crate::state::aggregator::ViewerTarget;
use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use std::collections::HashMap;
use streams_api::{Category, Match};

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    LoadMatches { category: Category, generation: u64 },
    RefreshViewers { generation: u64, targets: Vec<ViewerTarget> },
    LoadSearchIndex,
    LoadCategoryBoard,
    LoadDiscordInvite { guild_id: String },
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    MatchesLoaded { generation: u64, matches: Vec<Match> },
    MatchesFailed { generation: u64, message: String },
    /// Viewer totals per match id for the listing loaded under `generation`.
    ViewersUpdated { generation: u64, totals: HashMap<String, u64> },
    SearchIndexLoaded { matches: Vec<Match> },
    CategoryBoardLoaded { ranking: Vec<(Category, u64)> },
    DiscordInviteLoaded { invite: String },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    /// Re-check watch-link countdowns against the clock.
    CountdownTick,
    /// Viewer counts are due for a refresh.
    RefreshTick,
}
