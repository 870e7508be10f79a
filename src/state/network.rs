use crate::state::aggregator::{self, ViewerTarget};
use crate::state::messages::{NetworkRequest, NetworkResponse};
use crate::state::schedule::LOAD_FAILED_MESSAGE;
use log::{debug, error};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use streams_api::Category;
use streams_api::client::{ApiError, StreamsApi};
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

pub struct NetworkWorker {
    client: StreamsApi,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl NetworkWorker {
    pub fn new(
        client: StreamsApi,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.start_loading_animation().await;

            let result = match request {
                NetworkRequest::LoadMatches { category, generation } => {
                    Ok(self.handle_load_matches(category, generation).await)
                }
                NetworkRequest::RefreshViewers { generation, targets } => {
                    Ok(self.handle_refresh_viewers(generation, targets).await)
                }
                NetworkRequest::LoadSearchIndex => self.handle_load_search_index().await,
                NetworkRequest::LoadCategoryBoard => self.handle_load_category_board().await,
                NetworkRequest::LoadDiscordInvite { guild_id } => {
                    Ok(self.handle_load_discord_invite(guild_id).await)
                }
            };

            debug!("network request complete");
            let is_ok = !matches!(result, Ok(NetworkResponse::MatchesFailed { .. }) | Err(_));
            self.stop_loading_animation(is_ok).await;

            let response = result.unwrap_or_else(|err| NetworkResponse::Error {
                message: err.to_string(),
            });

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    /// A failed listing fetch is not an error for the worker: it is reported
    /// against its generation so only the current view shows the message.
    async fn handle_load_matches(&self, category: Category, generation: u64) -> NetworkResponse {
        debug!("loading {} matches (generation {generation})", category.slug());
        match self.client.fetch_matches(category).await {
            Ok(matches) => NetworkResponse::MatchesLoaded { generation, matches },
            Err(e) => {
                error!("Error loading matches: {e}");
                NetworkResponse::MatchesFailed { generation, message: LOAD_FAILED_MESSAGE.to_string() }
            }
        }
    }

    async fn handle_refresh_viewers(&self, generation: u64, targets: Vec<ViewerTarget>) -> NetworkResponse {
        debug!("refreshing viewers for {} sources (generation {generation})", targets.len());
        let results = aggregator::collect_viewers(&self.client, targets).await;
        let totals = aggregator::sum_viewers(&results);
        NetworkResponse::ViewersUpdated { generation, totals }
    }

    async fn handle_load_search_index(&self) -> Result<NetworkResponse, ApiError> {
        debug!("loading search index");
        let matches = self.client.fetch_matches(Category::All).await?;
        Ok(NetworkResponse::SearchIndexLoaded { matches })
    }

    async fn handle_load_category_board(&self) -> Result<NetworkResponse, ApiError> {
        debug!("loading category board");
        let live = self.client.fetch_live_matches().await?;
        let targets: Vec<ViewerTarget> = live
            .iter()
            .flat_map(|m| {
                m.sources.iter().map(|source| ViewerTarget {
                    match_id: m.id.clone(),
                    category: m.category.clone(),
                    source: source.clone(),
                })
            })
            .collect();
        let results = aggregator::collect_viewers(&self.client, targets).await;
        let ranking = aggregator::rank_categories(&aggregator::category_totals(&results));
        Ok(NetworkResponse::CategoryBoardLoaded { ranking })
    }

    async fn handle_load_discord_invite(&self, guild_id: String) -> NetworkResponse {
        debug!("resolving discord invite for guild {guild_id}");
        let invite = self.client.fetch_discord_invite(&guild_id).await;
        NetworkResponse::DiscordInviteLoaded { invite }
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Run one request through a worker and return the first non-spinner
    /// response.
    async fn roundtrip(client: StreamsApi, request: NetworkRequest) -> NetworkResponse {
        let (req_tx, req_rx) = mpsc::channel(4);
        let (resp_tx, mut resp_rx) = mpsc::channel(100);
        tokio::spawn(NetworkWorker::new(client, req_rx, resp_tx).run());
        req_tx.send(request).await.unwrap();
        loop {
            match resp_rx.recv().await.unwrap() {
                NetworkResponse::LoadingStateChanged { .. } => continue,
                other => return other,
            }
        }
    }

    #[tokio::test]
    async fn failed_listing_is_tagged_with_generation() {
        let mut server = mockito::Server::new_async().await;
        let _m = server.mock("GET", "/matches/golf").with_status(503).create_async().await;

        let client = StreamsApi::new().with_base_url(server.url());
        let response = roundtrip(client, NetworkRequest::LoadMatches { category: Category::Golf, generation: 7 }).await;
        match response {
            NetworkResponse::MatchesFailed { generation, message } => {
                assert_eq!(generation, 7);
                assert_eq!(message, LOAD_FAILED_MESSAGE);
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn loaded_listing_carries_generation() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/matches/all")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":"a","title":"A vs B","category":"football","date":1773496800000,"popular":true,"sources":[]}]"#)
            .create_async()
            .await;

        let client = StreamsApi::new().with_base_url(server.url());
        let response = roundtrip(client, NetworkRequest::LoadMatches { category: Category::All, generation: 2 }).await;
        match response {
            NetworkResponse::MatchesLoaded { generation, matches } => {
                assert_eq!(generation, 2);
                assert_eq!(matches.len(), 1);
                assert_eq!(matches[0].title, "A vs B");
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn category_board_ranks_live_viewers() {
        let mut server = mockito::Server::new_async().await;
        let _live = server
            .mock("GET", "/matches/live")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"id":"f1","category":"mma","sources":[{"source":"alpha","id":"f1"}]},
                    {"id":"t1","category":"tennis","sources":[{"source":"bravo","id":"t1"}]}
                ]"#,
            )
            .create_async()
            .await;
        let _fight = server
            .mock("GET", "/stream/alpha/f1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"viewers":900}]"#)
            .create_async()
            .await;
        let _tennis = server
            .mock("GET", "/stream/bravo/t1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"viewers":40}]"#)
            .create_async()
            .await;

        let client = StreamsApi::new().with_base_url(server.url());
        match roundtrip(client, NetworkRequest::LoadCategoryBoard).await {
            NetworkResponse::CategoryBoardLoaded { ranking } => {
                assert_eq!(ranking[0], (Category::Fight, 900));
                assert_eq!(ranking[1], (Category::Tennis, 40));
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }
}
