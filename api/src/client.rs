use crate::wire::{DiscordWidget, WireMatch, WireSource, WireStream, WireTeam};
use crate::{Category, Match, SourceRef, Stream, Team, Teams};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const STREAMS_API: &str = "https://streamed.pk/api";
pub const DISCORD_API: &str = "https://discord.com/api";
pub const DISCORD_FALLBACK_INVITE: &str = "https://discord.gg/buffstreams";

/// Client for the match listing API and the community widget.
#[derive(Debug, Clone)]
pub struct StreamsApi {
    client: Client,
    base_url: String,
    discord_url: String,
    timeout: Duration,
}

impl Default for StreamsApi {
    fn default() -> Self {
        Self {
            client: Client::builder()
                .user_agent("streamtui/0.1 (terminal schedule viewer)")
                .build()
                .unwrap_or_default(),
            base_url: STREAMS_API.to_string(),
            discord_url: DISCORD_API.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl StreamsApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_discord_url(mut self, discord_url: impl Into<String>) -> Self {
        self.discord_url = discord_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Fetch the match list for a category (`/matches/all` for `Category::All`).
    /// Records without an id are dropped and duplicate ids keep the first record.
    pub async fn fetch_matches(&self, category: Category) -> ApiResult<Vec<Match>> {
        let url = format!("{}/matches/{}", self.base_url, category.slug());
        let raw: Vec<WireMatch> = self.get(&url).await?;
        Ok(normalize_matches(raw))
    }

    /// Fetch the matches the API currently reports as live.
    pub async fn fetch_live_matches(&self) -> ApiResult<Vec<Match>> {
        let url = format!("{}/matches/live", self.base_url);
        let raw: Vec<WireMatch> = self.get(&url).await?;
        Ok(normalize_matches(raw))
    }

    /// Fetch the streams one source offers for a match. A non-2xx answer means
    /// the source has nothing for this match and yields an empty list.
    pub async fn fetch_streams(&self, source: &SourceRef) -> ApiResult<Vec<Stream>> {
        let url = format!("{}/stream/{}/{}", self.base_url, source.source, source.id);
        let raw: Vec<WireStream> = self.get_or_default(&url).await?;
        Ok(raw.iter().map(map_stream).collect())
    }

    /// Resolve the community invite link. Never fails: any problem falls back
    /// to the static invite.
    pub async fn fetch_discord_invite(&self, guild_id: &str) -> String {
        let url = format!("{}/guilds/{guild_id}/widget.json", self.discord_url);
        match self.get::<DiscordWidget>(&url).await {
            Ok(widget) => widget
                .instant_invite
                .filter(|i| !i.trim().is_empty())
                .unwrap_or_else(|| DISCORD_FALLBACK_INVITE.to_string()),
            Err(_) => DISCORD_FALLBACK_INVITE.to_string(),
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        response
            .error_for_status()
            .map_err(|e| ApiError::Api(e, url.to_owned()))?
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parsing(e, url.to_owned()))
    }

    async fn get_or_default<T: Default + serde::de::DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        if !response.status().is_success() {
            return Ok(T::default());
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parsing(e, url.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Mapping: wire types → clean domain types
// ---------------------------------------------------------------------------

fn normalize_matches(raw: Vec<WireMatch>) -> Vec<Match> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .filter_map(map_match)
        .filter(|m| seen.insert(m.id.clone()))
        .collect()
}

fn map_match(raw: WireMatch) -> Option<Match> {
    let id = raw.id.as_ref().and_then(value_to_id)?;

    // Records without a date sort as the oldest 24/7 content.
    let date = raw
        .date
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .unwrap_or_default();

    let teams = raw.teams.map(|t| Teams {
        home: t.home.and_then(map_team),
        away: t.away.and_then(map_team),
    });

    let sources = raw
        .sources
        .unwrap_or_default()
        .into_iter()
        .filter_map(map_source)
        .collect();

    Some(Match {
        id,
        title: raw.title.unwrap_or_default(),
        date,
        category: raw.category.unwrap_or_default(),
        popular: raw.popular.unwrap_or(false),
        viewers: 0,
        league: raw.league,
        teams,
        sources,
        poster: raw.poster.filter(|p| !p.trim().is_empty()),
    })
}

fn map_team(raw: WireTeam) -> Option<Team> {
    let name = raw.name.filter(|n| !n.trim().is_empty())?;
    Some(Team { name, badge: raw.badge.filter(|b| !b.trim().is_empty()) })
}

fn map_source(raw: WireSource) -> Option<SourceRef> {
    let source = raw.source.filter(|s| !s.trim().is_empty())?;
    let id = raw.id.as_ref().and_then(value_to_id)?;
    Some(SourceRef { source, id })
}

fn map_stream(raw: &WireStream) -> Stream {
    let viewers = raw
        .viewers
        .as_ref()
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|v| v.round() as u64)
        .unwrap_or(0);
    Stream { viewers }
}

fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wire(value: Value) -> Vec<WireMatch> {
        serde_json::from_value(value).expect("wire payload should decode")
    }

    #[test]
    fn records_without_id_are_dropped() {
        let matches = normalize_matches(wire(json!([
            { "title": "No id", "date": 1 },
            { "id": "", "title": "Blank id" },
            { "id": "a", "title": "Kept", "date": 1700000000000i64 }
        ])));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "a");
        assert_eq!(matches[0].date.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn duplicate_ids_keep_first_record() {
        let matches = normalize_matches(wire(json!([
            { "id": "a", "title": "First" },
            { "id": "a", "title": "Second" },
            { "id": 7, "title": "Numeric" }
        ])));
        let titles: Vec<&str> = matches.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Numeric"]);
        assert_eq!(matches[1].id, "7");
    }

    #[test]
    fn missing_fields_get_defaults() {
        let matches = normalize_matches(wire(json!([{ "id": "a" }])));
        let m = &matches[0];
        assert_eq!(m.viewers, 0);
        assert!(!m.popular);
        assert!(m.sources.is_empty());
        assert_eq!(m.date.timestamp_millis(), 0);
    }

    #[test]
    fn sources_and_teams_are_cleaned() {
        let matches = normalize_matches(wire(json!([{
            "id": "a",
            "popular": true,
            "teams": { "home": { "name": "Lions", "badge": "l1" }, "away": { "name": "" } },
            "sources": [
                { "source": "alpha", "id": "s1" },
                { "source": "", "id": "s2" },
                { "source": "bravo" }
            ]
        }])));
        let m = &matches[0];
        assert!(m.popular);
        assert_eq!(m.home_name(), Some("Lions"));
        assert_eq!(m.away_name(), None);
        assert_eq!(m.sources, vec![SourceRef { source: "alpha".into(), id: "s1".into() }]);
    }

    #[test]
    fn stream_viewers_ignore_non_numbers() {
        let streams: Vec<WireStream> =
            serde_json::from_value(json!([{ "viewers": 120 }, { "viewers": "many" }, {}, { "viewers": -3 }]))
                .unwrap();
        let viewers: Vec<u64> = streams.iter().map(|s| map_stream(s).viewers).collect();
        assert_eq!(viewers, vec![120, 0, 0, 0]);
    }

    // -----------------------------------------------------------------------
    // HTTP behaviour against a mock server
    // -----------------------------------------------------------------------

    fn api_for(server: &mockito::Server) -> StreamsApi {
        StreamsApi::new()
            .with_base_url(server.url())
            .with_discord_url(server.url())
    }

    #[tokio::test]
    async fn fetch_matches_hits_category_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/matches/motor-sports")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":"f1","title":"Grand Prix","date":1700000000000,"category":"motor-sports"}]"#)
            .create_async()
            .await;

        let matches = api_for(&server).fetch_matches(Category::MotorSports).await.unwrap();
        mock.assert_async().await;
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].title, "Grand Prix");
    }

    #[tokio::test]
    async fn fetch_matches_all_uses_all_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/matches/all")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let matches = api_for(&server).fetch_matches(Category::All).await.unwrap();
        mock.assert_async().await;
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn fetch_matches_non_2xx_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _m1 = server.mock("GET", "/matches/football").with_status(503).create_async().await;

        let err = api_for(&server).fetch_matches(Category::Football).await.unwrap_err();
        assert!(matches!(err, ApiError::Api(_, _)), "got {err}");
    }

    #[tokio::test]
    async fn fetch_matches_malformed_body_is_a_parse_error() {
        let mut server = mockito::Server::new_async().await;
        let _m2 = server
            .mock("GET", "/matches/football")
            .with_status(200)
            .with_body(r#"{"not":"an array"}"#)
            .create_async()
            .await;

        let err = api_for(&server).fetch_matches(Category::Football).await.unwrap_err();
        assert!(matches!(err, ApiError::Parsing(_, _)), "got {err}");
    }

    #[tokio::test]
    async fn fetch_streams_non_2xx_is_empty() {
        let mut server = mockito::Server::new_async().await;
        let _m3 = server.mock("GET", "/stream/alpha/x1").with_status(404).create_async().await;

        let source = SourceRef { source: "alpha".into(), id: "x1".into() };
        let streams = api_for(&server).fetch_streams(&source).await.unwrap();
        assert!(streams.is_empty());
    }

    #[tokio::test]
    async fn fetch_streams_reads_viewers() {
        let mut server = mockito::Server::new_async().await;
        let _m4 = server
            .mock("GET", "/stream/bravo/x2")
            .with_status(200)
            .with_body(r#"[{"id":"x2","streamNo":1,"viewers":40},{"id":"x2","streamNo":2,"viewers":2}]"#)
            .create_async()
            .await;

        let source = SourceRef { source: "bravo".into(), id: "x2".into() };
        let streams = api_for(&server).fetch_streams(&source).await.unwrap();
        assert_eq!(streams, vec![Stream { viewers: 40 }, Stream { viewers: 2 }]);
    }

    #[tokio::test]
    async fn discord_invite_falls_back_when_missing() {
        let mut server = mockito::Server::new_async().await;
        let _m5 = server
            .mock("GET", "/guilds/42/widget.json")
            .with_status(200)
            .with_body(r#"{"id":"42","name":"guild"}"#)
            .create_async()
            .await;
        let _m6 = server.mock("GET", "/guilds/43/widget.json").with_status(403).create_async().await;
        let _m7 = server
            .mock("GET", "/guilds/44/widget.json")
            .with_status(200)
            .with_body(r#"{"instant_invite":"https://discord.com/invite/abc"}"#)
            .create_async()
            .await;

        let api = api_for(&server);
        assert_eq!(api.fetch_discord_invite("42").await, DISCORD_FALLBACK_INVITE);
        assert_eq!(api.fetch_discord_invite("43").await, DISCORD_FALLBACK_INVITE);
        assert_eq!(api.fetch_discord_invite("44").await, "https://discord.com/invite/abc");
    }
}
