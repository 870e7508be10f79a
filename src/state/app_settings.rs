use crate::state::schedule::Links;
use log::LevelFilter;
use streams_api::client::{StreamsApi, STREAMS_API};

pub const DEFAULT_SITE_BASE: &str = "https://buffstreams.world";
pub const DEFAULT_DISCORD_GUILD: &str = "1422384816472457288";

pub const ENV_API_BASE: &str = "STREAMTUI_API_BASE";
pub const ENV_SITE_BASE: &str = "STREAMTUI_SITE_BASE";
pub const ENV_DISCORD_GUILD: &str = "STREAMTUI_DISCORD_GUILD";
pub const ENV_LOG: &str = "STREAMTUI_LOG";

#[derive(Debug, Clone, PartialEq)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    pub api_base: String,
    pub site_base: String,
    pub discord_guild: String,
    /// Route given on the command line, e.g. `?live=true#/football`.
    pub initial_route: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: None,
            api_base: STREAMS_API.to_string(),
            site_base: DEFAULT_SITE_BASE.to_string(),
            discord_guild: DEFAULT_DISCORD_GUILD.to_string(),
            initial_route: None,
        }
    }
}

impl AppSettings {
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from a variable lookup. Blank values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();
        Self {
            full_screen: false,
            log_level: get(ENV_LOG).and_then(|level| level.parse::<LevelFilter>().ok()),
            api_base: get(ENV_API_BASE).unwrap_or(defaults.api_base),
            site_base: get(ENV_SITE_BASE).unwrap_or(defaults.site_base),
            discord_guild: get(ENV_DISCORD_GUILD).unwrap_or(defaults.discord_guild),
            initial_route: None,
        }
    }

    pub fn with_initial_route(mut self, route: Option<String>) -> Self {
        self.initial_route = route;
        self
    }

    pub fn links(&self) -> Links {
        Links { api_base: self.api_base.clone(), site_base: self.site_base.clone() }
    }

    pub fn api_client(&self) -> StreamsApi {
        StreamsApi::new().with_base_url(self.api_base.clone())
    }
}
