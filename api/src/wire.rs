// Streams API wire types. Every field is optional: upstream payloads are
// loosely shaped and records are cleaned up during mapping.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireMatch {
    pub id: Option<serde_json::Value>,
    pub title: Option<String>,
    pub category: Option<String>,
    /// Epoch milliseconds.
    pub date: Option<i64>,
    pub popular: Option<bool>,
    pub poster: Option<String>,
    pub league: Option<String>,
    pub teams: Option<WireTeams>,
    pub sources: Option<Vec<WireSource>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireTeams {
    pub home: Option<WireTeam>,
    pub away: Option<WireTeam>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireTeam {
    pub name: Option<String>,
    pub badge: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireSource {
    pub source: Option<String>,
    pub id: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireStream {
    pub viewers: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscordWidget {
    pub instant_invite: Option<String>,
}
