pub mod client;
pub mod wire;

use chrono::{DateTime, Utc};

// ---------------------------------------------------------------------------
// Domain types, independent of the streams wire format
// ---------------------------------------------------------------------------

/// Upstream stream providers known to the listing API. Ordered the way the
/// source filter cycles through them.
pub const KNOWN_SOURCES: [&str; 9] = [
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "intel",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Match {
    pub id: String,
    pub title: String,
    /// Scheduled start. Never changes after fetch.
    pub date: DateTime<Utc>,
    pub category: String,
    pub popular: bool,
    /// Aggregated viewer count across all sources. Starts at 0 and is
    /// updated in place by the viewer aggregation pass.
    pub viewers: u64,
    pub league: Option<String>,
    pub teams: Option<Teams>,
    pub sources: Vec<SourceRef>,
    pub poster: Option<String>,
}

impl Match {
    /// A match is live once its scheduled start is reached (inclusive).
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.date <= now
    }

    pub fn home_name(&self) -> Option<&str> {
        self.teams.as_ref()?.home.as_ref().map(|t| t.name.as_str())
    }

    pub fn away_name(&self) -> Option<&str> {
        self.teams.as_ref()?.away.as_ref().map(|t| t.name.as_str())
    }

    /// Whether any of the match's sources is served by `source` (case-insensitive).
    pub fn has_source(&self, source: &str) -> bool {
        self.sources.iter().any(|s| s.source.eq_ignore_ascii_case(source))
    }

    /// Poster image for the card.
    ///
    /// Preference order: generated poster from both team badges, then the
    /// match's own poster (absolute, site-relative or a proxy key), then the
    /// site's fallback image.
    pub fn poster_url(&self, api_base: &str, site_base: &str) -> String {
        let badges = self.teams.as_ref().and_then(|t| {
            let home = t.home.as_ref()?.badge.as_deref()?;
            let away = t.away.as_ref()?.badge.as_deref()?;
            Some((home, away))
        });
        if let Some((home, away)) = badges {
            return format!("{api_base}/images/poster/{home}/{away}.webp");
        }

        match self.poster.as_deref().map(str::trim) {
            Some(p) if p.starts_with("http") => p.to_string(),
            Some(p) if p.starts_with('/') => {
                let host = api_base
                    .find("://")
                    .and_then(|i| api_base[i + 3..].find('/').map(|j| &api_base[..i + 3 + j]))
                    .unwrap_or(api_base);
                if p.ends_with(".webp") {
                    format!("{host}{p}")
                } else {
                    format!("{host}{p}.webp")
                }
            }
            Some(p) if !p.is_empty() => format!("{api_base}/images/proxy/{p}.webp"),
            _ => format!("{site_base}/Fallbackimage.webp"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Teams {
    pub home: Option<Team>,
    pub away: Option<Team>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Team {
    pub name: String,
    pub badge: Option<String>,
}

/// Identifies one live-stream provider entry for a match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SourceRef {
    pub source: String,
    pub id: String,
}

/// One stream reported by a source. Only the viewer count is used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stream {
    pub viewers: u64,
}

/// Sport classification. Selects the API endpoint and the UI label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    #[default]
    All,
    Football,
    Basketball,
    Baseball,
    MotorSports,
    AmericanFootball,
    Afl,
    Fight,
    Hockey,
    Tennis,
    Rugby,
    Golf,
    Billiards,
    Cricket,
    Darts,
    Other,
}

impl Category {
    pub const ALL: [Category; 16] = [
        Category::All,
        Category::Football,
        Category::Basketball,
        Category::Baseball,
        Category::MotorSports,
        Category::AmericanFootball,
        Category::Afl,
        Category::Fight,
        Category::Hockey,
        Category::Tennis,
        Category::Rugby,
        Category::Golf,
        Category::Billiards,
        Category::Cricket,
        Category::Darts,
        Category::Other,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Category::All => "all",
            Category::Football => "football",
            Category::Basketball => "basketball",
            Category::Baseball => "baseball",
            Category::MotorSports => "motor-sports",
            Category::AmericanFootball => "american-football",
            Category::Afl => "afl",
            Category::Fight => "fight",
            Category::Hockey => "hockey",
            Category::Tennis => "tennis",
            Category::Rugby => "rugby",
            Category::Golf => "golf",
            Category::Billiards => "billiards",
            Category::Cricket => "cricket",
            Category::Darts => "darts",
            Category::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::All => "All Sports",
            Category::Football => "Football",
            Category::Basketball => "Basketball",
            Category::Baseball => "Baseball",
            Category::MotorSports => "Motor Sports",
            Category::AmericanFootball => "American Football",
            Category::Afl => "AFL",
            Category::Fight => "Fight",
            Category::Hockey => "Hockey",
            Category::Tennis => "Tennis",
            Category::Rugby => "Rugby",
            Category::Golf => "Golf",
            Category::Billiards => "Billiards",
            Category::Cricket => "Cricket",
            Category::Darts => "Darts",
            Category::Other => "Other",
        }
    }

    /// Case-insensitive lookup by slug. Unknown slugs return `None`.
    pub fn from_slug(slug: &str) -> Option<Self> {
        let slug = slug.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|c| c.slug() == slug)
    }

    /// Category a raw match category string counts towards on the category
    /// board. Combat sports are reported individually but shown under Fight.
    pub fn from_match_category(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mma" | "boxing" => Some(Category::Fight),
            other => Self::from_slug(other).filter(|c| *c != Category::All),
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}
