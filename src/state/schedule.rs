use chrono::{DateTime, Duration, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};
use streams_api::{Category, Match};

pub const LOAD_FAILED_MESSAGE: &str =
    "Could not load matches. Please check your connection and try again.";
pub const NO_FILTER_RESULTS_MESSAGE: &str = "No matches found with the selected filters.";

pub fn empty_category_message(category: Category) -> String {
    format!("No matches found for {}. Check back later!", category.label())
}

/// Base URLs used to derive card links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Links {
    pub api_base: String,
    pub site_base: String,
}

impl Links {
    pub fn watch_url(&self, match_id: &str) -> String {
        format!("{}/Matchinformation/?id={match_id}", self.site_base)
    }
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Filtered matches partitioned into display buckets. Every input match lands
/// in exactly one of `live_with_viewers`, one `days` entry, or `recurring`.
#[derive(Debug)]
pub struct Grouping<'a> {
    /// Matches reporting viewers, most watched first.
    pub live_with_viewers: Vec<&'a Match>,
    /// Matches from the start of today onward, bucketed by local calendar day
    /// in ascending day order, each bucket ascending by start.
    pub days: Vec<DayGroup<'a>>,
    /// Matches dated before today (always-on content), newest first.
    pub recurring: Vec<&'a Match>,
    pub today: NaiveDate,
}

#[derive(Debug)]
pub struct DayGroup<'a> {
    pub date: NaiveDate,
    /// ISO-8601 instant of the local day start, e.g. `2026-03-14T00:00:00.000Z`.
    pub key: String,
    pub matches: Vec<&'a Match>,
}

impl Grouping<'_> {
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.live_with_viewers.len()
            + self.days.iter().map(|d| d.matches.len()).sum::<usize>()
            + self.recurring.len()
    }

    pub fn today_group(&self) -> Option<&DayGroup<'_>> {
        self.days.iter().find(|d| d.date == self.today)
    }
}

pub fn group_matches<'a, Tz: TimeZone>(matches: &[&'a Match], now: &DateTime<Tz>) -> Grouping<'a> {
    let tz = now.timezone();
    let today = now.date_naive();
    let today_start = start_of_day(today, &tz).with_timezone(&Utc);

    let (mut live_with_viewers, other): (Vec<&Match>, Vec<&Match>) =
        matches.iter().copied().partition(|m| m.viewers > 0);

    live_with_viewers.sort_by(|a, b| b.viewers.cmp(&a.viewers).then_with(|| b.date.cmp(&a.date)));

    let (mut upcoming, mut recurring): (Vec<&Match>, Vec<&Match>) =
        other.into_iter().partition(|m| m.date >= today_start);

    upcoming.sort_by(|a, b| a.date.cmp(&b.date));
    recurring.sort_by(|a, b| b.date.cmp(&a.date));

    // Upcoming is sorted by start, so calendar days arrive in order.
    let mut days: Vec<DayGroup> = Vec::new();
    for m in upcoming {
        let date = m.date.with_timezone(&tz).date_naive();
        match days.last_mut() {
            Some(group) if group.date == date => group.matches.push(m),
            _ => days.push(DayGroup { date, key: day_key(date, &tz), matches: vec![m] }),
        }
    }

    Grouping { live_with_viewers, days, recurring, today }
}

fn start_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Tz> {
    let midnight = date.and_time(NaiveTime::MIN);
    // Midnight can fall inside a DST gap; take the first valid local time.
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight))
}

/// Bucket key for a local calendar day: its start instant as an ISO string.
pub fn day_key<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> String {
    start_of_day(date, tz)
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ---------------------------------------------------------------------------
// Render plan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionKind {
    Today,
    Day(NaiveDate),
    Recurring,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub kind: SectionKind,
    /// `TODAY`, `SAT`, `24/7 FREE`.
    pub title: String,
    /// `14 MAR`; empty for the recurring section.
    pub date_label: String,
    pub cards: Vec<CardView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Badge {
    /// Formatted viewer count, e.g. `1.3k`.
    Viewers(String),
    Live,
    /// Start time today or start date later, e.g. `3:05 PM` / `Mar 14`.
    Date(String),
}

/// Everything a card shows, computed ahead of drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub match_id: String,
    pub title: String,
    pub category: String,
    pub badge: Badge,
    /// Secondary time text next to the category.
    pub meta: String,
    pub popular: bool,
    pub sources: Vec<String>,
    pub watch_url: String,
    pub poster_url: String,
}

/// What the schedule pane shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ScheduleView {
    #[default]
    Loading,
    /// A single message row in place of cards.
    Placeholder(String),
    Sections(Vec<Section>),
}

impl ScheduleView {
    pub fn cards(&self) -> impl Iterator<Item = &CardView> {
        let sections: &[Section] = match self {
            ScheduleView::Sections(sections) => sections,
            _ => &[],
        };
        sections.iter().flat_map(|s| s.cards.iter())
    }

    pub fn card_count(&self) -> usize {
        self.cards().count()
    }

    pub fn card_ids(&self) -> Vec<&str> {
        self.cards().map(|c| c.match_id.as_str()).collect()
    }
}

/// Turn a grouping into ordered sections: today (live-with-viewers first,
/// then today's upcoming), later days ascending, then 24/7 content.
pub fn build_sections<Tz: TimeZone>(grouping: &Grouping<'_>, now: &DateTime<Tz>, links: &Links) -> Vec<Section>
where
    Tz::Offset: std::fmt::Display,
{
    let mut sections = Vec::new();

    let today_cards: Vec<CardView> = grouping
        .live_with_viewers
        .iter()
        .chain(grouping.today_group().map(|g| g.matches.as_slice()).unwrap_or_default())
        .map(|m| card_view(m, now, links))
        .collect();
    if !today_cards.is_empty() {
        sections.push(Section {
            kind: SectionKind::Today,
            title: "TODAY".to_string(),
            date_label: now.format("%-d %b").to_string().to_uppercase(),
            cards: today_cards,
        });
    }

    let tz = now.timezone();
    for day in grouping.days.iter().filter(|d| d.date != grouping.today) {
        let day_start = start_of_day(day.date, &tz);
        sections.push(Section {
            kind: SectionKind::Day(day.date),
            title: day_start.format("%a").to_string().to_uppercase(),
            date_label: day_start.format("%-d %b").to_string().to_uppercase(),
            cards: day.matches.iter().map(|m| card_view(m, now, links)).collect(),
        });
    }

    if !grouping.recurring.is_empty() {
        sections.push(Section {
            kind: SectionKind::Recurring,
            title: "24/7 FREE".to_string(),
            date_label: String::new(),
            cards: grouping.recurring.iter().map(|m| card_view(m, now, links)).collect(),
        });
    }

    sections
}

pub fn card_view<Tz: TimeZone>(m: &Match, now: &DateTime<Tz>, links: &Links) -> CardView
where
    Tz::Offset: std::fmt::Display,
{
    let (date_badge, meta) = date_badge(m.date, now);
    let badge = if m.viewers > 0 {
        Badge::Viewers(format_viewers(m.viewers))
    } else {
        date_badge
    };

    CardView {
        match_id: m.id.clone(),
        title: if m.title.trim().is_empty() {
            "Untitled Match".to_string()
        } else {
            m.title.clone()
        },
        category: capitalize_first(&m.category).unwrap_or_else(|| "Unknown".to_string()),
        badge,
        meta,
        popular: m.popular,
        sources: m.sources.iter().map(|s| s.source.clone()).collect(),
        watch_url: links.watch_url(&m.id),
        poster_url: m.poster_url(&links.api_base, &links.site_base),
    }
}

/// Badge and meta text for a start time: `LIVE` + time once started, time +
/// `Today` later today, otherwise short date + time.
pub fn date_badge<Tz: TimeZone>(date: DateTime<Utc>, now: &DateTime<Tz>) -> (Badge, String)
where
    Tz::Offset: std::fmt::Display,
{
    let local = date.with_timezone(&now.timezone());
    let time = local.format("%-I:%M %p").to_string();
    if date <= now.with_timezone(&Utc) {
        (Badge::Live, time)
    } else if local.date_naive() == now.date_naive() {
        (Badge::Date(time), "Today".to_string())
    } else {
        (Badge::Date(local.format("%b %-d").to_string()), time)
    }
}

/// Compact viewer count: plain below 1000, otherwise thousands rounded to one
/// decimal with a trailing `.0` dropped (`1000 → 1k`, `1300 → 1.3k`).
pub fn format_viewers(viewers: u64) -> String {
    if viewers < 1000 {
        return viewers.to_string();
    }
    let tenths = viewers.saturating_add(50) / 100;
    let (whole, frac) = (tenths / 10, tenths % 10);
    if frac == 0 {
        format!("{whole}k")
    } else {
        format!("{whole}.{frac}k")
    }
}

fn capitalize_first(s: &str) -> Option<String> {
    let mut chars = s.trim().chars();
    let first = chars.next()?;
    Some(first.to_uppercase().collect::<String>() + chars.as_str())
}
