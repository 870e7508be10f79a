use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use log::debug;
use std::collections::HashMap;
use streams_api::client::StreamsApi;
use streams_api::{Category, Match, SourceRef, Stream};

/// Order categories are listed in before viewer counts are known.
pub const BOARD_ORDER: [Category; 15] = [
    Category::Basketball,
    Category::Football,
    Category::AmericanFootball,
    Category::Hockey,
    Category::Baseball,
    Category::MotorSports,
    Category::Fight,
    Category::Tennis,
    Category::Rugby,
    Category::Golf,
    Category::Billiards,
    Category::Afl,
    Category::Darts,
    Category::Cricket,
    Category::Other,
];

/// One (match, source) pair whose streams should be polled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerTarget {
    pub match_id: String,
    pub category: String,
    pub source: SourceRef,
}

/// Streams reported for a target. A failed fetch yields no streams.
#[derive(Debug, Clone)]
pub struct SourceViewers {
    pub target: ViewerTarget,
    pub streams: Vec<Stream>,
}

/// Every source of every match that has started.
pub fn viewer_targets(matches: &[Match], now: DateTime<Utc>) -> Vec<ViewerTarget> {
    matches
        .iter()
        .filter(|m| m.is_live(now))
        .flat_map(|m| {
            m.sources.iter().map(move |source| ViewerTarget {
                match_id: m.id.clone(),
                category: m.category.clone(),
                source: source.clone(),
            })
        })
        .collect()
}

/// Poll every target concurrently and wait for all of them to settle.
/// Failures count as zero viewers for that source.
pub async fn collect_viewers(api: &StreamsApi, targets: Vec<ViewerTarget>) -> Vec<SourceViewers> {
    let fetches = targets.into_iter().map(|target| async move {
        let streams = match api.fetch_streams(&target.source).await {
            Ok(streams) => streams,
            Err(e) => {
                debug!("viewer fetch failed for {}/{}: {e}", target.source.source, target.source.id);
                Vec::new()
            }
        };
        SourceViewers { target, streams }
    });
    join_all(fetches).await
}

/// Total viewers per match id across all of its sources.
pub fn sum_viewers(results: &[SourceViewers]) -> HashMap<String, u64> {
    let mut totals: HashMap<String, u64> = HashMap::new();
    for result in results {
        let total = totals.entry(result.target.match_id.clone()).or_default();
        *total = total.saturating_add(stream_viewers(result));
    }
    totals
}

// Upstream counts are unbounded; saturate rather than wrap.
fn stream_viewers(result: &SourceViewers) -> u64 {
    result.streams.iter().map(|s| s.viewers).fold(0, u64::saturating_add)
}

/// Write new totals into the cache. Zero totals are never written so a failed
/// poll cannot wipe a known count. Returns whether any match changed.
pub fn apply_viewer_counts(cache: &mut [Match], totals: &HashMap<String, u64>) -> bool {
    let mut changed = false;
    for m in cache.iter_mut() {
        if let Some(&total) = totals.get(&m.id)
            && total > 0
            && total != m.viewers
        {
            m.viewers = total;
            changed = true;
        }
    }
    changed
}

/// Total viewers per category, with fight sports folded together.
pub fn category_totals(results: &[SourceViewers]) -> HashMap<Category, u64> {
    let mut totals: HashMap<Category, u64> = HashMap::new();
    for result in results {
        let Some(category) = Category::from_match_category(&result.target.category) else {
            continue;
        };
        let total = totals.entry(category).or_default();
        *total = total.saturating_add(stream_viewers(result));
    }
    totals
}

/// Board categories, most watched first. Ties keep the default order.
pub fn rank_categories(totals: &HashMap<Category, u64>) -> Vec<(Category, u64)> {
    let mut ranking: Vec<(Category, u64)> = BOARD_ORDER
        .iter()
        .map(|c| (*c, totals.get(c).copied().unwrap_or(0)))
        .collect();
    ranking.sort_by(|a, b| b.1.cmp(&a.1));
    ranking
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 20, 0, 0).unwrap()
    }

    fn source(name: &str, id: &str) -> SourceRef {
        SourceRef { source: name.into(), id: id.into() }
    }

    fn target(match_id: &str, category: &str, src: SourceRef) -> ViewerTarget {
        ViewerTarget { match_id: match_id.into(), category: category.into(), source: src }
    }

    fn result(match_id: &str, category: &str, viewers: &[u64]) -> SourceViewers {
        SourceViewers {
            target: target(match_id, category, source("alpha", match_id)),
            streams: viewers.iter().map(|v| Stream { viewers: *v }).collect(),
        }
    }

    #[test]
    fn targets_only_cover_started_matches_with_sources() {
        let cache = vec![
            Match {
                id: "live".into(),
                date: now() - Duration::minutes(5),
                category: "hockey".into(),
                sources: vec![source("alpha", "a1"), source("bravo", "b1")],
                ..Default::default()
            },
            Match {
                id: "no-sources".into(),
                date: now() - Duration::minutes(5),
                ..Default::default()
            },
            Match {
                id: "upcoming".into(),
                date: now() + Duration::minutes(5),
                sources: vec![source("alpha", "a2")],
                ..Default::default()
            },
        ];
        let targets = viewer_targets(&cache, now());
        assert_eq!(
            targets,
            vec![
                target("live", "hockey", source("alpha", "a1")),
                target("live", "hockey", source("bravo", "b1")),
            ]
        );
    }

    #[test]
    fn totals_sum_streams_across_sources() {
        let results = vec![
            result("m1", "football", &[100, 250]),
            result("m1", "football", &[]),
            result("m1", "football", &[150]),
            result("m2", "golf", &[]),
        ];
        let totals = sum_viewers(&results);
        assert_eq!(totals.get("m1"), Some(&500));
        assert_eq!(totals.get("m2"), Some(&0));
    }

    #[test]
    fn huge_counts_saturate_instead_of_overflowing() {
        let results = vec![
            result("m1", "mma", &[u64::MAX, 5]),
            result("m1", "mma", &[u64::MAX]),
        ];
        assert_eq!(sum_viewers(&results).get("m1"), Some(&u64::MAX));
        assert_eq!(category_totals(&results).get(&Category::Fight), Some(&u64::MAX));
    }

    #[test]
    fn apply_reports_change_only_for_new_nonzero_values() {
        let mut cache = vec![
            Match { id: "a".into(), viewers: 0, ..Default::default() },
            Match { id: "b".into(), viewers: 42, ..Default::default() },
        ];

        let totals = HashMap::from([("a".to_string(), 500)]);
        assert!(apply_viewer_counts(&mut cache, &totals));
        assert_eq!(cache[0].viewers, 500);

        // Same value again: nothing to redraw.
        assert!(!apply_viewer_counts(&mut cache, &totals));

        // A zero total leaves the last known count alone.
        let zero = HashMap::from([("b".to_string(), 0)]);
        assert!(!apply_viewer_counts(&mut cache, &zero));
        assert_eq!(cache[1].viewers, 42);
    }

    #[test]
    fn category_totals_fold_fight_sports() {
        let results = vec![
            result("m1", "mma", &[300]),
            result("m2", "boxing", &[200]),
            result("m3", "fight", &[1]),
            result("m4", "basketball", &[1000]),
            result("m5", "", &[77]),
        ];
        let totals = category_totals(&results);
        assert_eq!(totals.get(&Category::Fight), Some(&501));
        assert_eq!(totals.get(&Category::Basketball), Some(&1000));
        assert_eq!(totals.len(), 2);
    }

    #[test]
    fn ranking_is_stable_for_ties() {
        let totals = HashMap::from([(Category::Darts, 50), (Category::Golf, 50), (Category::Tennis, 900)]);
        let ranking = rank_categories(&totals);
        assert_eq!(ranking[0], (Category::Tennis, 900));
        assert_eq!(ranking[1], (Category::Golf, 50));
        assert_eq!(ranking[2], (Category::Darts, 50));
        // Zero-viewer categories follow in board order.
        assert_eq!(ranking[3], (Category::Basketball, 0));
        assert_eq!(ranking.len(), BOARD_ORDER.len());
    }

    #[tokio::test]
    async fn collect_settles_every_fetch() {
        let mut server = mockito::Server::new_async().await;
        let ok = server
            .mock("GET", "/stream/alpha/good")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"viewers": 320}, {"viewers": 180}]"#)
            .create_async()
            .await;
        let failing = server.mock("GET", "/stream/bravo/bad").with_status(500).create_async().await;

        let api = StreamsApi::new().with_base_url(server.url());
        let targets = vec![
            target("m1", "football", source("alpha", "good")),
            target("m1", "football", source("bravo", "bad")),
        ];
        let results = collect_viewers(&api, targets).await;

        ok.assert_async().await;
        failing.assert_async().await;
        assert_eq!(results.len(), 2);
        assert_eq!(sum_viewers(&results).get("m1"), Some(&500));
    }

    #[tokio::test]
    async fn collect_handles_out_of_range_counts() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/stream/alpha/big")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"viewers": 1e20}, {"viewers": 5}]"#)
            .create_async()
            .await;

        let api = StreamsApi::new().with_base_url(server.url());
        let results = collect_viewers(&api, vec![target("m1", "football", source("alpha", "big"))]).await;

        assert_eq!(sum_viewers(&results).get("m1"), Some(&u64::MAX));
    }
}
