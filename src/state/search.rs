use streams_api::Match;

/// At most this many results are listed.
pub const MAX_RESULTS: usize = 12;

/// Free-text lookup over every known match.
#[derive(Debug, Default)]
pub struct SearchState {
    /// Every match across all categories, one record per id.
    pub index: Vec<Match>,
    pub index_loaded: bool,
    pub query: String,
    /// Typing into the query box.
    pub composing: bool,
    pub selected: usize,
}

impl SearchState {
    /// Replace the index. `StreamsApi` hands over matches already
    /// deduplicated by id.
    pub fn load_index(&mut self, matches: Vec<Match>) {
        self.index = matches;
        self.index_loaded = true;
        self.clamp_selection();
    }

    pub fn results(&self) -> Vec<&Match> {
        search(&self.index, &self.query)
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
        self.selected = 0;
    }

    pub fn pop_char(&mut self) {
        self.query.pop();
        self.selected = 0;
    }

    pub fn clear_query(&mut self) {
        self.query.clear();
        self.selected = 0;
    }

    pub fn select_down(&mut self) {
        let max = self.results().len().saturating_sub(1);
        if self.selected < max {
            self.selected += 1;
        }
    }

    pub fn select_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_match(&self) -> Option<&Match> {
        self.results().get(self.selected).copied()
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.results().len().saturating_sub(1));
    }
}

/// Case-insensitive substring match on title, league and team names. A blank
/// query yields nothing.
pub fn search<'a>(index: &'a [Match], query: &str) -> Vec<&'a Match> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    index
        .iter()
        .filter(|m| {
            [Some(m.title.as_str()), m.league.as_deref(), m.home_name(), m.away_name()]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .take(MAX_RESULTS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use streams_api::{Team, Teams};

    fn m(id: &str, title: &str) -> Match {
        Match { id: id.into(), title: title.into(), ..Default::default() }
    }

    #[test]
    fn matches_title_league_and_teams() {
        let index = vec![
            m("1", "Arsenal vs Chelsea"),
            Match { league: Some("NBA".into()), ..m("2", "Game 7") },
            Match {
                teams: Some(Teams {
                    home: Some(Team { name: "Boston Bruins".into(), badge: None }),
                    away: None,
                }),
                ..m("3", "Hockey Night")
            },
        ];
        let ids = |q: &str| search(&index, q).iter().map(|m| m.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids("chelsea"), vec!["1"]);
        assert_eq!(ids("nba"), vec!["2"]);
        assert_eq!(ids("BRUINS"), vec!["3"]);
        assert!(ids("curling").is_empty());
    }

    #[test]
    fn blank_query_yields_nothing() {
        let index = vec![m("1", "Anything")];
        assert!(search(&index, "   ").is_empty());
    }

    #[test]
    fn results_are_capped() {
        let index: Vec<Match> = (0..30).map(|i| m(&i.to_string(), "Derby")).collect();
        assert_eq!(search(&index, "derby").len(), MAX_RESULTS);
    }

    #[test]
    fn reloading_index_clamps_selection() {
        let mut state = SearchState::default();
        state.load_index(vec![m("1", "Final"), m("2", "Final")]);
        state.push_char('f');
        state.select_down();
        assert_eq!(state.selected, 1);

        state.load_index(vec![m("1", "Final")]);
        assert!(state.index_loaded);
        assert_eq!(state.selected, 0);
        assert_eq!(state.selected_match().map(|m| m.id.as_str()), Some("1"));
    }

    #[test]
    fn typing_resets_selection() {
        let mut state = SearchState::default();
        state.load_index(vec![m("1", "Final"), m("2", "Final"), m("3", "Semi final")]);
        state.push_char('f');
        state.select_down();
        state.select_down();
        state.select_down();
        assert_eq!(state.selected, 2);
        assert_eq!(state.selected_match().map(|m| m.id.as_str()), Some("3"));

        state.push_char('i');
        assert_eq!(state.selected, 0);
        state.pop_char();
        state.pop_char();
        assert!(state.results().is_empty());
    }
}
