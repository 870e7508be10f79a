use crate::state::filters::FilterState;
use reqwest::Url;
use streams_api::Category;

/// Default page the route is written against when no base is known.
pub const DEFAULT_PAGE: &str = "https://buffstreams.world/Schedule/";

/// Category + filter selection, as carried by a schedule page URL:
/// `/Schedule/?live=true&popular=true&source=alpha#/Football`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Route {
    pub category: Category,
    pub filters: FilterState,
}

impl Route {
    #[cfg(test)]
    pub fn new(category: Category, filters: FilterState) -> Self {
        Self { category, filters }
    }

    /// Parse a full URL, a path with query/fragment, or a bare fragment such
    /// as `#/football`. Unknown categories fall back to `All`; unknown or
    /// malformed params fall back to their defaults.
    pub fn parse(input: &str) -> Self {
        let Ok(page) = Url::parse(DEFAULT_PAGE) else {
            return Self::default();
        };
        let Ok(url) = page.join(input.trim()) else {
            return Self::default();
        };
        Self::from_url(&url)
    }

    pub fn from_url(url: &Url) -> Self {
        let category = url
            .fragment()
            .map(|f| f.trim_start_matches('/'))
            .and_then(Category::from_slug)
            .unwrap_or_default();

        let mut filters = FilterState::default();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "live" => filters.live = value == "true",
                "popular" => filters.popular = value == "true",
                "source" => {
                    let source = value.trim().to_ascii_lowercase();
                    filters.source = match source.as_str() {
                        "" | "all" => None,
                        _ => Some(source),
                    };
                }
                _ => {}
            }
        }

        Self { category, filters }
    }

    /// Rewrite `base` so it carries this route. Only non-default params are
    /// written; existing query params and fragment are replaced.
    pub fn to_url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        url.set_query(None);
        if !self.filters.is_default() {
            let mut query = url.query_pairs_mut();
            if self.filters.live {
                query.append_pair("live", "true");
            }
            if self.filters.popular {
                query.append_pair("popular", "true");
            }
            if let Some(source) = &self.filters.source {
                query.append_pair("source", source);
            }
        }
        url.set_fragment(Some(&format!("/{}", capitalize(self.category.slug()))));
        url
    }

    /// Short form shown in the header: `?live=true#/Football`.
    pub fn display(&self) -> String {
        let Ok(page) = Url::parse(DEFAULT_PAGE) else {
            return String::new();
        };
        let url = self.to_url(&page);
        let query = url.query().map(|q| format!("?{q}")).unwrap_or_default();
        let fragment = url.fragment().map(|f| format!("#{f}")).unwrap_or_default();
        format!("{query}{fragment}")
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}
