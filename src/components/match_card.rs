use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::widgets::Widget;

use crate::state::countdown::CountdownPhase;
use crate::state::schedule::{Badge, CardView};

/// Rows per card: title line, detail line.
pub const CARD_HEIGHT: u16 = 2;

/// Width reserved for the badge column.
const BADGE_WIDTH: usize = 9;

const POPULAR_MARK: char = '★';

/// One match card: badge + title on top, category, time and watch link below.
pub struct MatchCard<'a> {
    pub card: &'a CardView,
    /// `None` when the card has no countdown (search results).
    pub countdown: Option<CountdownPhase>,
    pub selected: bool,
}

impl Widget for MatchCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let width = area.width as usize;

        let base = if self.selected {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        let badge_style = match self.card.badge {
            Badge::Viewers(_) => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            Badge::Live => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            Badge::Date(_) => Style::default().fg(Color::Cyan),
        };

        let title = format_title_line(self.card, self.selected, width);
        buf.set_string(area.x, area.y, &title, base);
        // Marker is two columns wide; recolor just the badge.
        let badge = format_badge(&self.card.badge);
        if width > 2 {
            let badge: String = badge.chars().take(width - 2).collect();
            buf.set_string(area.x + 2, area.y, &badge, badge_style.patch(base));
        }

        if area.height < CARD_HEIGHT {
            return;
        }
        let detail = format_detail_line(self.card, self.countdown, width);
        let detail_style = match self.countdown {
            Some(CountdownPhase::Ready) => Style::default().fg(Color::Yellow),
            _ => Style::default().fg(Color::DarkGray),
        };
        buf.set_string(area.x, area.y + 1, &detail, detail_style);
    }
}

/// Badge text: `1.3k 👁`, `LIVE`, or the start time/date.
pub fn format_badge(badge: &Badge) -> String {
    match badge {
        Badge::Viewers(count) => format!("{count} 👁"),
        Badge::Live => "LIVE".to_string(),
        Badge::Date(text) => text.clone(),
    }
}

/// `"> [badge   ] Title ★"`, padded or cut to exactly `width` columns.
pub fn format_title_line(card: &CardView, selected: bool, width: usize) -> String {
    let marker = if selected { '>' } else { ' ' };
    let badge = format_badge(&card.badge);
    let mut line = format!("{marker} {badge:<BADGE_WIDTH$} {}", card.title);
    if card.popular {
        line.push(' ');
        line.push(POPULAR_MARK);
    }
    fit(&line, width)
}

/// `"  Football · 3:05 PM   Watch in 7s"`, padded or cut to `width` columns.
pub fn format_detail_line(card: &CardView, countdown: Option<CountdownPhase>, width: usize) -> String {
    let info = format!("  {} · {}", card.category, card.meta);
    let link = countdown_text(card, countdown);
    if link.is_empty() {
        return fit(&info, width);
    }
    let info_w = info.chars().count();
    let link_w = link.chars().count();
    if info_w + 2 + link_w <= width {
        let gap = width - info_w - link_w;
        fit(&format!("{info}{}{link}", " ".repeat(gap)), width)
    } else {
        fit(&format!("{info}  {link}"), width)
    }
}

pub fn countdown_text(card: &CardView, countdown: Option<CountdownPhase>) -> String {
    match countdown {
        Some(CountdownPhase::Counting(secs)) => format!("Watch in {secs}s"),
        Some(CountdownPhase::Ready) => format!("Watch: {}", card.watch_url),
        None => String::new(),
    }
}

fn fit(text: &str, width: usize) -> String {
    let cut: String = text.chars().take(width).collect();
    format!("{cut:<width$}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(badge: Badge, popular: bool) -> CardView {
        CardView {
            match_id: "m1".into(),
            title: "Arsenal vs Chelsea".into(),
            category: "Football".into(),
            badge,
            meta: "3:05 PM".into(),
            popular,
            sources: vec!["alpha".into()],
            watch_url: "https://buffstreams.world/Matchinformation/?id=m1".into(),
            poster_url: String::new(),
        }
    }

    #[test]
    fn test_title_line_width() {
        let c = card(Badge::Viewers("1.3k".into()), true);
        let line = format_title_line(&c, true, 40);
        assert_eq!(line.chars().count(), 40, "line: {:?}", line);
        assert!(line.starts_with("> 1.3k 👁"));
        assert!(line.contains('★'));
    }

    #[test]
    fn test_title_line_truncates() {
        let c = card(Badge::Live, false);
        let line = format_title_line(&c, false, 12);
        assert_eq!(line, "  LIVE      ");
    }

    #[test]
    fn test_detail_line_right_aligns_countdown() {
        let c = card(Badge::Live, false);
        let line = format_detail_line(&c, Some(CountdownPhase::Counting(7)), 40);
        assert_eq!(line.chars().count(), 40);
        assert!(line.starts_with("  Football · 3:05 PM"));
        assert!(line.ends_with("Watch in 7s"));
    }

    #[test]
    fn test_detail_line_reveals_link() {
        let c = card(Badge::Date("Mar 14".into()), false);
        let line = format_detail_line(&c, Some(CountdownPhase::Ready), 120);
        assert!(line.contains("Watch: https://buffstreams.world/Matchinformation/?id=m1"));
    }

    #[test]
    fn test_detail_line_without_countdown() {
        let c = card(Badge::Live, false);
        let line = format_detail_line(&c, None, 24);
        assert_eq!(line, "  Football · 3:05 PM    ");
    }
}
