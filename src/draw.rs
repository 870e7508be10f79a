use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::match_card::{CARD_HEIGHT, MatchCard};
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::state::schedule::{self, CardView, ScheduleView, Section};
use crate::ui::layout::LayoutAreas;
use chrono::Local;

static TABS: &[&str; 3] = &["Schedule", "Search", "Categories"];

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Schedule => draw_schedule(f, layout.main, app),
            MenuItem::Search => draw_search(f, layout.main, app),
            MenuItem::Categories => draw_categories(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main, app),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });
    if let Err(e) = result {
        log::error!("draw failed: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Schedule => 0,
        MenuItem::Search => 1,
        MenuItem::Categories => 2,
        MenuItem::Help => 0,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

fn draw_schedule(f: &mut Frame, area: Rect, app: &App) {
    let route = &app.state.schedule.route;
    let title = format!(" {} Matches ", route.category.label());
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [header, key_legend, content, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    f.render_widget(Paragraph::new(filter_line(app)), header);
    f.render_widget(
        Paragraph::new("Keys: n/N=category  l=live  p=popular  s=source  x=clear  j/k=move  r=viewers")
            .style(Style::default().fg(Color::DarkGray)),
        key_legend,
    );

    match &app.state.schedule.view {
        ScheduleView::Loading => draw_message(f, content, "Loading matches..."),
        ScheduleView::Placeholder(message) => draw_message(f, content, message),
        ScheduleView::Sections(sections) => draw_sections(f, content, app, sections),
    }

    if let Some(err) = app.state.last_error.as_deref() {
        f.render_widget(Paragraph::new(err).style(Style::default().fg(Color::Red)), footer);
    } else if let Some(card) = app.state.schedule.selected_card() {
        f.render_widget(
            Paragraph::new(card_footer(card)).style(Style::default().fg(Color::DarkGray)),
            footer,
        );
    }
}

/// Route plus active-filter tags, e.g. `?live=true#/Football  [Live] [alpha]`.
fn filter_line(app: &App) -> Line<'static> {
    let route = &app.state.schedule.route;
    let mut spans = vec![Span::styled(route.display(), Style::default().fg(Color::Gray))];
    for tag in route.filters.active_tags() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("[{tag}]"),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(spans)
}

fn card_footer(card: &CardView) -> String {
    let sources = if card.sources.is_empty() {
        "none".to_string()
    } else {
        card.sources.join(", ")
    };
    format!("Sources: {sources}  Poster: {}", card.poster_url)
}

enum Row<'a> {
    Header(&'a Section),
    Card(&'a CardView, usize),
}

impl Row<'_> {
    fn height(&self) -> u16 {
        match self {
            Row::Header(_) => 1,
            Row::Card(..) => CARD_HEIGHT,
        }
    }
}

fn draw_sections(f: &mut Frame, area: Rect, app: &App, sections: &[Section]) {
    let mut rows = Vec::new();
    let mut index = 0;
    for section in sections {
        rows.push(Row::Header(section));
        for card in &section.cards {
            rows.push(Row::Card(card, index));
            index += 1;
        }
    }

    // Scroll just far enough to keep the selected card on screen.
    let selected = app.state.schedule.selected;
    let mut y: u16 = 0;
    let mut selected_bottom: u16 = 0;
    for row in &rows {
        y = y.saturating_add(row.height());
        if matches!(row, Row::Card(_, i) if *i == selected) {
            selected_bottom = y;
        }
    }
    let offset = selected_bottom.saturating_sub(area.height);

    let mut y: u16 = 0;
    for row in rows {
        let h = row.height();
        let top = y;
        y = y.saturating_add(h);
        if top < offset {
            continue;
        }
        let rel = top - offset;
        if rel + h > area.height {
            break;
        }
        let row_area = Rect::new(area.x, area.y + rel, area.width, h);
        match row {
            Row::Header(section) => {
                let mut spans = vec![Span::styled(
                    section.title.clone(),
                    Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
                )];
                if !section.date_label.is_empty() {
                    spans.push(Span::raw(" "));
                    spans.push(Span::styled(section.date_label.clone(), Style::default().fg(Color::Gray)));
                }
                f.render_widget(Paragraph::new(Line::from(spans)), row_area);
            }
            Row::Card(card, i) => f.render_widget(
                MatchCard {
                    card,
                    countdown: app.state.countdowns.phase(&card.match_id),
                    selected: i == selected,
                },
                row_area,
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

fn draw_search(f: &mut Frame, area: Rect, app: &App) {
    let search = &app.state.search;
    let block = default_border(Color::White).title(" Search ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [input, key_legend, content] =
        Layout::vertical([Constraint::Length(3), Constraint::Length(1), Constraint::Fill(1)]).areas(inner);

    let input_color = if search.composing { Color::Yellow } else { Color::DarkGray };
    let cursor = if search.composing { "_" } else { "" };
    f.render_widget(
        Paragraph::new(format!("{}{cursor}", search.query))
            .block(default_border(input_color).title(" Teams, leagues or titles ")),
        input,
    );
    f.render_widget(
        Paragraph::new("Keys: /=type  Enter=open category  j/k=move  Esc=clear")
            .style(Style::default().fg(Color::DarkGray)),
        key_legend,
    );

    if !search.index_loaded {
        draw_message(f, content, "Loading search index...");
        return;
    }
    if search.query.trim().is_empty() {
        draw_message(f, content, "Start typing to search every listed match.");
        return;
    }
    let results = search.results();
    if results.is_empty() {
        draw_message(f, content, "No matches found.");
        return;
    }

    let now = Local::now();
    let links = app.links();
    let mut y = content.y;
    for (i, m) in results.iter().enumerate() {
        if y + CARD_HEIGHT > content.y + content.height {
            break;
        }
        let card = schedule::card_view(m, &now, links);
        f.render_widget(
            MatchCard { card: &card, countdown: None, selected: i == search.selected },
            Rect::new(content.x, y, content.width, CARD_HEIGHT),
        );
        y += CARD_HEIGHT;
    }
}

// ---------------------------------------------------------------------------
// Category board
// ---------------------------------------------------------------------------

fn draw_categories(f: &mut Frame, area: Rect, app: &App) {
    let board = &app.state.board;
    let block = default_border(Color::White).title(" Categories ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [key_legend, content] = Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(inner);
    f.render_widget(
        Paragraph::new("Keys: j/k=move  Enter=open schedule  r=refresh")
            .style(Style::default().fg(Color::DarkGray)),
        key_legend,
    );

    let lines: Vec<Line> = board
        .ranking
        .iter()
        .enumerate()
        .map(|(i, (category, viewers))| {
            let marker = if i == board.selected { "> " } else { "  " };
            let count = if board.loaded && *viewers > 0 {
                format!("{} 👁", schedule::format_viewers(*viewers))
            } else {
                String::new()
            };
            let style = if i == board.selected {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("{marker}{:<20}", category.label()), style),
                Span::styled(count, Style::default().fg(Color::Green)),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), content);
}

// ---------------------------------------------------------------------------
// Help
// ---------------------------------------------------------------------------

fn draw_help(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::DarkGray).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let invite = app.state.discord_invite.as_deref().unwrap_or("resolving...");
    let text = vec![
        Line::from("Global:     q=quit  1=Schedule  2=Search  3=Categories  /=search  f=full screen  \"=logs"),
        Line::from("Schedule:   n/N or ←/→=category  l=live  p=popular  s=source  x=clear filters"),
        Line::from("            j/k=move  r=refresh viewers  R=reload listing"),
        Line::from("Search:     type to filter  Enter=open category  Esc=clear"),
        Line::from("Categories: j/k=move  Enter=open schedule  r=refresh"),
        Line::from(""),
        Line::from("Watch links unlock 10 seconds after a card appears."),
        Line::from(""),
        Line::from(vec![
            Span::raw("Community: "),
            Span::styled(invite.to_string(), Style::default().fg(Color::Cyan)),
        ]),
    ];
    f.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }), inner);
}

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

fn draw_logs(f: &mut Frame, area: Rect) {
    let logger = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Cyan))
        .style_debug(Style::default().fg(Color::Gray))
        .style_trace(Style::default().fg(Color::DarkGray));
    f.render_widget(logger, area);
}

fn draw_message(f: &mut Frame, area: Rect, msg: &str) {
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
