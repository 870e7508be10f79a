use crate::app::{App, MenuItem};
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;

    // While typing a query every printable key belongs to the query box.
    if guard.state.active_tab == MenuItem::Search && guard.state.search.composing {
        match (key_event.code, key_event.modifiers) {
            (Char('c'), KeyModifiers::CONTROL) => {
                crate::cleanup_terminal();
                std::process::exit(0);
            }
            (KeyCode::Esc | KeyCode::Enter, _) => guard.stop_composing(),
            (KeyCode::Backspace, _) => guard.state.search.pop_char(),
            (Char(c), _) => guard.state.search.push_char(c),
            _ => {}
        }
        return;
    }

    let request = match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1'), _) => {
            guard.update_tab(MenuItem::Schedule);
            None
        }
        (_, Char('2'), _) => {
            guard.update_tab(MenuItem::Search);
            None
        }
        (_, Char('3'), _) => {
            guard.update_tab(MenuItem::Categories);
            None
        }
        (_, Char('?'), _) => {
            guard.update_tab(MenuItem::Help);
            None
        }
        (MenuItem::Help, KeyCode::Esc, _) => {
            guard.exit_help();
            None
        }
        (_, Char('/'), _) => {
            guard.start_search();
            None
        }

        // Schedule: category routing
        (MenuItem::Schedule, Char('n') | Char(']') | KeyCode::Right, _) => Some(guard.next_category()),
        (MenuItem::Schedule, Char('N') | Char('[') | KeyCode::Left, _) => Some(guard.prev_category()),
        (MenuItem::Schedule, Char('R'), _) => Some(guard.reload()),

        // Schedule: filters
        (MenuItem::Schedule, Char('l'), _) => {
            guard.toggle_live_filter();
            None
        }
        (MenuItem::Schedule, Char('p'), _) => {
            guard.toggle_popular_filter();
            None
        }
        (MenuItem::Schedule, Char('s'), _) => {
            guard.cycle_source_filter();
            None
        }
        (MenuItem::Schedule, Char('x'), _) => {
            guard.clear_filters();
            None
        }
        (MenuItem::Schedule, Char('r'), _) => guard.viewer_refresh_request(),

        // Schedule: card selection
        (MenuItem::Schedule, Char('j') | KeyCode::Down, _) => {
            guard.state.schedule.select_down();
            None
        }
        (MenuItem::Schedule, Char('k') | KeyCode::Up, _) => {
            guard.state.schedule.select_up();
            None
        }

        // Search results
        (MenuItem::Search, Char('i'), _) => {
            guard.start_search();
            None
        }
        (MenuItem::Search, Char('j') | KeyCode::Down, _) => {
            guard.state.search.select_down();
            None
        }
        (MenuItem::Search, Char('k') | KeyCode::Up, _) => {
            guard.state.search.select_up();
            None
        }
        (MenuItem::Search, KeyCode::Esc, _) => {
            guard.state.search.clear_query();
            None
        }
        (MenuItem::Search, KeyCode::Enter, _) => guard.open_selected_result(),

        // Category board
        (MenuItem::Categories, Char('j') | KeyCode::Down, _) => {
            guard.state.board.select_down();
            None
        }
        (MenuItem::Categories, Char('k') | KeyCode::Up, _) => {
            guard.state.board.select_up();
            None
        }
        (MenuItem::Categories, Char('r'), _) => Some(NetworkRequest::LoadCategoryBoard),
        (MenuItem::Categories, KeyCode::Enter, _) => guard.open_selected_category(),

        // Global
        (_, Char('f'), _) => {
            guard.toggle_full_screen();
            None
        }
        (_, Char('"'), _) => {
            guard.toggle_show_logs();
            None
        }

        _ => None,
    };

    drop(guard);
    if let Some(request) = request {
        let _ = network_requests.send(request).await;
    }
}
