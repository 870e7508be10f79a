mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::AppSettings;
use crate::state::countdown::COUNTDOWN_TICK;
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crate::state::refresher::PeriodicRefresher;
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use log::error;
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};

enum CliCommand {
    Run { route: Option<String> },
    Exit,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let route = match handle_cli_args() {
        CliCommand::Run { route } => route,
        CliCommand::Exit => return Ok(()),
    };

    better_panic::install();

    let settings = AppSettings::load().with_initial_route(route);

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    let log_level = settings.log_level.unwrap_or(log::LevelFilter::Error);
    tui_logger::init_logger(log_level)?;
    tui_logger::set_default_level(log_level);

    let client = settings.api_client();
    let app = Arc::new(Mutex::new(App::new(settings)));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(client, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Periodic viewer refresh thread (every 60s)
    let periodic_updater = PeriodicRefresher::new(ui_event_tx.clone());
    let periodic_task = tokio::spawn(periodic_updater.run());

    // Countdown tick thread, shared by every card
    let countdown_tx = ui_event_tx.clone();
    let countdown_task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(COUNTDOWN_TICK);
        interval.tick().await;
        loop {
            interval.tick().await;
            if countdown_tx.send(UiEvent::CountdownTick).await.is_err() {
                break;
            }
        }
    });

    // Trigger the routed listing load on startup
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, network_req_tx, network_resp_rx).await;

    input_handler.abort();
    network_task.abort();
    periodic_task.abort();
    countdown_task.abort();

    Ok(())
}

fn handle_cli_args() -> CliCommand {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return CliCommand::Run { route: None };
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            CliCommand::Exit
        }
        "-V" | "--version" => {
            println!("streamtui {}", env!("CARGO_PKG_VERSION"));
            CliCommand::Exit
        }
        flag if flag.starts_with('-') => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
        _ => CliCommand::Run { route: Some(arg) },
    }
}

fn usage_text() -> &'static str {
    "streamtui - live sports streaming schedule in your terminal

Usage:
  streamtui [ROUTE]
  streamtui --help
  streamtui --version

Route:
  A schedule page URL, path or fragment, for example
    streamtui '#/football'
    streamtui '?live=true&source=alpha#/Basketball'
    streamtui 'https://buffstreams.world/Schedule/?popular=true#/Hockey'

Environment:
  STREAMTUI_API_BASE       Match API base URL (default https://streamed.pk/api)
  STREAMTUI_SITE_BASE      Site used for watch links (default https://buffstreams.world)
  STREAMTUI_DISCORD_GUILD  Discord guild whose invite is shown in help
  STREAMTUI_LOG            Log level: error, warn, info, debug or trace (default error)"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &network_requests).await;
                if should_redraw && !loading.is_loading {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw =
                    handle_network_response(response, &app, &network_requests, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            let requests = app.lock().await.startup_requests();
            send_all(network_requests, requests).await;
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            true
        }
        UiEvent::Resize => true,
        UiEvent::CountdownTick => app.lock().await.tick_countdowns(),
        UiEvent::RefreshTick => {
            let request = app.lock().await.on_refresh_tick();
            send_all(network_requests, request).await;
            true
        }
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    loading: &mut LoadingState,
) -> bool {
    if let NetworkResponse::LoadingStateChanged { loading_state } = response {
        *loading = loading_state;
        return true;
    }

    let mut guard = app.lock().await;
    let redraw = match response {
        NetworkResponse::LoadingStateChanged { .. } => false,
        NetworkResponse::MatchesLoaded { generation, matches } => {
            let follow_up = guard.on_matches_loaded(generation, matches);
            drop(guard);
            send_all(network_requests, follow_up).await;
            true
        }
        NetworkResponse::MatchesFailed { generation, message } => {
            guard.on_matches_failed(generation, message)
        }
        NetworkResponse::ViewersUpdated { generation, totals } => {
            guard.on_viewers_updated(generation, &totals)
        }
        NetworkResponse::SearchIndexLoaded { matches } => {
            guard.on_search_index_loaded(matches);
            true
        }
        NetworkResponse::CategoryBoardLoaded { ranking } => {
            guard.on_category_board_loaded(ranking);
            true
        }
        NetworkResponse::DiscordInviteLoaded { invite } => {
            guard.on_discord_invite_loaded(invite);
            true
        }
        NetworkResponse::Error { message } => {
            error!("Network error: {message}");
            guard.on_error(message);
            true
        }
    };
    redraw && !loading.is_loading
}

async fn send_all(network_requests: &mpsc::Sender<NetworkRequest>, requests: impl IntoIterator<Item = NetworkRequest>) {
    for request in requests {
        if let Err(e) = network_requests.send(request).await {
            error!("Failed to queue network request: {e}");
        }
    }
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
