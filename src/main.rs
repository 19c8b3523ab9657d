mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::{AppSettings, CliOverrides};
use crate::state::messages::{FeedEvent, NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crate::state::page_tasks::PageTasks;
use chrono::Local;
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use log::{error, info};
use std::io::Stdout;
use std::path::PathBuf;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(cli) = handle_cli_args() else {
        return Ok(());
    };

    better_panic::install();

    let settings = AppSettings::load(&cli);

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(settings.log_level)?;
    tui_logger::set_default_level(settings.log_level);

    let store = Arc::new(settings.store());
    info!(
        "reading streaming/{} from {} every {:?}",
        settings.tournament_id,
        store.describe(),
        settings.poll_interval
    );

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);
    let (feed_tx, feed_rx) = mpsc::unbounded_channel::<FeedEvent>();

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(
        store.clone(),
        settings.tournament_id.clone(),
        network_req_rx,
        network_resp_tx,
    );
    let network_task = tokio::spawn(network_worker.run());

    // Subscriptions and the countdown ticker follow the visible page
    let page_tasks = PageTasks::new(
        store,
        settings.tournament_id.clone(),
        settings.poll_interval,
        feed_tx,
        ui_event_tx.clone(),
    );

    let app = Arc::new(Mutex::new(App::new(settings)));

    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(
        terminal,
        app,
        page_tasks,
        ui_event_rx,
        network_req_tx,
        network_resp_rx,
        feed_rx,
    )
    .await;

    input_handler.abort();
    network_task.abort();
    cleanup_terminal();

    Ok(())
}

/// Returns `None` when the process should exit without starting the UI.
fn handle_cli_args() -> Option<CliOverrides> {
    parse_cli_args(std::env::args().skip(1)).unwrap_or_else(|message| {
        eprintln!("{message}\n\n{}", usage_text());
        std::process::exit(2);
    })
}

fn parse_cli_args(args: impl IntoIterator<Item = String>) -> Result<Option<CliOverrides>, String> {
    let mut overrides = CliOverrides::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("{}", usage_text());
                return Ok(None);
            }
            "-V" | "--version" => {
                println!("poolcast {}", env!("CARGO_PKG_VERSION"));
                return Ok(None);
            }
            "-t" | "--tournament" => {
                let id = args.next().ok_or("--tournament needs a document id")?;
                overrides.tournament_id = Some(id);
            }
            "-d" | "--data-dir" => {
                let dir = args.next().ok_or("--data-dir needs a path")?;
                overrides.data_dir = Some(PathBuf::from(dir));
            }
            _ => return Err(format!("Unknown argument: {arg}")),
        }
    }

    Ok(Some(overrides))
}

fn usage_text() -> &'static str {
    "poolcast - live display pages for a pool tournament

Usage:
  poolcast [--tournament <id>] [--data-dir <path>]
  poolcast --help
  poolcast --version

Options:
  -t, --tournament <id>   Document id under streaming/ (default current_tournament)
  -d, --data-dir <path>   Local document directory when Firestore is not configured (default ./data)

Environment (also read from ./.env):
  POOLCAST_TOURNAMENT_ID       Same as --tournament
  POOLCAST_FIRESTORE_PROJECT   Firestore project id; unset reads local files
  POOLCAST_FIRESTORE_API_KEY   Firestore API key
  POOLCAST_FIRESTORE_URL       Firestore REST base URL
  POOLCAST_DATA_DIR            Same as --data-dir
  POOLCAST_POLL_MS             Subscription poll interval in ms (default 2000)
  POOLCAST_LOG                 Log level: error, warn, info, debug, trace"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut page_tasks: PageTasks,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
    mut feed_events: mpsc::UnboundedReceiver<FeedEvent>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &network_requests).await;
                sync_page_tasks(&app, &mut page_tasks).await;
                if should_redraw && !loading.is_loading {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw = handle_network_response(response, &app, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(feed_event) = feed_events.recv() => {
                handle_feed_event(feed_event, &app).await;
                if !loading.is_loading {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            else => break,
        }
    }

    page_tasks.close_all();
}

/// Open the subscriptions the visible page needs and close the others.
async fn sync_page_tasks(app: &Arc<Mutex<App>>, page_tasks: &mut PageTasks) {
    let guard = app.lock().await;
    page_tasks.sync(guard.state.active_tab, guard.state.countdown.is_counting());
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => true,
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            true
        }
        UiEvent::Resize => true,
        UiEvent::CountdownTick => {
            let mut guard = app.lock().await;
            guard.on_countdown_tick(Local::now().naive_local())
        }
    }
}

async fn handle_feed_event(event: FeedEvent, app: &Arc<Mutex<App>>) {
    let mut guard = app.lock().await;
    match event {
        FeedEvent::Tournament(snapshot) => guard.on_tournament_update(snapshot),
        FeedEvent::StreamControl(control) => guard.on_stream_control_update(control),
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    loading: &mut LoadingState,
) -> bool {
    match response {
        NetworkResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
            return true;
        }
        NetworkResponse::TournamentRefreshed { snapshot } => {
            let mut guard = app.lock().await;
            guard.on_tournament_refreshed(snapshot);
        }
        NetworkResponse::StreamControlSaved => {
            let mut guard = app.lock().await;
            guard.on_stream_control_saved();
        }
        NetworkResponse::StreamControlFailed { message } => {
            error!("Stream control write failed: {message}");
            let mut guard = app.lock().await;
            guard.on_stream_control_failed(message);
        }
        NetworkResponse::Error { message } => {
            error!("Network error: {message}");
            let mut guard = app.lock().await;
            guard.on_error(message);
        }
    }
    !loading.is_loading
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        let event = match tokio::task::spawn_blocking(crossterm_event::read).await {
            Ok(Ok(event)) => event,
            Ok(Err(e)) => {
                error!("failed to read terminal input: {e}");
                break;
            }
            Err(_) => break,
        };

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

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

/// Best effort: runs from the panic hook and on quit.
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

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_arguments_starts_with_defaults() {
        let cli = parse_cli_args(args(&[])).unwrap().unwrap();
        assert!(cli.tournament_id.is_none());
        assert!(cli.data_dir.is_none());
    }

    #[test]
    fn tournament_and_data_dir_flags() {
        let cli = parse_cli_args(args(&["--tournament", "spring_2025", "-d", "/tmp/docs"]))
            .unwrap()
            .unwrap();
        assert_eq!(cli.tournament_id.as_deref(), Some("spring_2025"));
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/docs")));
    }

    #[test]
    fn missing_flag_value_and_unknown_flags_are_errors() {
        assert!(parse_cli_args(args(&["--tournament"])).is_err());
        assert!(parse_cli_args(args(&["--bogus"])).is_err());
    }
}
