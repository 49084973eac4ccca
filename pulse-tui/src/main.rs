//! Pulse dashboard entry point.

use crossterm::{
    event::{self, Event as CrosstermEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use pulse_cache::QueryCache;
use pulse_tui::api_client::RestClient;
use pulse_tui::config::TuiConfig;
use pulse_tui::error::TuiError;
use pulse_tui::events::TuiEvent;
use pulse_tui::state::App;
use pulse_tui::telemetry;
use pulse_tui::views::render_view;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), TuiError> {
    let config = TuiConfig::load()?;
    telemetry::init(&config)?;

    let transport = Arc::new(RestClient::new(&config)?);
    let cache = QueryCache::new(transport, config.cache_config());

    let (event_tx, mut event_rx) = mpsc::channel::<TuiEvent>(256);
    let mut app = App::new(config, cache, event_tx.clone());

    let mut terminal = setup_terminal()?;
    let _guard = TerminalGuard;

    spawn_input_reader(event_tx.clone());
    app.start();

    let mut ticker = tokio::time::interval(app.config.refresh_interval());

    loop {
        terminal.draw(|f| render_view(f, &app))?;

        let event = tokio::select! {
            _ = ticker.tick() => TuiEvent::Tick,
            Some(event) = event_rx.recv() => event,
        };
        if app.handle_event(event, Instant::now()) {
            break;
        }
    }

    tracing::info!(stats = ?app.cache.stats(), "Shutting down");
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
}

fn spawn_input_reader(sender: mpsc::Sender<TuiEvent>) {
    std::thread::spawn(move || loop {
        if let Ok(true) = event::poll(Duration::from_millis(200)) {
            if let Ok(evt) = event::read() {
                let forwarded = match evt {
                    CrosstermEvent::Key(key) => sender.blocking_send(TuiEvent::Input(key)),
                    CrosstermEvent::Resize(width, height) => {
                        sender.blocking_send(TuiEvent::Resize { width, height })
                    }
                    _ => Ok(()),
                };
                if forwarded.is_err() {
                    break;
                }
            }
        }
    });
}
