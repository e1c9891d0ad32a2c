use anyhow::Result;
use clap::Parser;
use ratatui::{
    backend::CrosstermBackend,
    crossterm::{
        event::{self, Event, KeyEventKind},
        execute,
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    },
    Terminal,
};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

mod app;
mod cli;
mod file_actions;
mod git;
mod keymap;
mod logger;
mod store;

use app::{App, Collaborators};
use cli::Cli;
use diffdeck_config::AppConfig;

/// Idle wait between frames when no input is pending.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_file = logger::init()?;
    log::info!("Starting diffdeck, logging to {:?}", log_file);

    let config = AppConfig::load();
    let session_id = cli.session_id();
    let collaborators = Collaborators {
        source: Arc::new(git::GitDiffSource::new(&cli.repo)),
        content: Arc::new(git::WorkdirContentProvider::new(&cli.repo)),
        store: Box::new(store::SessionViewedStore::new(diffdeck_config::viewed_dir()?)),
        actions: Arc::new(file_actions::ShellFileActions::new(
            &cli.repo,
            &cli.revision,
            &config.ide_command,
            &config.reveal_command,
        )),
    };
    let mut app = App::new(
        app::engine_config(&config),
        collaborators,
        cli.revision.clone(),
        session_id,
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.start(cli.filter.clone());
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        log::error!("diffdeck failed: {:#}", err);
    }
    log::info!(
        "Exiting diffdeck ({} of {} files viewed)",
        app.review().viewed_count(),
        app.review().stats().file_count
    );
    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    while app.is_running() {
        app.poll_background();
        app.tick(Instant::now());
        terminal.draw(|frame| app.render(frame))?;

        if app.take_reload_request() {
            app.reload();
        }

        if event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                // Only process key press events (ignore key release)
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        } else {
            // Lets spawned fetches make progress on this thread
            tokio::time::sleep(FRAME_INTERVAL).await;
        }
    }
    Ok(())
}
