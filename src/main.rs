use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;

use textquiz::docx::DocxExtractor;
use textquiz::export::Osc52Clipboard;
use textquiz::{db, logger, App, Config, HttpTestService, QuizSession};

const TICK: Duration = Duration::from_millis(100);

fn main() -> textquiz::Result<()> {
    let config = Config::load()?;
    logger::init(&config.log_file)?;
    tracing::info!(service_url = %config.service_url, "Starting textquiz");

    let conn = db::init_db(&config.db_path)?;
    let service = Arc::new(HttpTestService::new(&config)?);

    let (request_tx, request_rx) = crossbeam_channel::unbounded();
    let (response_tx, response_rx) = crossbeam_channel::unbounded();
    let worker = textquiz::spawn_worker(service, request_rx, response_tx)?;

    let mut app = App::new(
        QuizSession::new(config.download_dir.clone()),
        conn,
        request_tx,
        response_rx,
        Box::new(Osc52Clipboard::new(io::stdout())),
        Box::new(DocxExtractor),
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    // Closing the request channel lets the worker thread finish.
    drop(app);
    if worker.join().is_err() {
        tracing::error!("Worker thread panicked");
    }

    if let Err(e) = &result {
        tracing::error!(error = %e, "Terminal loop failed");
    }
    tracing::info!("Exiting textquiz");
    result.map_err(Into::into)
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    while !app.should_quit {
        app.poll_responses();
        terminal.draw(|f| app.draw(f))?;

        if !event::poll(TICK)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
            Event::Paste(text) => app.handle_paste(&text),
            _ => {}
        }
    }
    Ok(())
}
