use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{backend::CrosstermBackend, prelude::*};

use order_status_editor::config::Args;
use order_status_editor::{OrderStatusController, OrderStatusFacade, SqliteFacade, View, logging};

mod app;
mod ui;

use app::App;

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = logging::init(&args.log_file)?;

    let mut facade = SqliteFacade::open(&args.db_path)?;
    if args.seed {
        facade.seed_defaults()?;
    }
    let controller = OrderStatusController::with_page_size(facade, args.page_size)?;
    tracing::info!(db = %args.db_path.display(), page_size = args.page_size, "starting editor");

    let mut app = App::new(controller);
    let mut terminal = setup_terminal()?;
    let res = run_app(&mut terminal, &mut app, Duration::from_millis(250));
    restore_terminal(terminal)?;

    if let Err(e) = res {
        tracing::error!(error = %e, "editor stopped with an error");
        eprintln!("Error: {e:?}");
    }
    Ok(())
}

fn run_app<F: OrderStatusFacade>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<F>,
    tick_rate: Duration,
) -> Result<()> {
    // Redraw only when state changes
    let mut dirty = true;
    loop {
        if dirty {
            terminal.draw(|f| ui::draw(f, app))?;
            dirty = false;
        }

        if event::poll(tick_rate)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            handle_key(app, key);
            dirty = true;
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key<F: OrderStatusFacade>(app: &mut App<F>, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }
    if app.show_help {
        // Any key closes the overlay
        app.toggle_help();
        return;
    }
    match app.view {
        View::List => handle_key_list(app, key.code),
        View::Detail => handle_key_detail(app, key.code),
        View::Create | View::Edit => handle_key_form(app, key),
    }
}

fn handle_key_list<F: OrderStatusFacade>(app: &mut App<F>, code: KeyCode) {
    match code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Up | KeyCode::Char('k') => app.move_up(),
        KeyCode::Down | KeyCode::Char('j') => app.move_down(),
        KeyCode::PageDown | KeyCode::Char('n') => app.next_page(),
        KeyCode::PageUp | KeyCode::Char('p') => app.prev_page(),
        KeyCode::Enter | KeyCode::Char('v') => app.view_selected(),
        KeyCode::Char('e') => app.edit_selected(),
        KeyCode::Char('c') => app.begin_create(),
        KeyCode::Char('d') => app.delete_selected(),
        KeyCode::Char('r') => app.reload(),
        _ => {}
    }
}

fn handle_key_detail<F: OrderStatusFacade>(app: &mut App<F>, code: KeyCode) {
    match code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Char('e') => app.edit_current(),
        KeyCode::Char('d') => app.delete_current(),
        KeyCode::Char('c') => app.begin_create(),
        KeyCode::Esc | KeyCode::Char('l') => app.back_to_list(),
        _ => {}
    }
}

fn handle_key_form<F: OrderStatusFacade>(app: &mut App<F>, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_form(),
        KeyCode::Esc => app.cancel_form(),
        KeyCode::Tab | KeyCode::BackTab => app.toggle_field(),
        KeyCode::Backspace => app.form_backspace(),
        KeyCode::Delete => app.form_delete(),
        KeyCode::Left => app.form_left(),
        KeyCode::Right => app.form_right(),
        KeyCode::Home => app.form_home(),
        KeyCode::End => app.form_end(),
        // ignore control chars in insert
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => app.form_insert(c),
        _ => {}
    }
}
