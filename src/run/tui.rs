use anyhow::Result;
use chrono::Utc;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::db::Database;
use crate::ui::app::App;
use crate::ui::render;

use super::surface;

pub(crate) fn as_tui(db: &Database, user_id: i64) -> Result<()> {
    let mut app = App::new(user_id);
    app.refresh(db).map_err(surface)?;
    tracing::info!(user_id, "dashboard opened");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, db);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        eprintln!("Error: {e:#}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    db: &Database,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            app.visible_rows = render::pane_rows(f.area().height);
            render::render(f, app);
        })?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            handle_key(key, app, db)?;
        }
    }
    Ok(())
}

fn handle_key(key: event::KeyEvent, app: &mut App, db: &Database) -> Result<()> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.running = false,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.running = false
        }
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('g') | KeyCode::Home => app.goto_top(),
        KeyCode::Char('G') | KeyCode::End => app.goto_bottom(),
        KeyCode::Tab => app.toggle_focus(),
        KeyCode::Char('r') => reload(app, db, |app, db| app.refresh(db)),
        KeyCode::Char('m') => reload(app, db, |app, db| app.toggle_period(db, Utc::now())),
        _ => {}
    }
    Ok(())
}

// A failed reload keeps the last good snapshot on screen.
fn reload(
    app: &mut App,
    db: &Database,
    op: impl FnOnce(&mut App, &Database) -> crate::error::Result<()>,
) {
    if let Err(e) = op(app, db) {
        tracing::warn!(error = %e, "dashboard reload failed");
        app.status_message = format!("Reload failed: {e}");
    }
}
