pub mod keys;
pub mod model;
pub mod pagination;
pub mod view;

use std::io::Stdout;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::domain::{repository::TodoStore, todo::TodoId};

use model::{Exit, ListModel, Msg, SessionSettings};
use view::Renderer;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to load todos: {0:#}")]
    Load(#[source] anyhow::Error),
    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Loads the first page, takes over the terminal and runs until the user
/// quits or commits. The terminal is restored on every path out.
pub async fn run<S: TodoStore>(
    store: S,
    settings: SessionSettings,
    renderer: Renderer,
    fresh: Option<TodoId>,
) -> Result<Exit, SessionError> {
    // Load before touching the terminal so a failure prints normally.
    let mut model = ListModel::load(store, settings, fresh).await?;
    if let Ok((width, height)) = terminal::size() {
        model.update(Msg::Resize(width, height)).await;
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    if let Err(err) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(err.into());
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = match Terminal::new(backend) {
        Ok(terminal) => terminal,
        Err(err) => {
            let _ = disable_raw_mode();
            let _ = execute!(std::io::stdout(), LeaveAlternateScreen);
            return Err(err.into());
        }
    };

    let res = event_loop(&mut terminal, &mut model, &renderer).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

async fn event_loop<S: TodoStore>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    model: &mut ListModel<S>,
    renderer: &Renderer,
) -> Result<Exit, SessionError> {
    loop {
        terminal.draw(|f| renderer.draw(f, model))?;

        let msg = match event::read()? {
            // Only act on key presses; ignore repeats and releases to prevent duplicate input
            Event::Key(key) if key.kind == KeyEventKind::Press => keys::map_key(key),
            Event::Resize(width, height) => Some(Msg::Resize(width, height)),
            _ => None,
        };
        if let Some(msg) = msg {
            model.update(msg).await;
        }
        if let Some(exit) = model.take_exit() {
            return Ok(exit);
        }
    }
}
