//! Terminal host for the floating chat widget.

pub mod app;
pub mod scroll;
pub mod view;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use faqchat_client::FaqApi;
use ratatui::{backend::CrosstermBackend, Terminal};

pub use app::{App, Focus};
pub use view::framing_prefix;

pub async fn run_widget(api: Arc<dyn FaqApi>, greeting: impl Into<String>) -> Result<()> {
    let mut app = App::new(api, greeting).await;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = run_app(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // A query still in flight is dropped with `app`; its answer is discarded.
    run_result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    tracing::info!("chat widget started");
    loop {
        app.tick().await;

        terminal.draw(|frame| view::render(frame, app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key).await;
                }
            }
        }

        if app.should_quit() {
            break;
        }
    }
    tracing::info!("chat widget closed");

    Ok(())
}
