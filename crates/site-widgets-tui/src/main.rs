mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use anyhow::Result;
use site_widgets_core::Config;
use tracing::{error, info, warn};

use crate::app::App;
use crate::tui::EventHandler;

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = logging::init()?;

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load config, using defaults: {}", e);
            Config::default()
        }
    };

    let mut app = App::new(config);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let (cols, rows) = crossterm::terminal::size()?;
    app.set_terminal_size(cols, rows);

    let result = run(&mut app, &mut terminal).await;

    tui::restore()?;
    if let Err(e) = &result {
        error!("site widgets exited with error: {:#}", e);
    }
    info!("site widgets stopped");
    result
}

async fn run(app: &mut App, terminal: &mut tui::Tui) -> Result<()> {
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }

    Ok(())
}
