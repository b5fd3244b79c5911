//! incubadmin - a terminal front end for the incubator's admin tables.

use std::collections::HashMap;
use std::io::{self, IsTerminal};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use crossterm::{
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info, warn};

use incubadmin::api::{CollectionClient, RecordStore, TokenProvider};
use incubadmin::cli::{Cli, Command};
use incubadmin::config::Config;
use incubadmin::events::EventHandler;
use incubadmin::tasks::{create_task_channel, TaskSpawner};
use incubadmin::{logging, App};

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

/// Stores keyed by entity name.
type Stores = HashMap<String, Arc<dyn RecordStore>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let path = cli.config_path()?;

    if let Some(Command::InitConfig { force }) = &cli.command {
        if path.exists() && !force {
            bail!("{} already exists (use --force to overwrite)", path.display());
        }
        Config::default().save_to(&path)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let mut config =
        Config::load_from(&path).with_context(|| format!("loading {}", path.display()))?;
    cli.apply_overrides(&mut config)?;

    let log_dir = match logging::init(&config.settings) {
        Ok(dir) => Some(dir),
        Err(e) => {
            eprintln!("Warning: logging disabled: {e:#}");
            None
        }
    };

    let tokens = cli.token_provider().context("reading API token")?;
    let stores = build_stores(&config, tokens)?;

    if !io::stdout().is_terminal() {
        bail!("incubadmin requires a real terminal");
    }

    let tick_rate = config.settings.tick_rate_ms;
    let mut app = App::with_config(config);
    if let Some(dir) = &log_dir {
        app = app.with_log_directory(dir);
    }

    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, app, &stores, tick_rate).await;
    restore_terminal(&mut terminal)?;

    logging::shutdown();
    if let Err(e) = &result {
        error!(error = %e, "Exited with error");
    }
    result
}

/// One collection client per configured entity, sharing a token provider.
fn build_stores(config: &Config, tokens: Arc<dyn TokenProvider>) -> anyhow::Result<Stores> {
    let mut stores = Stores::new();
    for entity in &config.entities {
        let client = CollectionClient::builder(&config.settings.base_url, &entity.path)
            .token_provider(Arc::clone(&tokens))
            .timeout(config.settings.request_timeout())
            .build()
            .with_context(|| format!("configuring the '{}' client", entity.name))?;
        debug!(entity = %entity.name, url = client.collection_url(), "Store ready");
        stores.insert(entity.name.clone(), Arc::new(client) as Arc<dyn RecordStore>);
    }
    Ok(stores)
}

/// Enable raw mode and switch to the alternate screen.
fn setup_terminal() -> io::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.clear()?;
    Ok(terminal)
}

/// Restore the terminal to normal shell mode.
fn restore_terminal(terminal: &mut Tui) -> io::Result<()> {
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the event loop until the App asks to quit.
async fn run(terminal: &mut Tui, mut app: App, stores: &Stores, tick_rate_ms: u64) -> anyhow::Result<()> {
    let events = EventHandler::with_tick_rate(tick_rate_ms);
    let (mut rx, spawner) = create_task_channel();
    info!("Entering event loop");

    loop {
        dispatch(&mut app, stores, &spawner);

        terminal.draw(|frame| app.view(frame))?;

        let event = tokio::task::block_in_place(|| events.next())?;
        app.update(event);

        while let Ok(message) = rx.try_recv() {
            app.handle_message(message);
        }

        if app.should_quit() {
            info!("Leaving event loop");
            break;
        }
    }
    Ok(())
}

/// Spawn every request the App queued since the last iteration.
fn dispatch(app: &mut App, stores: &Stores, spawner: &TaskSpawner) {
    for pending in app.take_pending() {
        match stores.get(&pending.entity) {
            Some(store) => spawner.spawn(Arc::clone(store), pending.mount, pending.request),
            None => warn!(entity = %pending.entity, "No store for entity, dropping request"),
        }
    }
}
