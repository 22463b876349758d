use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tracing_subscriber::EnvFilter;

use panefm::ui::{render, App};
use panefm::{Config, HostFs};

#[derive(Debug, Parser)]
#[command(name = "panefm", version, about = "Three-pane terminal file browser")]
struct Cli {
    /// Directory to start in
    path: Option<PathBuf>,

    /// Show dotfiles
    #[arg(long)]
    show_hidden: bool,

    /// Config file (defaults to <config dir>/panefm/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log file (defaults to <cache dir>/panefm/panefm.log)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(path: Option<PathBuf>, filter: &str) {
    let Some(path) = path.or_else(Config::default_log_path) else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn start_path(cli: Option<PathBuf>, config: &Config) -> io::Result<PathBuf> {
    let path = match cli.or_else(|| config.start_path.clone()) {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    std::fs::canonicalize(&path)
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    while !app.should_quit {
        terminal.draw(|f| render::draw(f, app))?;

        if event::poll(Duration::from_millis(200))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }
        app.tick();
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    if cli.show_hidden {
        config.show_hidden = true;
    }
    init_logging(cli.log_file.clone(), &config.log_filter);

    let start = start_path(cli.path, &config)?;
    if !start.is_dir() {
        return Err(format!("{} is not a directory", start.display()).into());
    }
    tracing::info!("starting in {}", start.display());

    let runtime = tokio::runtime::Runtime::new()?;
    let mut app = App::new(Arc::new(HostFs::new()), runtime.handle().clone(), config, start);

    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let result = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result?;
    Ok(())
}
