use anyhow::Result;
use crossterm::{
    event::{DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use std::path::PathBuf;

use glimpses::app::App;
use glimpses::catalog::Catalog;
use glimpses::config::Config;
use glimpses::logging;
use glimpses::theme::{self, FileStore, KeyValueStore, MemoryStore};
use glimpses::ui::image_cache::ImageCache;

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    catalog: Option<PathBuf>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("glimpses {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            flag @ ("--config" | "-c" | "--catalog" | "-p") => {
                let Some(value) = args.get(i + 1) else {
                    eprintln!("Error: {} requires a path argument", flag);
                    std::process::exit(1);
                };
                let path = Some(PathBuf::from(value));
                if matches!(flag, "--config" | "-c") {
                    parsed.config = path;
                } else {
                    parsed.catalog = path;
                }
                i += 1;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    parsed
}

fn print_help() {
    println!(
        r#"glimpses - terminal photo gallery

USAGE:
    glimpses [OPTIONS]

OPTIONS:
    --config, -c PATH   Path to config file
    --catalog, -p PATH  Catalog manifest (TOML) or photo directory
    --version, -V       Show version
    --help, -h          Show this help message

ENVIRONMENT:
    GLIMPSES_CONFIG     Path to config file (overrides default location)
    GLIMPSES_LOG        Log filter (trace, debug, info, warn, error)

Config file location: $XDG_CONFIG_HOME/glimpses/config.toml"#
    );
}

fn open_store(config: &Config) -> Box<dyn KeyValueStore> {
    match FileStore::open(&config.theme.store_path) {
        Ok(store) => Box::new(store),
        Err(e) => {
            tracing::warn!(error = %e, "Theme preference unavailable, using defaults for this session");
            Box::new(MemoryStore::default())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args();

    // journald on Linux, daily file otherwise
    let _ = logging::init(None);

    let mut config = match args.config {
        Some(path) => Config::load_from(&path)?,
        None => Config::load()?,
    };
    if let Some(path) = args.catalog {
        config.catalog.path = path;
    }

    let catalog = Catalog::load(&config.catalog.path, &config.catalog.image_extensions)?;
    let store = open_store(&config);
    let system_prefers_dark = theme::system_prefers_dark();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // The protocol query needs the alternate screen
    let images = ImageCache::new(config.preview.protocol, config.preview.max_image_size);
    let width = terminal.size()?.width;

    let mut app = App::new(config, catalog, images, store, system_prefers_dark, width);
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;

    result
}
