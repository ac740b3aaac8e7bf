mod api;
mod app;
mod cli;
mod event;
mod feed;
mod help;
mod keys;
mod lifecycle;
mod logging;
mod post;
mod settings;
mod theme;
mod time;
mod tui;
mod views;
mod widgets;

#[cfg(test)]
mod test_utils;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ratatui::Frame;

use api::FeedClient;
use app::{App, Message};
use cli::{Cli, Commands, ConfigArgs, ConfigCommands, OutputFormat};
use event::Event;
use settings::Settings;
use theme::{default_for_variant, detect_terminal_theme};
use tui::EventHandler;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Config(config_args)) = &cli.command {
        return handle_config_command(config_args, &cli);
    }
    run_tui(cli).await
}

fn handle_config_command(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    let config_dir =
        settings::config_dir(cli.config_dir.as_ref()).context("Could not determine config directory")?;
    let path = settings::settings_path(&config_dir);

    match &args.command {
        ConfigCommands::Path => println!("{}", path.display()),
        ConfigCommands::Show { format } => {
            let settings = Settings::load(&path)?.with_cli(cli).redacted();
            match format {
                OutputFormat::Toml => {
                    let toml =
                        toml::to_string_pretty(&settings).context("Failed to serialize settings")?;
                    println!("{toml}");
                }
                OutputFormat::Json => {
                    let json = serde_json::to_string_pretty(&settings)
                        .context("Failed to serialize settings to JSON")?;
                    println!("{json}");
                }
            }
        }
        ConfigCommands::Init => {
            if path.exists() {
                println!("Settings already exist at {}", path.display());
            } else {
                Settings::default().save(&path)?;
                println!("Wrote {}", path.display());
            }
        }
    }
    Ok(())
}

fn load_settings(config_dir: Option<&PathBuf>) -> Settings {
    config_dir
        .map(|dir| {
            let path = settings::settings_path(dir);
            Settings::load(&path).unwrap_or_else(|e| {
                eprintln!("Warning: {e:#}");
                tracing::warn!(error = %e, "ignoring settings file");
                Settings::default()
            })
        })
        .unwrap_or_default()
}

async fn run_tui(cli: Cli) -> Result<()> {
    let config_dir = settings::config_dir(cli.config_dir.as_ref());

    let _log_guard = match &config_dir {
        Some(dir) => {
            let guard = logging::init(dir, cli.verbose)?;
            if cli.verbose {
                eprintln!("Logging to {}", logging::log_path(dir).display());
            }
            Some(guard)
        }
        None => None,
    };

    let settings = load_settings(config_dir.as_ref()).with_cli(&cli);
    let variant = settings.theme.unwrap_or_else(detect_terminal_theme);
    let theme = default_for_variant(variant);
    let client = FeedClient::new(&settings.client_config()).context("Failed to build HTTP client")?;
    tracing::info!(
        base_url = %settings.base_url,
        feed = %settings.feed_path,
        theme = theme.name,
        variant = theme.variant.label(),
        "starting"
    );

    let mut terminal = tui::init()?;
    let mut app = App::new(theme, client, settings.feed_path.clone(), time::system_clock());
    let mut events = EventHandler::new(250);
    let mut last_height: Option<u16> = None;

    app.load_feed();

    let result: Result<()> = async {
        loop {
            terminal.draw(|frame| render(&app, frame))?;

            // Track viewport height changes for filling the screen with cards
            let current_height = terminal.size()?.height;
            if last_height != Some(current_height) {
                last_height = Some(current_height);
                app.update(Message::UpdateViewportHeight(current_height));
            }

            while let Ok(result) = app.result_rx.try_recv() {
                app.handle_async_result(result);
            }

            if app.should_quit {
                break;
            }

            tokio::select! {
                event = events.next() => match event? {
                    Event::Key(key) => {
                        if let Some(msg) = keys::handle_key(key, &app) {
                            app.update(msg);
                        }
                    }
                    Event::Tick | Event::Resize => {}
                },
                Some(result) = app.result_rx.recv() => app.handle_async_result(result),
            }
        }
        Ok(())
    }
    .await;

    tui::restore()?;
    tracing::info!("exiting");
    result
}

fn render(app: &App, frame: &mut Frame) {
    use ratatui::layout::{Constraint, Layout};

    let area = frame.area();

    let (main_area, debug_area) = if app.debug.visible {
        let chunks = Layout::vertical([
            Constraint::Min(0),     // Main content
            Constraint::Length(10), // Debug pane
        ])
        .split(area);
        (chunks[0], Some(chunks[1]))
    } else {
        (area, None)
    };

    views::feed::render(frame, app, main_area);

    if let Some(debug_area) = debug_area {
        views::debug::render(frame, app, debug_area);
    }
}
