//! coinwatch CLI
//!
//! Terminal host for the dashboard: an interactive browser driven by stdin
//! commands, a one-shot renderer, and a config generator.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use coinwatch::app::{render, Dashboard, Message, PageView, Screen};
use coinwatch::config::generate_default_config;
use coinwatch::{logging, Config, MarketClient, MarketQueries, RouteState, Theme};

#[derive(Parser)]
#[command(name = "coinwatch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Cryptocurrency price dashboard for the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: searched in the usual locations)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable ANSI colours
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse interactively. Commands: a path, a list row number, t, r, h, q
    Browse {
        /// Start page
        #[arg(default_value = "/")]
        path: String,
    },

    /// Render one page once it has loaded
    Show {
        /// Page path, e.g. "/btc-bitcoin/price"
        path: String,
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
        /// Give up waiting for data after this many seconds
        #[arg(short, long, default_value_t = 10)]
        wait_secs: u64,
    },

    /// Generate default configuration
    Config {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// One line typed in the interactive browser
#[derive(Debug, PartialEq)]
enum Input {
    Quit,
    Send(Message),
    /// 1-based row of the coin list
    Row(usize),
    Unknown(String),
}

impl Input {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let input = match line {
            "" => return None,
            "q" | "quit" => Input::Quit,
            "t" => Input::Send(Message::ToggleTheme),
            "r" => Input::Send(Message::Refresh),
            "h" => Input::Send(Message::Home),
            path if path.starts_with('/') => Input::Send(Message::Navigate(path.to_string(), None)),
            other => match other.parse::<usize>() {
                Ok(row) if row > 0 => Input::Row(row),
                _ => Input::Unknown(other.to_string()),
            },
        };
        Some(input)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("Config written to {}", path.display());
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    logging::init(&config.logging).context("initializing logging")?;
    tracing::info!("coinwatch v{}", env!("CARGO_PKG_VERSION"));

    let color = !cli.no_color && config.ui.color && std::io::stdout().is_terminal();
    let client = MarketClient::new(config.market_config()).context("building HTTP client")?;
    let queries = MarketQueries::new(Arc::new(client), config.cache_config());
    let mut dashboard = Dashboard::new(queries, config.view_config(), Theme::default());

    match cli.command {
        Commands::Browse { path } => browse(&mut dashboard, path, color).await,
        Commands::Show {
            path,
            format,
            wait_secs,
        } => {
            dashboard.update(Message::Navigate(path, None));
            if !dashboard.settle(Duration::from_secs(wait_secs)).await {
                tracing::warn!(wait_secs, "Page still loading, rendering what is cached");
            }
            let screen = dashboard.screen();
            match format {
                Format::Text => println!("{}", render::text(&screen, color)),
                Format::Json => println!("{}", render::json(&screen)?),
            }
            Ok(())
        }
        Commands::Config { .. } => Ok(()),
    }
}

async fn browse(dashboard: &mut Dashboard, path: String, color: bool) -> Result<()> {
    if path != "/" {
        dashboard.update(Message::Navigate(path, None));
    }
    draw(&dashboard.screen(), color, None);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let mut notice = None;
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    break;
                };
                match Input::parse(&line) {
                    None => {}
                    Some(Input::Quit) => break,
                    Some(Input::Send(message)) => dashboard.update(message),
                    Some(Input::Row(row)) => match row_link(&dashboard.screen(), row) {
                        Some((href, state)) => {
                            dashboard.update(Message::Navigate(href, Some(state)))
                        }
                        None => notice = Some(format!("No row {}", row)),
                    },
                    Some(Input::Unknown(other)) => {
                        notice = Some(format!("Unknown command: {}", other))
                    }
                }
            }
            _ = dashboard.changed() => {}
        }
        draw(&dashboard.screen(), color, notice.as_deref());
    }

    tracing::info!("Quit");
    Ok(())
}

/// Link of a coin list row, with the name carried as navigation state
fn row_link(screen: &Screen, row: usize) -> Option<(String, RouteState)> {
    let PageView::CoinList(view) = &screen.page else {
        return None;
    };
    let item = view.body.ready()?.get(row - 1)?;
    Some((item.link.href.clone(), item.link.state.clone()?))
}

fn draw(screen: &Screen, color: bool, notice: Option<&str>) {
    if color {
        // Clear and home.
        print!("\x1b[2J\x1b[H");
    } else {
        println!();
    }
    println!("{}", render::text(screen, color));
    if let Some(notice) = notice {
        println!("{}", notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        assert_eq!(Input::parse("  "), None);
        assert_eq!(Input::parse("q"), Some(Input::Quit));
        assert_eq!(Input::parse("t"), Some(Input::Send(Message::ToggleTheme)));
        assert_eq!(Input::parse("h\n"), Some(Input::Send(Message::Home)));
        assert_eq!(
            Input::parse("/btc-bitcoin/price"),
            Some(Input::Send(Message::Navigate("/btc-bitcoin/price".into(), None)))
        );
        assert_eq!(Input::parse("3"), Some(Input::Row(3)));
        assert_eq!(Input::parse("0"), Some(Input::Unknown("0".into())));
        assert_eq!(Input::parse("zz"), Some(Input::Unknown("zz".into())));
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::parse_from(["coinwatch", "show", "/btc-bitcoin", "-f", "json", "--no-color"]);
        assert!(cli.no_color);
        match cli.command {
            Commands::Show {
                path,
                format,
                wait_secs,
            } => {
                assert_eq!(path, "/btc-bitcoin");
                assert_eq!(format, Format::Json);
                assert_eq!(wait_secs, 10);
            }
            _ => panic!("expected show"),
        }
    }
}
