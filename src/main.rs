//! Pokecache - An in-memory response cache with a background TTL reaper
//!
//! Interactive command loop that fetches resources through the cache.

use std::future::Future;
use std::io::Write;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pokecache::{Cache, Config, Fetcher};

/// A parsed line of user input.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Help,
    Fetch(&'a str),
    Stats,
    Exit,
}

impl<'a> Command<'a> {
    /// Parses one input line. Unknown or incomplete commands map to `Help`.
    fn parse(line: &'a str) -> Self {
        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("fetch"), Some(target)) => Command::Fetch(target),
            (Some("stats"), None) => Command::Stats,
            (Some("exit"), None) => Command::Exit,
            _ => Command::Help,
        }
    }
}

/// Main entry point for the pokecache command loop.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache (starts its reaper) and the fetcher
/// 4. Read commands from stdin until `exit`, end of input or Ctrl+C
/// 5. Shut the cache down, waiting for the reaper to stop
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pokecache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting pokecache");

    let config = Config::from_env();
    info!(
        "Configuration loaded: cache_lifespan={}s, request_timeout={}s, base_url={}",
        config.cache_lifespan, config.request_timeout, config.base_url
    );

    let cache = Cache::new(config.lifespan());
    let fetcher =
        Fetcher::new(cache.clone(), config.timeout()).context("Failed to build HTTP client")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;

    // One listener for the whole session, so a Ctrl+C that lands while a
    // command is running is still seen
    let ctrl_c = signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let Some(line) = unless_interrupted(lines.next_line(), &mut ctrl_c).await else {
            info!("Received Ctrl+C, initiating shutdown...");
            break;
        };
        let Some(line) = line.context("Failed to read from stdin")? else {
            break;
        };

        let command = run_command(Command::parse(&line), &fetcher, &config);
        let Some(keep_going) = unless_interrupted(command, &mut ctrl_c).await else {
            info!("Received Ctrl+C, abandoning command and shutting down...");
            break;
        };
        if !keep_going? {
            break;
        }
        prompt()?;
    }

    cache.shutdown().await;
    info!("Shutdown complete");
    Ok(())
}

/// Drives `work` to completion unless `interrupt` fires first.
///
/// `interrupt` is borrowed so the same signal future can guard every step.
async fn unless_interrupted<T, I>(
    work: impl Future<Output = T>,
    interrupt: &mut (impl Future<Output = I> + Unpin),
) -> Option<T> {
    tokio::select! {
        output = work => Some(output),
        _ = interrupt => None,
    }
}

/// Runs a single command. Returns false when the loop should stop.
async fn run_command(
    command: Command<'_>,
    fetcher: &Fetcher,
    config: &Config,
) -> anyhow::Result<bool> {
    match command {
        Command::Help => {
            println!();
            println!("Usage:");
            println!("  fetch <url|path>  Fetch a resource through the cache");
            println!("  stats             Show cache statistics");
            println!("  help              Display this message");
            println!("  exit              Quit");
            println!();
        }
        Command::Fetch(target) => {
            let url = config.resolve(target);
            match fetcher.fetch(&url).await {
                Ok(body) => println!("{}", render(&body)),
                // A failed fetch is reported, the loop keeps going
                Err(e) => warn!("{}", e),
            }
        }
        Command::Stats => {
            let stats = fetcher.cache().stats();
            println!("{}", serde_json::to_string_pretty(&stats)?);
            println!("hit_rate: {:.2}", stats.hit_rate());
        }
        Command::Exit => return Ok(false),
    }
    Ok(true)
}

/// Pretty-prints JSON bodies, falls back to lossy text for anything else.
fn render(body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned())
}

fn prompt() -> anyhow::Result<()> {
    print!("pokecache > ");
    std::io::stdout().flush()?;
    Ok(())
}
