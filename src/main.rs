use anyhow::{Context, Result};
use asset_catalog::catalog::Catalog;
use asset_catalog::config::{Config, FeedProvider};
use asset_catalog::feed::{self, demo::DemoFeed, AssetFeed};
use asset_catalog::pipeline::Pipeline;
use asset_catalog::proxy::{self, ProxyState};
use asset_catalog::tui;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG: &str = "config.toml";
const DEMO_LATENCY: Duration = Duration::from_millis(800);

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliFlags {
    help: bool,
    demo: bool,
    serve: bool,
    config: Option<PathBuf>,
}

fn parse_cli_flags(args: &[String]) -> Result<CliFlags> {
    let mut flags = CliFlags::default();
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => flags.help = true,
            "--demo" => flags.demo = true,
            "--serve" => flags.serve = true,
            "--config" => {
                let path = iter
                    .next()
                    .with_context(|| "--config requires a path argument")?;
                flags.config = Some(PathBuf::from(path));
            }
            value if value.starts_with('-') => {
                anyhow::bail!(
                    "Unknown option: '{}'. Use --help to see supported options.",
                    value
                );
            }
            value => {
                anyhow::bail!(
                    "Unexpected positional argument: '{}'. Use --help to see supported options.",
                    value
                );
            }
        }
    }
    Ok(flags)
}

fn print_help() {
    println!("asset-catalog [--config <path>] [--demo] [--serve]");
    println!();
    println!("  --config <path>  config file (default: {})", DEFAULT_CONFIG);
    println!("  --demo           use the built-in sample catalog, no network");
    println!("  --serve          run the GET /api/assets proxy instead of the dashboard");
    println!();
    println!("Environment: SHEETS_JSON_URL, APPS_SCRIPT_URL, ASSET_FEED_PROVIDER, ASSET_PROXY_BIND");
}

fn load_config(flags: &CliFlags) -> Result<Config> {
    // Load saved endpoints from .env (real env vars take precedence)
    Config::load_env_file();

    let mut config = match &flags.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(&PathBuf::from(DEFAULT_CONFIG))?,
    };
    config.apply_env_overrides()?;
    if flags.demo {
        config.feed.provider = FeedProvider::Demo;
    }
    Ok(config)
}

async fn run_proxy(config: Config) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},tower_http=info", config.logging.filter).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = match feed::build_feed(&config) {
        Ok(feed) => ProxyState::new(feed, config.proxy_revalidate()),
        Err(e) => {
            tracing::warn!(error = %e, "no feed available, every request will fail");
            ProxyState::unconfigured()
        }
    };

    let listener = tokio::net::TcpListener::bind(&config.proxy.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.proxy.bind))?;
    let addr = listener.local_addr()?;
    tracing::info!("asset proxy listening on http://{}/api/assets", addr);

    proxy::serve(listener, state, shutdown_signal()).await?;
    tracing::info!("asset proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn run_dashboard(config: Config) -> Result<()> {
    let log_file = std::fs::File::create(&config.logging.file)
        .with_context(|| format!("Failed to create log file: {}", config.logging.file))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.clone().into()),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .init();

    let feed: Arc<dyn AssetFeed> = match config.feed.provider {
        FeedProvider::Demo => Arc::new(DemoFeed::sample().with_latency(DEMO_LATENCY)),
        _ => feed::build_feed(&config)?,
    };
    let writer = feed::build_writer(&config)?;
    if writer.is_none() {
        tracing::info!("no write endpoint configured, edits stay local");
    }

    let (pipeline, events) = Pipeline::new(feed, writer);
    tui::run_tui(Catalog::new(), pipeline, events).await?;

    tracing::debug!("shutting down");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let flags = parse_cli_flags(&args)?;
    if flags.help {
        print_help();
        return Ok(());
    }

    let config = load_config(&flags)?;
    if flags.serve {
        run_proxy(config).await
    } else {
        run_dashboard(config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("asset-catalog")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_cli_flags() {
        let flags = parse_cli_flags(&args(&["--demo", "--config", "alt.toml"])).unwrap();
        assert!(flags.demo);
        assert!(!flags.serve);
        assert_eq!(flags.config, Some(PathBuf::from("alt.toml")));
    }

    #[test]
    fn test_parse_cli_flags_rejects_unknown() {
        assert!(parse_cli_flags(&args(&["--simulate"])).is_err());
        assert!(parse_cli_flags(&args(&["extra"])).is_err());
        assert!(parse_cli_flags(&args(&["--config"])).is_err());
    }
}
