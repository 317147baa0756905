// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use console::Emoji;
use tracing_subscriber::EnvFilter;

use overss::{AppState, ConfigStore, router};

// Emoji with fallback for terminals without Unicode support
static BOOKS: Emoji<'_, '_> = Emoji("📚 ", "");
static FEED: Emoji<'_, '_> = Emoji("📡 ", "[rss] ");
static LINK: Emoji<'_, '_> = Emoji("🔗 ", "[>] ");
static GLOBE: Emoji<'_, '_> = Emoji("🌐 ", "[>] ");

/// Serve a directory of audiobooks as a podcast RSS feed
#[derive(Parser, Debug)]
#[command(name = "overss")]
#[command(about = "Serve a directory of audiobooks as a podcast RSS feed")]
#[command(version)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Directory holding the web UI
    #[arg(long, default_value = "static")]
    static_dir: PathBuf,
}

/// Browser URL for the listen spec; `:PORT` means this machine
fn local_url(port: &str) -> String {
    if port.starts_with(':') {
        format!("http://localhost{port}")
    } else {
        format!("http://{port}")
    }
}

/// LAN URLs for a bare `:PORT` listen spec, one per non-loopback IPv4 address
fn network_urls(ips: impl IntoIterator<Item = IpAddr>, port: &str) -> Vec<String> {
    if !port.starts_with(':') {
        return Vec::new();
    }
    ips.into_iter()
        .filter(|ip| ip.is_ipv4() && !ip.is_loopback())
        .map(|ip| format!("http://{ip}{port}"))
        .collect()
}

fn interface_ips() -> Vec<IpAddr> {
    match if_addrs::get_if_addrs() {
        Ok(interfaces) => interfaces.iter().map(|iface| iface.ip()).collect(),
        Err(e) => {
            tracing::debug!("cannot list network interfaces: {e}");
            Vec::new()
        }
    }
}

fn print_banner(base_url: &str, port: &str) {
    println!(
        "\n{}{} {}\n",
        BOOKS,
        "overss".bold().magenta(),
        "- Audiobook RSS Server".dimmed()
    );
    println!("  {FEED}Feed:   {}", format!("{base_url}/feed.xml").cyan());
    println!("  {LINK}Local:  {}", local_url(port).cyan());
    for url in network_urls(interface_ips(), port) {
        println!("  {GLOBE}Network: {}", url.cyan());
    }
    println!("\n  {}\n", "Press Ctrl+C to stop the server".dimmed());
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("received Ctrl+C, shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let store = ConfigStore::open(&args.config)
        .with_context(|| format!("Failed to initialize config {}", args.config.display()))?;
    let config = store.snapshot().await;
    let addr = config.listen_addr();

    let app = router(AppState::new(store), args.static_dir);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!(
        addr = %addr,
        audio_dir = %config.audio_dir.display(),
        "Starting Overss RSS Server"
    );
    print_banner(&config.base_url, &config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server terminated")?;

    Ok(())
}
