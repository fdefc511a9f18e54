//! devgate - command-line login client for the DevGate cloud backend.
//!
//! Runs a single command (`devgate login`) or, with no argument, an
//! interactive shell where the in-process session survives across commands.

mod ui;

use std::io;
use std::sync::Arc;

use anyhow::Result;
use devgate_core::api::HttpTransport;
use devgate_core::config::JsonConfigStore;
use devgate_core::connectivity::{ConnectivityMonitor, DnsProbe};
use devgate_core::LoginManager;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ui::TerminalUi;

/// Backend endpoint used when DEVGATE_API_URL is not set.
const DEFAULT_API_URL: &str = "https://api.devgate.dev";

/// Port probed when checking backend reachability.
const BACKEND_PORT: u16 = 443;

/// Initialize the tracing subscriber for logging.
/// Use RUST_LOG to control the level (e.g. RUST_LOG=debug).
fn init_tracing() -> tracing_appender::non_blocking::WorkerGuard {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // Non-blocking writer so log bursts never stall the interactive prompts.
    let (writer, guard) = tracing_appender::non_blocking(io::stderr());

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer))
        .with(filter)
        .init();

    guard
}

/// Host of `url`, for the DNS reachability probe.
fn host_of(url: &str) -> String {
    let trimmed = url
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    let host = trimmed.split(['/', ':']).next().unwrap_or(trimmed);
    host.to_string()
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    let _guard = init_tracing();

    let base_url = std::env::var("DEVGATE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let host = host_of(&base_url);
    info!(backend = %base_url, "devgate starting");

    let manager = Arc::new(LoginManager::new(
        base_url,
        Arc::new(HttpTransport::new()?),
        ConnectivityMonitor::new(Arc::new(DnsProbe::new(host, BACKEND_PORT))),
        Arc::new(TerminalUi::new()),
        Arc::new(JsonConfigStore),
    ));
    manager.initialize();

    match std::env::args().nth(1) {
        Some(command) => run_command(&manager, &command).await,
        None => run_shell(&manager).await,
    }
}

async fn run_command(manager: &LoginManager, command: &str) -> Result<()> {
    match command {
        "login" => {
            manager.login().await;
            report_status(manager);
        }
        "create-account" => {
            manager.create_account().await;
            report_status(manager);
        }
        "logout" => {
            manager.logout().await;
            report_status(manager);
        }
        "status" => report_status(manager),
        "token" => match manager.token() {
            Some(token) => println!("{}", token),
            None => {
                eprintln!("not logged in");
                std::process::exit(1);
            }
        },
        other => {
            eprintln!("unknown command: {}", other);
            eprintln!("usage: devgate [login|logout|create-account|status|token]");
            std::process::exit(2);
        }
    }
    Ok(())
}

async fn run_shell(manager: &Arc<LoginManager>) -> Result<()> {
    // Echo status transitions as they happen so the event stream is visible.
    let mut status_rx = manager.subscribe_status();
    tokio::spawn(async move {
        while status_rx.changed().await.is_ok() {
            let status = *status_rx.borrow_and_update();
            info!(status = %status, "status changed");
        }
    });

    println!("devgate interactive shell - commands: login, create-account, logout, status, token, quit");
    loop {
        let Some(line) = ui::read_line("devgate> ").await else {
            break;
        };
        match line.as_str() {
            "" => {}
            "login" => manager.login().await,
            "create-account" => manager.create_account().await,
            "logout" => manager.logout().await,
            "status" => report_status(manager),
            "token" => match manager.token() {
                Some(token) => println!("{}", token),
                None => println!("not logged in"),
            },
            "quit" | "exit" => break,
            other => println!("unknown command: {}", other),
        }
    }
    Ok(())
}

fn report_status(manager: &LoginManager) {
    match manager.sessions().first() {
        Some(session) => {
            let minutes = (chrono::Utc::now() - session.created_at).num_minutes().max(0);
            println!(
                "{} as {} (authenticated {}m ago)",
                manager.status(),
                session.user_id,
                minutes
            );
        }
        None => println!("{}", manager.status()),
    }
}
