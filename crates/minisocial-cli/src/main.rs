//! minisocial - command-line client for the minisocial network.
//!
//! Session commands hydrate the stored token once at startup and then
//! drive the session manager; registration and recovery commands talk to
//! the API directly and never touch the session.

mod commands;

use std::io;
use std::path::Path;

use anyhow::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use minisocial_core::{ApiClient, Config};

/// Log file name in the data directory
const LOG_FILE: &str = "minisocial.log";

const USAGE: &str = "\
Usage: minisocial <command> [args]

Session:
  whoami                        Show who is logged in (default)
  login [email]                 Log in; password is prompted
  logout                        Forget the stored session
  open <path>                   Show what a page would render, e.g. open /

Account:
  register                      Create an account (sends an OTP)
  verify-otp <email> <otp>      Confirm a new account
  forgot-password <email>       Email a password reset OTP
  reset-password <email> <otp>  Set a new password; prompted

Environment:
  MINISOCIAL_API_URL, MINISOCIAL_TOKEN_BACKEND (file|keyring),
  MINISOCIAL_EMAIL, MINISOCIAL_PASSWORD, RUST_LOG";

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr (filtered by RUST_LOG, default warn) and, when the
/// data directory is available, to a log file there as well.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let stderr_layer = fmt::layer().with_writer(io::stderr);

    let (file_layer, guard) = match log_dir.filter(|dir| std::fs::create_dir_all(dir).is_ok()) {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::load()?;
    let log_dir = config.data_dir().ok();
    let _log_guard = init_tracing(log_dir.as_deref());
    info!(api = %config.api_base_url, backend = ?config.token_backend, "minisocial starting");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("whoami");
    let rest = args.get(1..).unwrap_or(&[]);

    let api = ApiClient::from_config(&config)?;

    match command {
        "whoami" => commands::whoami(&config, api).await,
        "login" => commands::login(&config, api, rest.first().cloned()).await,
        "logout" => commands::logout(&config, api),
        "open" => commands::open(&config, api, rest.first().map(String::as_str)).await,
        "register" => commands::register(&api).await,
        "verify-otp" => commands::verify_otp(&api, rest).await,
        "forgot-password" => commands::forgot_password(&api, rest).await,
        "reset-password" => commands::reset_password(&api, rest).await,
        "help" | "--help" | "-h" => {
            println!("{}", USAGE);
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}\n\n{}", other, USAGE);
            Err(anyhow::anyhow!("unknown command {}", other))
        }
    }
}
