//! Command implementations.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use minisocial_core::api::ApiError;
use minisocial_core::guard::{gate, Gate, Route};
use minisocial_core::models::{LoginCredentials, RegisterRequest};
use minisocial_core::{ApiClient, Config, HydrateOutcome, SessionManager, SessionState};

// ============================================================================
// Session
// ============================================================================

/// Build the session manager over the configured token store.
fn build_session(config: &Config, api: ApiClient) -> Result<Arc<SessionManager>> {
    let store = config.token_store()?;
    let session = Arc::new(SessionManager::new(store, Arc::new(api)));

    let mut changes = session.subscribe();
    tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            let state = changes.borrow_and_update().clone();
            debug!(?state, "Session state changed");
        }
    });
    Ok(session)
}

/// Build the session manager and run the one startup hydrate.
async fn start_session(config: &Config, api: ApiClient) -> Result<Arc<SessionManager>> {
    let session = build_session(config, api)?;
    match session.hydrate().await {
        HydrateOutcome::NoCredential => debug!("No saved session"),
        HydrateOutcome::Restored(user) => debug!(user_id = %user.id, "Saved session restored"),
        HydrateOutcome::Invalidated(reason) => debug!(%reason, "Saved session dropped"),
    }
    Ok(session)
}

pub async fn whoami(config: &Config, api: ApiClient) -> Result<()> {
    let session = start_session(config, api).await?;
    match session.wait_until_known().await {
        SessionState::Authenticated(user) => {
            println!("Logged in as {}", user);
            if let Some(bio) = user.bio.as_deref().filter(|b| !b.is_empty()) {
                println!("  \"{}\"", bio);
            }
        }
        _ => println!("Not logged in"),
    }
    Ok(())
}

pub async fn login(config: &Config, api: ApiClient, email: Option<String>) -> Result<()> {
    let session = start_session(config, api).await?;
    if let Some(user) = session.current_user() {
        println!("Already logged in as {}. Run `minisocial logout` first.", user);
        return Ok(());
    }

    let email = match email.or_else(|| std::env::var("MINISOCIAL_EMAIL").ok()) {
        Some(email) => email,
        None => prompt("Email: ")?,
    };
    let password = match std::env::var("MINISOCIAL_PASSWORD") {
        Ok(password) => password,
        Err(_) => rpassword::prompt_password("Password: ")?,
    };
    if email.trim().is_empty() || password.is_empty() {
        return Err(anyhow::anyhow!("Email and password required"));
    }

    let credentials = LoginCredentials::new(email.trim(), password);
    match session.login(&credentials).await {
        Ok(user) => {
            println!("Welcome, {}!", user.name);
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", e.user_message());
            Err(e.into())
        }
    }
}

/// Local only: clears the stored token without asking the server.
pub fn logout(config: &Config, api: ApiClient) -> Result<()> {
    let session = build_session(config, api)?;
    session.logout();
    println!("Logged out");
    Ok(())
}

pub async fn open(config: &Config, api: ApiClient, path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or("/");
    let route = Route::from_path(path).ok_or_else(|| anyhow::anyhow!("No page at {}", path))?;
    let session = start_session(config, api).await?;

    match gate(&route, &session.state()) {
        Gate::Wait => println!("{}: loading", route),
        Gate::Landing => println!("{}: welcome page (log in or register)", route),
        Gate::Feed(user) => println!("{}: feed for {}", route, user.name),
        Gate::Render { viewer: Some(user) } => println!("{}: viewing as {}", route, user.name),
        Gate::Render { viewer: None } => println!("{}: viewing as guest", route),
    }
    Ok(())
}

// ============================================================================
// Registration and recovery
// ============================================================================

pub async fn register(api: &ApiClient) -> Result<()> {
    let request = RegisterRequest {
        name: prompt("Full name: ")?,
        email: prompt("Email: ")?,
        username: prompt("Username: ")?,
        password: rpassword::prompt_password("Password: ")?,
        bio: prompt("Bio: ")?,
    };
    let email = request.email.clone();
    let response = api.register(&request).await.map_err(report)?;
    print_message(&response.message, "Registration started");
    println!("Check {} for a code, then run `minisocial verify-otp {} <otp>`", email, email);
    Ok(())
}

pub async fn verify_otp(api: &ApiClient, args: &[String]) -> Result<()> {
    let [email, otp] = args else {
        return Err(anyhow::anyhow!("usage: minisocial verify-otp <email> <otp>"));
    };
    let response = api.verify_otp(email, otp).await.map_err(report)?;
    print_message(&response.message, "Account verified");
    println!("You can now run `minisocial login {}`", email);
    Ok(())
}

pub async fn forgot_password(api: &ApiClient, args: &[String]) -> Result<()> {
    let [email] = args else {
        return Err(anyhow::anyhow!("usage: minisocial forgot-password <email>"));
    };
    let response = api.forgot_password(email).await.map_err(report)?;
    print_message(&response.message, "Reset code sent");
    Ok(())
}

pub async fn reset_password(api: &ApiClient, args: &[String]) -> Result<()> {
    let [email, otp] = args else {
        return Err(anyhow::anyhow!("usage: minisocial reset-password <email> <otp>"));
    };
    let new_password = rpassword::prompt_password("New password: ")?;
    let response = api
        .reset_password(email, otp, &new_password)
        .await
        .map_err(report)?;
    print_message(&response.message, "Password reset");
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim().to_string())
}

fn print_message(message: &str, fallback: &str) {
    if message.is_empty() {
        println!("{}", fallback);
    } else {
        println!("{}", message);
    }
}

/// Show the server's message the way the web forms did, then propagate.
fn report(err: ApiError) -> anyhow::Error {
    eprintln!("{}", err.message().unwrap_or("Something went wrong"));
    err.into()
}
