mod attachment;
mod cli;
mod config;
mod gateway;
mod models;
mod session;
mod wizard;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::attachment::PreviewRegistry;
use crate::config::Config;
use crate::gateway::HttpAuthGateway;
use crate::session::{AuthSession, TokenStore};
use crate::wizard::steps::Flow;
use crate::wizard::Wizard;

enum Mode {
    Signup,
    Login,
    Logout,
    PasswordReset,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting onboarding portal v{}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let flow = if args.iter().any(|a| a == "business") {
        Flow::Business
    } else {
        Flow::JobSeeker
    };
    let mode = if args.iter().any(|a| a == "login") {
        Mode::Login
    } else if args.iter().any(|a| a == "logout") {
        Mode::Logout
    } else if args.iter().any(|a| a == "reset-password") {
        Mode::PasswordReset
    } else {
        Mode::Signup
    };
    let role = flow.role();

    let gateway = Arc::new(HttpAuthGateway::new(
        config.api_base_url.clone(),
        role,
        config.request_timeout_secs,
    ));
    info!(
        "Gateway ready for the {} portal at {}",
        role.prefix(),
        config.api_base_url
    );

    let store = TokenStore::new(&config.state_dir);
    let mut session = AuthSession::bootstrap(store, role);

    match mode {
        Mode::Login => {
            if session.is_authenticated() {
                println!("Already signed in (token under '{}').", role.auth_key());
                return Ok(());
            }
            cli::run_login(gateway.as_ref(), &mut session).await
        }
        Mode::Logout => {
            session.logout()?;
            println!("Signed out of the {} portal.", role.prefix());
            Ok(())
        }
        Mode::PasswordReset => cli::run_password_reset(gateway.as_ref()).await,
        Mode::Signup => {
            if session.is_authenticated() {
                println!(
                    "Already signed in (token under '{}'). Log out before registering again.",
                    role.auth_key()
                );
                return Ok(());
            }
            let previews = PreviewRegistry::new();
            let mut wizard = Wizard::new(flow, gateway, previews);
            cli::run_wizard(&mut wizard, &mut session).await
        }
    }
}
