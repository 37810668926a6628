//! LocEHPAD Server
//!
//! Serves the REST API, or bootstraps the first administrator account.

use std::io::{self, BufRead, Write};
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{bail, Context};
use axum::http::{header, HeaderValue, Method};
use clap::{Parser, Subcommand};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use locehpad::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[derive(Parser)]
#[command(name = "locehpad-server", version, about = "LocEHPAD REST server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create the first administrator; password is read from stdin
    CreateAdmin {
        #[arg(long)]
        username: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Failed to load configuration")?;

    init_tracing(&config);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::CreateAdmin { username } => create_admin(config, &username).await,
    }
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("locehpad={},tower_http=debug", config.logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");
    Ok(pool)
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting LocEHPAD Server v{}", env!("CARGO_PKG_VERSION"));

    let pool = connect(&config).await?;

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );
    let cors = cors_layer(&config)?;

    let services = Services::new(Repository::new(pool), config.auth.clone(), config.email.clone());
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = api::router(state).layer(cors);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn cors_layer(config: &AppConfig) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if config.cors.allowed_origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }

    let origins = config
        .cors
        .allowed_origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .context("Invalid CORS origin")?;
    Ok(layer.allow_origin(origins).allow_credentials(true))
}

async fn create_admin(config: AppConfig, username: &str) -> anyhow::Result<()> {
    let username = username.trim();
    if username.is_empty() {
        bail!("Username cannot be empty");
    }

    let (password, confirmation) = {
        let mut lines = io::stdin().lock().lines();
        (prompt(&mut lines, "Password: ")?, prompt(&mut lines, "Confirm password: ")?)
    };

    if password.is_empty() {
        bail!("Password cannot be empty");
    }
    if password != confirmation {
        bail!("Passwords do not match");
    }

    let pool = connect(&config).await?;
    let services = Services::new(Repository::new(pool), config.auth.clone(), config.email.clone());

    let admin = services.users.create_admin(username, &password).await?;
    tracing::info!(user_id = admin.id, "administrator created");
    println!("Administrator '{}' created", admin.username);
    Ok(())
}

fn prompt(lines: &mut impl Iterator<Item = io::Result<String>>, label: &str) -> anyhow::Result<String> {
    eprint!("{}", label);
    io::stderr().flush()?;
    let line = lines.next().context("Unexpected end of input")??;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
