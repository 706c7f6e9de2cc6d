/// Dharma Player server - personal music library and player backend
use clap::{Parser, Subcommand};
use dharma_core::UpdateUser;
use dharma_server::{build_state, config::ServerConfig, create_router, open_gateway};
use std::{net::SocketAddr, path::PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dharma-server")]
#[command(about = "Dharma Player music server", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "DHARMA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Create a new user
    AddUser {
        /// Email address used to sign in
        #[arg(short, long)]
        email: String,
        /// Password
        #[arg(short, long)]
        password: String,
        /// Grant admin rights
        #[arg(long)]
        admin: bool,
    },
    /// List all users
    ListUsers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dharma_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => serve(config).await?,
        Commands::AddUser {
            email,
            password,
            admin,
        } => add_user(&config, &email, &password, admin).await?,
        Commands::ListUsers => list_users(&config).await?,
    }

    Ok(())
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;

    tracing::info!("Starting Dharma Player server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);
    tracing::info!("Storage backend: {:?}", config.storage.backend);

    let app_state = build_state(&config).await?;
    let app = create_router(app_state, &config);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Uploads directory: {}", config.storage.uploads_dir.display());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn add_user(
    config: &ServerConfig,
    email: &str,
    password: &str,
    admin: bool,
) -> anyhow::Result<()> {
    let gateway = open_gateway(&config.storage).await?;

    let mut user = gateway.register(email, password).await?;
    if admin {
        user = gateway
            .update_user(
                user.id,
                UpdateUser {
                    is_admin: Some(true),
                    ..Default::default()
                },
            )
            .await?;
    }

    println!(
        "Created user {} ({}){}",
        user.id,
        user.email,
        if user.is_admin { " [admin]" } else { "" }
    );
    Ok(())
}

async fn list_users(config: &ServerConfig) -> anyhow::Result<()> {
    let gateway = open_gateway(&config.storage).await?;
    let users = gateway.list_users().await?;

    println!("Users:");
    for user in users {
        println!(
            "  {} - {}{}",
            user.id,
            user.email,
            if user.is_admin { " [admin]" } else { "" }
        );
    }

    Ok(())
}
