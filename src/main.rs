// src/main.rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use adopt_a_drain::config::CONFIG;
use adopt_a_drain::server::{self, create_optimized_pool, run_migrations};
use adopt_a_drain::state::create_app_state;
use adopt_a_drain::things::SqliteThingStore;
use adopt_a_drain::users::{NewUser, SqliteUserStore, UserRepository};

#[derive(Parser)]
#[command(name = "adopt-a-drain", version, about = "Find, adopt and rename storm drains")]
struct Cli {
    /// SQLite database url
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long, short = 'p')]
        port: Option<u16>,
    },
    /// Load drains from a JSON array of {name, lat, lng}
    Import {
        file: PathBuf,
    },
    /// Register a user and print their API token
    CreateUser {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let mut config = CONFIG.clone();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.tracing_level())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    if let Some(url) = cli.database_url {
        config.database_url = url;
    }

    let pool = create_optimized_pool(&config.database_url, config.sqlite_max_connections).await?;
    run_migrations(&pool).await?;

    match cli.command.unwrap_or(Command::Serve { host: None, port: None }) {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            info!("Starting Adopt-a-Drain v{}", env!("CARGO_PKG_VERSION"));
            info!("Search radius: {}m", config.search_radius_meters);

            let bind_address = config.bind_address();
            let app_state = Arc::new(create_app_state(config, pool)?);
            server::serve(app_state, &bind_address).await?;
        }
        Command::Import { file } => {
            let store = SqliteThingStore::new(pool);
            let summary = adopt_a_drain::import::import_file(&store, &file).await?;
            info!("Import finished: {} imported, {} skipped", summary.imported, summary.skipped);
        }
        Command::CreateUser { name, email } => {
            let store = SqliteUserStore::new(pool);
            let user = store
                .create(NewUser {
                    name,
                    email,
                    api_token: uuid::Uuid::new_v4().simple().to_string(),
                })
                .await?;
            info!("Created user {} <{}>", user.id, user.email);
            println!("{}", user.api_token);
        }
    }

    Ok(())
}
