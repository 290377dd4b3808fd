//! # SipDB
//!
//! A minimal drink inventory manager with a terminal interface and a REST
//! API over the same SQLite table.
//!
//! ## Quick Start
//!
//! ```bash
//! # Create the schema, add a row, list it
//! sipdb create_db
//! sipdb add "Mojito" "Minty"
//! sipdb list
//!
//! # Start the REST API (port 3000 by default)
//! sipdb serve
//! ```
//!
//! ## API Usage
//!
//! ```bash
//! curl -X POST http://localhost:3000/drinks \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "Mojito", "description": "Minty"}'
//!
//! curl http://localhost:3000/drinks/1
//! ```

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use sipdb::api::{create_router, AppState};
use sipdb::cli::{self, Command};
use sipdb::db::SipStore;

/// CLI arguments
struct Args {
    /// Database file path
    db_path: String,
    /// Server port (serve only)
    port: u16,
    /// Host to bind to (serve only)
    host: String,
    /// Use in-memory database
    in_memory: bool,
    /// Positional arguments: verb plus its operands
    command: Vec<String>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            db_path: "drinks.db".to_string(),
            port: 3000,
            host: "0.0.0.0".to_string(),
            in_memory: false,
            command: Vec::new(),
        }
    }
}

impl Args {
    fn from_env() -> Self {
        let mut args = Args::default();
        let env_args: Vec<String> = env::args().collect();
        let mut i = 1;

        while i < env_args.len() {
            match env_args[i].as_str() {
                "--db" | "-d" => {
                    if i + 1 < env_args.len() {
                        args.db_path = env_args[i + 1].clone();
                        i += 1;
                    }
                }
                "--port" | "-p" => {
                    if i + 1 < env_args.len() {
                        args.port = env_args[i + 1].parse().unwrap_or(3000);
                        i += 1;
                    }
                }
                "--host" => {
                    if i + 1 < env_args.len() {
                        args.host = env_args[i + 1].clone();
                        i += 1;
                    }
                }
                "--memory" | "-m" => {
                    args.in_memory = true;
                }
                "--help" => {
                    print_help();
                    std::process::exit(0);
                }
                other => {
                    args.command.push(other.to_string());
                }
            }
            i += 1;
        }

        // Environment variable overrides
        if let Ok(db) = env::var("SIPDB_PATH") {
            args.db_path = db;
        }
        if let Ok(port) = env::var("SIPDB_PORT") {
            args.port = port.parse().unwrap_or(args.port);
        }
        if let Ok(host) = env::var("SIPDB_HOST") {
            args.host = host;
        }
        if env::var("SIPDB_MEMORY").is_ok() {
            args.in_memory = true;
        }

        args
    }
}

fn print_help() {
    println!(
        r#"
SipDB - Drink Inventory Manager

{usage}

OPTIONS:
    -d, --db <PATH>      Database file path [default: drinks.db]
    -p, --port <PORT>    Server port for serve [default: 3000]
        --host <HOST>    Host to bind to [default: 0.0.0.0]
    -m, --memory         Use in-memory database
        --help           Print this help message

ENVIRONMENT VARIABLES:
    SIPDB_PATH           Database file path
    SIPDB_PORT           Server port
    SIPDB_HOST           Host to bind to
    SIPDB_MEMORY         Set to use in-memory database

API ENDPOINTS (serve):
    POST   /drinks       Create a drink
    GET    /drinks       List all drinks
    GET    /drinks/:id   Get a drink by id
    PUT    /drinks/:id   Replace a drink
    PATCH  /drinks/:id   Update provided fields only
    DELETE /drinks/:id   Delete a drink
    GET    /health       Health check
"#,
        usage = cli::USAGE
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    let args = Args::from_env();

    if args.command.is_empty() {
        println!("{}", cli::USAGE);
        return Ok(());
    }

    let command = match Command::parse(&args.command) {
        Some(command) => command,
        None => {
            println!("Unknown command!");
            println!("{}", cli::USAGE);
            return Ok(());
        }
    };

    let store = if args.in_memory {
        Arc::new(SipStore::in_memory().await?)
    } else {
        Arc::new(SipStore::new(&args.db_path).await?)
    };

    match command {
        Command::Serve => serve(store, &args.host, args.port).await,
        command => match cli::execute(&store, command).await {
            Ok(message) => {
                println!("{}", message);
                Ok(())
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
    }
}

async fn serve(store: Arc<SipStore>, host: &str, port: u16) -> Result<()> {
    // The schema must exist before the first request; initialize is
    // idempotent so this is safe on every start.
    store.initialize().await?;

    let state = AppState::new(store);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("SipDB listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install CTRL+C signal handler");
        })
        .await?;

    Ok(())
}
