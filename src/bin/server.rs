use std::{
    env,
    fs::OpenOptions,
    net::{IpAddr, SocketAddr},
    process::ExitCode,
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    http::{HeaderValue, Method, header::CONTENT_TYPE},
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use aixstartup::{AppState, Error, build_router, graceful_shutdown, seed_demo_data};

/// The REST API server for AIxStartup.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database. Uses an in-memory
    /// database if omitted.
    #[arg(long)]
    db_path: Option<String>,

    /// The address to listen on.
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 4000)]
    port: u16,

    /// An origin allowed to make credentialed cross-origin requests. May be repeated.
    #[arg(long = "allowed-origin", default_value = "http://localhost:3001")]
    allowed_origins: Vec<String>,

    /// The canonical name of the local timezone, used for "this year" on the dashboard.
    #[arg(long, default_value = "Asia/Seoul")]
    timezone: String,

    /// Add a demo account (admin@aixstartup.com / admin123) with partners and transactions.
    #[arg(long)]
    demo_data: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();

    let args = Args::parse();

    let Ok(secret) = env::var("SECRET") else {
        tracing::error!("The environment variable 'SECRET' must be set");
        return ExitCode::FAILURE;
    };

    let connection = match &args.db_path {
        Some(db_path) => Connection::open(db_path),
        None => Connection::open_in_memory(),
    };
    let connection = match connection {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not open the database: {error}");
            return ExitCode::FAILURE;
        }
    };

    let state = match AppState::new(connection, &secret, &args.timezone) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("Could not initialize the database: {error}");
            return ExitCode::FAILURE;
        }
    };

    if args.demo_data {
        let result = match state.db_connection.lock() {
            Ok(connection) => seed_demo_data(&connection),
            Err(_) => Err(Error::DatabaseLockError),
        };

        match result {
            Ok(_) | Err(Error::DuplicateEmail) => {}
            Err(error) => {
                tracing::error!("Could not add the demo data: {error}");
                return ExitCode::FAILURE;
            }
        }
    }

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state).layer(cors_layer(&args.allowed_origins));
    let router = add_tracing_layer(router);

    let addr = SocketAddr::new(args.host, args.port);
    tracing::info!("HTTP server listening on {}", addr);

    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server error: {error}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    let (debug_log, log_file_error) = match OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
    {
        Ok(log_file) => {
            let debug_log = tracing_subscriber::fmt::layer()
                .pretty()
                .with_ansi(false)
                .with_writer(Arc::new(log_file))
                .with_filter(filter::LevelFilter::DEBUG);
            (Some(debug_log), None)
        }
        Err(error) => (None, Some(error)),
    };

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
        .init();

    if let Some(error) = log_file_error {
        tracing::warn!("Could not open debug.log, logging to stdout only: {error}");
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(origin) => Some(origin),
            Err(error) => {
                tracing::warn!("Ignoring invalid allowed origin {origin:?}: {error}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are already logged by `Error::into_response`.
        .on_failure(());

    router.layer(tracing_layer)
}
