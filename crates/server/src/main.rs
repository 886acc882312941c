// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod events;
mod http;
mod processor;
mod worker;

#[cfg(test)]
mod test_support;

use axum::Router;
use clap::{Parser, Subcommand};
use kampcomp_api::{DEFAULT_WAIT_CAP_MS, PollSchedule};
use kampcomp_persistence::Persistence;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{error, info};

use events::QueueEvents;
use http::{AppState, build_router};
use processor::DrainOptions;
use worker::{DURATIONS, WorkerOptions, WorkerReport, holder_token};

/// Kampcomp Server - championship lists and their mutation queue
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long, global = true)]
    database: Option<String>,

    /// Longest time a write request waits for the worker, in milliseconds
    #[arg(long, global = true, default_value_t = DEFAULT_WAIT_CAP_MS)]
    wait_cap_ms: u64,

    /// Lifetime of a worker's lease on a competition, in seconds
    #[arg(long, global = true, default_value_t = 60)]
    lease_ttl_secs: i64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve HTTP with an in-process worker
    Serve {
        /// Port to bind the server to
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
    /// Drain the mutation queue
    Worker {
        /// Run length in minutes (seconds with --quick)
        #[arg(value_parser = parse_duration)]
        duration: u16,

        /// Drain once and exit
        #[arg(long)]
        quick: bool,

        /// Repeat each drain until nothing is left
        #[arg(long)]
        all: bool,

        /// Stop at this minute of the hour when it comes first
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..60))]
        stop_exactly: Option<u8>,

        /// Only drain this competition
        #[arg(long)]
        competitie: Option<i64>,
    },
}

fn parse_duration(value: &str) -> Result<u16, String> {
    let duration: u16 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a whole number"))?;
    if DURATIONS.contains(&duration) {
        Ok(duration)
    } else {
        Err(format!("duration must be one of {DURATIONS:?}"))
    }
}

fn open_persistence(database: Option<&str>) -> Result<Persistence, Box<dyn std::error::Error>> {
    if let Some(db_path) = database {
        info!("Using file-based database at: {}", db_path);
        Ok(Persistence::new_with_file(db_path)?)
    } else {
        info!("Using in-memory database");
        Ok(Persistence::new_in_memory()?)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Kampcomp Server");

    let persistence: Arc<Mutex<Persistence>> =
        Arc::new(Mutex::new(open_persistence(args.database.as_deref())?));
    let events: Arc<QueueEvents> = Arc::new(QueueEvents::new());
    let drain: DrainOptions = DrainOptions {
        holder: holder_token(OffsetDateTime::now_utc()),
        lease_ttl_secs: args.lease_ttl_secs,
        competitie: None,
    };

    match args.command {
        Command::Serve { port } => {
            let app_state: AppState = AppState {
                persistence: Arc::clone(&persistence),
                events: Arc::clone(&events),
                poll: PollSchedule::new(args.wait_cap_ms),
            };
            let app: Router = build_router(app_state);

            // Bind to address
            let addr: std::net::SocketAddr = format!("127.0.0.1:{port}").parse()?;
            info!("Server listening on {}", addr);
            let listener = tokio::net::TcpListener::bind(addr).await?;

            serve_with_worker(listener, app, persistence, events, drain).await?;
        }
        Command::Worker {
            duration,
            quick,
            all,
            stop_exactly,
            competitie,
        } => {
            let options: WorkerOptions = WorkerOptions {
                duration,
                quick,
                all,
                stop_exactly,
                drain: DrainOptions {
                    competitie,
                    ..drain
                },
            };
            let report: WorkerReport = worker::run(persistence, events, options).await?;
            info!(processed = report.processed, "Worker done");
        }
    }

    Ok(())
}

/// Runs the HTTP server with a worker next to it.
async fn serve_with_worker(
    listener: tokio::net::TcpListener,
    app: Router,
    persistence: Arc<Mutex<Persistence>>,
    events: Arc<QueueEvents>,
    drain: DrainOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let (served, ()) = futures::future::join(
        axum::serve(listener, app).into_future(),
        keep_worker_running(persistence, events, drain),
    )
    .await;
    served?;
    Ok(())
}

/// Restarts the in-process worker for the longest run length each time it
/// reaches its stop time.
async fn keep_worker_running(
    persistence: Arc<Mutex<Persistence>>,
    events: Arc<QueueEvents>,
    drain: DrainOptions,
) {
    let longest: u16 = DURATIONS[DURATIONS.len() - 1];
    loop {
        let options: WorkerOptions = WorkerOptions {
            duration: longest,
            quick: false,
            all: true,
            stop_exactly: None,
            drain: drain.clone(),
        };
        if let Err(err) = worker::run(Arc::clone(&persistence), Arc::clone(&events), options).await
        {
            error!(error = %err, "Worker stopped with an error");
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        }
    }
}
