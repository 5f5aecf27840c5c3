mod config;
mod error;
mod import;
mod job_controller;
mod services;
mod sessions;
mod storage;

use crate::config::Config;
use crate::job_controller::state::JobsState;
use crate::sessions::ImportState;
use crate::storage::SqliteStore;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::info;
use std::io;
use std::sync::Arc;
use std::time::Duration;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::load().map_err(io::Error::other)?;
    let store = Arc::new(SqliteStore::open(&config.database_path).map_err(io::Error::other)?);
    info!("Storage at {}", config.database_path.display());

    // Initialize job controller state
    let (jobs_state, rx) = JobsState::new(100);

    // Start job updater task
    let updater_state = jobs_state.clone();
    tokio::spawn(async move {
        job_controller::state::start_job_updater(updater_state, rx).await;
    });

    let host = config.host.clone();
    let port = config.port;
    let json_limit = config.upload_limit_bytes;
    let import_state = ImportState::new(config, store.clone(), store);

    // Drop import sessions nobody came back for
    let sweeper_state = import_state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let dropped = sweeper_state.evict_idle().await;
            if dropped > 0 {
                info!(
                    "Dropped {} idle import sessions, {} left",
                    dropped,
                    sweeper_state.count().await
                );
            }
        }
    });

    info!("Server running at http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(json_limit))
            .app_data(web::Data::new(jobs_state.clone()))
            .app_data(web::Data::new(import_state.clone()))
            .service(services::data_sources::csv::configure_routes())
            .service(services::merge::configure_routes())
            .service(services::templates::configure_routes())
            .service(services::records::configure_routes())
    })
    .bind((host, port))?
    .run()
    .await
}
