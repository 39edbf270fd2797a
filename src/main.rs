use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use std::io;
use std::sync::Arc;

use taskgate::config::Config;
use taskgate::routes;
use taskgate::state::{decision_point, AppState};
use taskgate::store::{DocumentStore, MemoryStore, PgDocumentStore};

async fn open_store(config: &Config) -> io::Result<Arc<dyn DocumentStore>> {
    match &config.database_url {
        Some(url) => {
            let store = PgDocumentStore::connect(url)
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            store
                .ensure_schema()
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            log::info!("using postgres document store");
            Ok(Arc::new(store))
        }
        None => {
            log::warn!("DATABASE_URL not set; using in-memory document store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    if config.token_previous_secret.is_some() {
        log::info!("token rotation window open; previous secret still accepted");
    }

    let store = open_store(&config).await?;
    let state = AppState::new(store, &config)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    let state = web::Data::new(state);
    let pdp = web::Data::new(decision_point(&config));

    log::info!("starting taskgate at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(pdp.clone())
            .wrap(routes::cors())
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
