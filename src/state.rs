// src/state.rs
// Shared application state handed to every request handler

use anyhow::Result;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;

use crate::{
    config::AppConfig,
    geocoding::{Geocoder, GoogleGeocoder},
    notify::{AdoptionNotifier, HttpMailer, LogMailer, Mailer},
    things::{Locator, SqliteThingStore, ThingRepository, ThingService},
    users::{SqliteUserStore, UserRepository},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,

    // -------- Storage --------
    pub things: Arc<dyn ThingRepository>,
    pub users: Arc<dyn UserRepository>,

    // -------- Collaborators --------
    pub geocoder: Arc<dyn Geocoder>,

    // -------- Services --------
    pub locator: Arc<Locator>,
    pub thing_service: Arc<ThingService>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        things: Arc<dyn ThingRepository>,
        users: Arc<dyn UserRepository>,
        geocoder: Arc<dyn Geocoder>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let locator = Arc::new(Locator::new(things.clone(), config.search_radius_meters));
        let notifier = Arc::new(AdoptionNotifier::new(mailer, geocoder.clone(), config.mail_from.clone()));
        let thing_service = Arc::new(ThingService::new(things.clone(), users.clone(), notifier));

        Self {
            config: Arc::new(config),
            things,
            users,
            geocoder,
            locator,
            thing_service,
        }
    }
}

/// Wire the production collaborators: SQLite stores, Google geocoding and
/// the HTTP mail API (or log-only delivery when no API is configured).
pub fn create_app_state(config: AppConfig, pool: SqlitePool) -> Result<AppState> {
    let things: Arc<dyn ThingRepository> = Arc::new(SqliteThingStore::new(pool.clone()));
    let users: Arc<dyn UserRepository> = Arc::new(SqliteUserStore::new(pool));

    let geocoder: Arc<dyn Geocoder> = Arc::new(GoogleGeocoder::new(
        &config.geocoder_base_url,
        config.geocoder_api_key.clone(),
        config.geocoder_timeout(),
    )?);

    let mailer: Arc<dyn Mailer> = match &config.mail_api_url {
        Some(url) => {
            info!("Mail delivery via {}", url);
            Arc::new(HttpMailer::new(url.clone(), config.mail_api_key.clone(), config.mail_timeout())?)
        }
        None => {
            info!("MAIL_API_URL not set, mail will only be logged");
            Arc::new(LogMailer)
        }
    };

    Ok(AppState::new(config, things, users, geocoder, mailer))
}
