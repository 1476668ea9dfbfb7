use crate::{
    config::JwtConfig,
    database::DbPool,
    services::{media::SharedMediaStore, notifications::NotificationQueue},
};

/// Application state shared across all HTTP handlers
///
/// Every client is built once in `main` and injected here; nothing in the
/// state is mutated after construction.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool for accessing the database
    pub pool: DbPool,
    /// Token signing settings
    pub jwt: JwtConfig,
    /// Image storage adapter
    pub media: SharedMediaStore,
    /// Sending half of the notification queue drained by the dispatch worker
    pub notifier: NotificationQueue,
}

impl AppState {
    /// Create a new AppState instance
    pub fn new(
        pool: DbPool,
        jwt: JwtConfig,
        media: SharedMediaStore,
        notifier: NotificationQueue,
    ) -> Self {
        Self {
            pool,
            jwt,
            media,
            notifier,
        }
    }
}
