/// HTTP handlers for livestream-service
///
/// - `statistics`: user and livestream ranking statistics
/// - `reactions`: list and post emoji reactions
/// - `health`: liveness/readiness probes backed by a store ping
///
/// Every livestream and user route requires a session; health and metrics
/// endpoints do not.
pub mod health;
pub mod reactions;
pub mod statistics;

pub use health::{health_summary, liveness_check, readiness_summary};
pub use reactions::{get_reactions, post_reaction};
pub use statistics::{get_livestream_statistics, get_user_statistics};

use crate::db::Store;
use crate::error::AppError;
use crate::middleware::{SessionAuth, SessionVerifier};
use crate::services::{ReactionService, StatisticsService};
use actix_web::web;
use std::sync::Arc;

/// Shared state handed to every handler through `web::Data`
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub statistics: StatisticsService,
    pub reactions: ReactionService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            statistics: StatisticsService::new(store.clone()),
            reactions: ReactionService::new(store.clone()),
            store,
        }
    }
}

/// Parse a numeric path segment, reporting `message` as a client error.
pub(crate) fn parse_id(raw: &str, message: &str) -> Result<i64, AppError> {
    raw.parse::<i64>().map_err(|_| AppError::bad_request(message))
}

/// Register all routes. `AppState` must be registered as app data.
pub fn configure_routes(cfg: &mut web::ServiceConfig, verifier: Arc<SessionVerifier>) {
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        AppError::bad_request(format!("failed to decode the request body as json: {}", err))
            .into()
    });

    cfg.route("/metrics", web::get().to(crate::metrics::serve_metrics))
        .route("/api/v1/health", web::get().to(health_summary))
        .route("/api/v1/health/ready", web::get().to(readiness_summary))
        .route("/api/v1/health/live", web::get().to(liveness_check))
        .service(
            web::scope("/livestreams")
                .wrap(SessionAuth::new(verifier.clone()))
                .app_data(json_config)
                .service(
                    web::resource("/{livestream_id}/reactions")
                        .route(web::get().to(get_reactions))
                        .route(web::post().to(post_reaction)),
                )
                .service(
                    web::resource("/{livestream_id}/statistics")
                        .route(web::get().to(get_livestream_statistics)),
                ),
        )
        .service(
            web::scope("/users")
                .wrap(SessionAuth::new(verifier))
                .service(
                    web::resource("/{username}/statistics")
                        .route(web::get().to(get_user_statistics)),
                ),
        );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_rejects_non_integers() {
        assert_eq!(parse_id("42", "bad").unwrap(), 42);
        assert!(matches!(
            parse_id("4x2", "livestream_id in path must be integer"),
            Err(AppError::BadRequest(msg)) if msg == "livestream_id in path must be integer"
        ));
        assert!(parse_id("", "bad").is_err());
    }
}
