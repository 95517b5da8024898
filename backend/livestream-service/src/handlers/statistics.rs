/// Statistics handlers - ranking statistics for users and livestreams
use super::{parse_id, AppState};
use crate::error::Result;
use crate::middleware::SessionUser;
use actix_web::{web, HttpResponse};

/// GET /users/{username}/statistics
pub async fn get_user_statistics(
    state: web::Data<AppState>,
    session: SessionUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let username = path.into_inner();
    tracing::debug!(viewer_id = session.0, %username, "user statistics requested");

    let stats = state.statistics.user_statistics(&username).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// GET /livestreams/{livestream_id}/statistics
pub async fn get_livestream_statistics(
    state: web::Data<AppState>,
    session: SessionUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let livestream_id = parse_id(&path, "livestream_id in path must be integer")?;
    tracing::debug!(viewer_id = session.0, livestream_id, "livestream statistics requested");

    let stats = state.statistics.livestream_statistics(livestream_id).await?;
    Ok(HttpResponse::Ok().json(stats))
}
