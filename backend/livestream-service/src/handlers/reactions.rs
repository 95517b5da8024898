/// Reaction handlers - list and post emoji reactions on a livestream
use super::{parse_id, AppState};
use crate::error::{AppError, Result};
use crate::middleware::SessionUser;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize)]
pub struct ListReactionsQuery {
    /// Kept as a string so a malformed value yields our own 400 message
    pub limit: Option<String>,
}

impl ListReactionsQuery {
    /// `None` when absent or empty
    pub fn parsed_limit(&self) -> Result<Option<i64>> {
        match self.limit.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => match raw.parse::<i64>() {
                Ok(limit) if limit >= 0 => Ok(Some(limit)),
                _ => Err(AppError::bad_request(
                    "limit query parameter must be integer",
                )),
            },
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct PostReactionRequest {
    #[validate(length(min = 1, max = 255))]
    pub emoji_name: String,
}

/// GET /livestreams/{livestream_id}/reactions
pub async fn get_reactions(
    state: web::Data<AppState>,
    _session: SessionUser,
    path: web::Path<String>,
    query: web::Query<ListReactionsQuery>,
) -> Result<HttpResponse> {
    let livestream_id = parse_id(&path, "livestream_id in path must be integer")?;
    let limit = query.parsed_limit()?;

    let reactions = state.reactions.list_reactions(livestream_id, limit).await?;
    Ok(HttpResponse::Ok().json(reactions))
}

/// POST /livestreams/{livestream_id}/reactions
pub async fn post_reaction(
    state: web::Data<AppState>,
    session: SessionUser,
    path: web::Path<String>,
    req: web::Json<PostReactionRequest>,
) -> Result<HttpResponse> {
    let livestream_id = parse_id(&path, "livestream_id in path must be integer")?;
    req.validate()?;

    let reaction = state
        .reactions
        .create_reaction(session.0, livestream_id, &req.emoji_name)
        .await?;
    Ok(HttpResponse::Created().json(reaction))
}
