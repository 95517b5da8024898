/// Reaction service - list and create emoji reactions on livestreams
use super::fill::fill_reactions;
use super::finish_transaction;
use crate::db::{Store, StoreTx};
use crate::error::{AppError, Result};
use crate::metrics::REACTIONS_CREATED_TOTAL;
use crate::models::{NewReaction, Reaction};
use chrono::Utc;
use std::sync::Arc;

pub struct ReactionService {
    store: Arc<dyn Store>,
}

impl ReactionService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Reactions on a livestream, newest first, optionally capped at `limit`
    pub async fn list_reactions(
        &self,
        livestream_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<Reaction>> {
        let mut tx = self.store.begin_snapshot().await?;
        let result = list_in_tx(tx.as_mut(), livestream_id, limit).await;
        finish_transaction(tx, result).await
    }

    /// Record a reaction by `user_id`, stamped with the current time
    pub async fn create_reaction(
        &self,
        user_id: i64,
        livestream_id: i64,
        emoji_name: &str,
    ) -> Result<Reaction> {
        let reaction = NewReaction {
            user_id,
            livestream_id,
            emoji_name: emoji_name.to_string(),
            created_at: Utc::now().timestamp(),
        };

        let mut tx = self.store.begin().await?;
        let result = create_in_tx(tx.as_mut(), reaction).await;
        let result = finish_transaction(tx, result).await;

        if let Ok(created) = &result {
            REACTIONS_CREATED_TOTAL.inc();
            tracing::info!(
                reaction_id = created.id,
                user_id,
                livestream_id,
                "reaction created"
            );
        }
        result
    }
}

async fn list_in_tx(
    tx: &mut dyn StoreTx,
    livestream_id: i64,
    limit: Option<i64>,
) -> Result<Vec<Reaction>> {
    let rows = tx.reactions_by_livestream(livestream_id, limit).await?;
    fill_reactions(tx, rows).await
}

async fn create_in_tx(tx: &mut dyn StoreTx, reaction: NewReaction) -> Result<Reaction> {
    if !tx.livestream_exists(reaction.livestream_id).await? {
        return Err(AppError::bad_request("livestream not found"));
    }

    let id = tx.insert_reaction(&reaction).await?;
    fill_reactions(tx, vec![reaction.into_row(id)])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal(format!("reaction {} could not be expanded", id)))
}
