use crate::models::{NewReaction, ReactionRow};
use sqlx::PgConnection;

/// Reactions on a livestream, newest first. `LIMIT NULL` means no limit.
pub async fn reactions_by_livestream(
    conn: &mut PgConnection,
    livestream_id: i64,
    limit: Option<i64>,
) -> Result<Vec<ReactionRow>, sqlx::Error> {
    sqlx::query_as::<_, ReactionRow>(
        r#"
        SELECT id, emoji_name, user_id, livestream_id, created_at
        FROM reactions
        WHERE livestream_id = $1
        ORDER BY created_at DESC, id DESC
        LIMIT $2
        "#,
    )
    .bind(livestream_id)
    .bind(limit)
    .fetch_all(&mut *conn)
    .await
}

/// Insert a reaction and return the generated id
pub async fn insert_reaction(
    conn: &mut PgConnection,
    reaction: &NewReaction,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO reactions (user_id, livestream_id, emoji_name, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(reaction.user_id)
    .bind(reaction.livestream_id)
    .bind(&reaction.emoji_name)
    .bind(reaction.created_at)
    .fetch_one(&mut *conn)
    .await
}
