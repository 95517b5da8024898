use crate::models::{LivestreamRow, LivestreamTagRow};
use sqlx::PgConnection;

pub async fn livestream_exists(
    conn: &mut PgConnection,
    livestream_id: i64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM livestreams WHERE id = $1)")
        .bind(livestream_id)
        .fetch_one(&mut *conn)
        .await
}

pub async fn list_livestream_ids(conn: &mut PgConnection) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM livestreams")
        .fetch_all(&mut *conn)
        .await
}

pub async fn livestream_ids_by_owner(
    conn: &mut PgConnection,
    user_id: i64,
) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM livestreams WHERE user_id = $1")
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await
}

pub async fn livestreams_by_ids(
    conn: &mut PgConnection,
    livestream_ids: &[i64],
) -> Result<Vec<LivestreamRow>, sqlx::Error> {
    sqlx::query_as::<_, LivestreamRow>(
        r#"
        SELECT id, user_id, title, description, playlist_url, thumbnail_url, start_at, end_at
        FROM livestreams
        WHERE id = ANY($1)
        "#,
    )
    .bind(livestream_ids)
    .fetch_all(&mut *conn)
    .await
}

pub async fn tags_by_livestream_ids(
    conn: &mut PgConnection,
    livestream_ids: &[i64],
) -> Result<Vec<LivestreamTagRow>, sqlx::Error> {
    sqlx::query_as::<_, LivestreamTagRow>(
        r#"
        SELECT lt.livestream_id, t.id AS tag_id, t.name AS tag_name
        FROM livestream_tags lt
        INNER JOIN tags t ON t.id = lt.tag_id
        WHERE lt.livestream_id = ANY($1)
        ORDER BY lt.livestream_id, lt.id
        "#,
    )
    .bind(livestream_ids)
    .fetch_all(&mut *conn)
    .await
}
