//! Read-only aggregation queries behind the statistics endpoints.
//!
//! Grouped queries only return subjects that have at least one matching row.
//! Sums are cast back to BIGINT because `SUM(bigint)` yields NUMERIC.

use crate::models::{EmojiCount, LivecommentTotals, SubjectTotal};
use sqlx::PgConnection;

pub async fn reaction_totals_by_owner(
    conn: &mut PgConnection,
) -> Result<Vec<SubjectTotal>, sqlx::Error> {
    sqlx::query_as::<_, SubjectTotal>(
        r#"
        SELECT u.id AS subject_id, COUNT(*) AS total
        FROM users u
        INNER JOIN livestreams l ON l.user_id = u.id
        INNER JOIN reactions r ON r.livestream_id = l.id
        GROUP BY u.id
        "#,
    )
    .fetch_all(&mut *conn)
    .await
}

pub async fn tip_totals_by_owner(
    conn: &mut PgConnection,
) -> Result<Vec<SubjectTotal>, sqlx::Error> {
    sqlx::query_as::<_, SubjectTotal>(
        r#"
        SELECT u.id AS subject_id, COALESCE(SUM(lc.tip), 0)::BIGINT AS total
        FROM users u
        INNER JOIN livestreams l ON l.user_id = u.id
        INNER JOIN livecomments lc ON lc.livestream_id = l.id
        GROUP BY u.id
        "#,
    )
    .fetch_all(&mut *conn)
    .await
}

pub async fn reaction_totals_by_livestream(
    conn: &mut PgConnection,
) -> Result<Vec<SubjectTotal>, sqlx::Error> {
    sqlx::query_as::<_, SubjectTotal>(
        r#"
        SELECT l.id AS subject_id, COUNT(*) AS total
        FROM livestreams l
        INNER JOIN reactions r ON r.livestream_id = l.id
        GROUP BY l.id
        "#,
    )
    .fetch_all(&mut *conn)
    .await
}

pub async fn tip_totals_by_livestream(
    conn: &mut PgConnection,
) -> Result<Vec<SubjectTotal>, sqlx::Error> {
    sqlx::query_as::<_, SubjectTotal>(
        r#"
        SELECT l.id AS subject_id, COALESCE(SUM(lc.tip), 0)::BIGINT AS total
        FROM livestreams l
        INNER JOIN livecomments lc ON lc.livestream_id = l.id
        GROUP BY l.id
        "#,
    )
    .fetch_all(&mut *conn)
    .await
}

/// Livecomment count and tip sum over the given livestreams
pub async fn livecomment_totals(
    conn: &mut PgConnection,
    livestream_ids: &[i64],
) -> Result<LivecommentTotals, sqlx::Error> {
    sqlx::query_as::<_, LivecommentTotals>(
        r#"
        SELECT COUNT(*) AS count, COALESCE(SUM(tip), 0)::BIGINT AS total_tip
        FROM livecomments
        WHERE livestream_id = ANY($1)
        "#,
    )
    .bind(livestream_ids)
    .fetch_one(&mut *conn)
    .await
}

/// Total viewing sessions recorded for the given livestreams
pub async fn viewer_count(
    conn: &mut PgConnection,
    livestream_ids: &[i64],
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM livestream_viewers_history WHERE livestream_id = ANY($1)",
    )
    .bind(livestream_ids)
    .fetch_one(&mut *conn)
    .await
}

/// Reaction counts per emoji across every livestream owned by `username`
pub async fn emoji_counts_by_owner(
    conn: &mut PgConnection,
    username: &str,
) -> Result<Vec<EmojiCount>, sqlx::Error> {
    sqlx::query_as::<_, EmojiCount>(
        r#"
        SELECT r.emoji_name, COUNT(*) AS count
        FROM users u
        INNER JOIN livestreams l ON l.user_id = u.id
        INNER JOIN reactions r ON r.livestream_id = l.id
        WHERE u.name = $1
        GROUP BY r.emoji_name
        "#,
    )
    .bind(username)
    .fetch_all(&mut *conn)
    .await
}

pub async fn livestream_max_tip(
    conn: &mut PgConnection,
    livestream_id: i64,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(MAX(tip), 0)::BIGINT FROM livecomments WHERE livestream_id = $1",
    )
    .bind(livestream_id)
    .fetch_one(&mut *conn)
    .await
}

pub async fn livestream_reaction_count(
    conn: &mut PgConnection,
    livestream_id: i64,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reactions WHERE livestream_id = $1")
        .bind(livestream_id)
        .fetch_one(&mut *conn)
        .await
}

pub async fn livestream_report_count(
    conn: &mut PgConnection,
    livestream_id: i64,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM livecomment_reports WHERE livestream_id = $1",
    )
    .bind(livestream_id)
    .fetch_one(&mut *conn)
    .await
}
