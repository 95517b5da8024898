use crate::models::{IconRow, ThemeRow, UserName, UserRow};
use sqlx::PgConnection;

/// Resolve a user id from the unique user name
pub async fn find_user_id_by_name(
    conn: &mut PgConnection,
    name: &str,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE name = $1")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await
}

/// Every user's id and name
pub async fn list_user_names(conn: &mut PgConnection) -> Result<Vec<UserName>, sqlx::Error> {
    sqlx::query_as::<_, UserName>("SELECT id, name FROM users")
        .fetch_all(&mut *conn)
        .await
}

pub async fn users_by_ids(
    conn: &mut PgConnection,
    user_ids: &[i64],
) -> Result<Vec<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, name, display_name, description
        FROM users
        WHERE id = ANY($1)
        "#,
    )
    .bind(user_ids)
    .fetch_all(&mut *conn)
    .await
}

pub async fn themes_by_user_ids(
    conn: &mut PgConnection,
    user_ids: &[i64],
) -> Result<Vec<ThemeRow>, sqlx::Error> {
    sqlx::query_as::<_, ThemeRow>(
        r#"
        SELECT id, user_id, dark_mode
        FROM themes
        WHERE user_id = ANY($1)
        "#,
    )
    .bind(user_ids)
    .fetch_all(&mut *conn)
    .await
}

/// Latest icon per user
pub async fn icons_by_user_ids(
    conn: &mut PgConnection,
    user_ids: &[i64],
) -> Result<Vec<IconRow>, sqlx::Error> {
    sqlx::query_as::<_, IconRow>(
        r#"
        SELECT DISTINCT ON (user_id) user_id, image
        FROM icons
        WHERE user_id = ANY($1)
        ORDER BY user_id, id DESC
        "#,
    )
    .bind(user_ids)
    .fetch_all(&mut *conn)
    .await
}
