//! Expansion of stored rows into response records.
//!
//! Each helper issues one query per table for the whole batch, never one per
//! row. A row referencing a user or livestream the store cannot produce is an
//! internal error.

use crate::db::StoreTx;
use crate::error::{AppError, Result};
use crate::models::{Livestream, Reaction, ReactionRow, Tag, Theme, User};
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap};

/// SHA-256 of the default icon served to users without an uploaded one
pub const FALLBACK_ICON_HASH: &str =
    "d9f8294e9d895f81ce62e73dc7d5dff862a4fa40bd4e0fecf53f7526a8edcac0";

/// Lowercase hex SHA-256 of an icon image
pub fn icon_hash(image: &[u8]) -> String {
    hex::encode(Sha256::digest(image))
}

fn unique_ids(ids: impl IntoIterator<Item = i64>) -> Vec<i64> {
    ids.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

/// Users with theme and icon hash, keyed by id
pub async fn fill_users(tx: &mut dyn StoreTx, user_ids: &[i64]) -> Result<HashMap<i64, User>> {
    let ids = unique_ids(user_ids.iter().copied());
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = tx.users_by_ids(&ids).await?;
    let themes: HashMap<i64, Theme> = tx
        .themes_by_user_ids(&ids)
        .await?
        .into_iter()
        .map(|theme| {
            (
                theme.user_id,
                Theme {
                    id: theme.id,
                    dark_mode: theme.dark_mode,
                },
            )
        })
        .collect();
    let icon_hashes: HashMap<i64, String> = tx
        .icons_by_user_ids(&ids)
        .await?
        .into_iter()
        .map(|icon| (icon.user_id, icon_hash(&icon.image)))
        .collect();

    let mut users = HashMap::with_capacity(rows.len());
    for row in rows {
        let theme = themes
            .get(&row.id)
            .cloned()
            .ok_or_else(|| AppError::Internal(format!("theme not found for user {}", row.id)))?;
        let icon_hash = icon_hashes
            .get(&row.id)
            .cloned()
            .unwrap_or_else(|| FALLBACK_ICON_HASH.to_string());

        users.insert(
            row.id,
            User {
                id: row.id,
                name: row.name,
                display_name: row.display_name,
                description: row.description,
                theme,
                icon_hash,
            },
        );
    }

    Ok(users)
}

/// Livestreams with owner and tags, keyed by id
pub async fn fill_livestreams(
    tx: &mut dyn StoreTx,
    livestream_ids: &[i64],
) -> Result<HashMap<i64, Livestream>> {
    let ids = unique_ids(livestream_ids.iter().copied());
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = tx.livestreams_by_ids(&ids).await?;
    let owner_ids: Vec<i64> = rows.iter().map(|row| row.user_id).collect();
    let owners = fill_users(tx, &owner_ids).await?;

    let mut tags: HashMap<i64, Vec<Tag>> = HashMap::new();
    for tag in tx.tags_by_livestream_ids(&ids).await? {
        tags.entry(tag.livestream_id).or_default().push(Tag {
            id: tag.tag_id,
            name: tag.tag_name,
        });
    }

    let mut livestreams = HashMap::with_capacity(rows.len());
    for row in rows {
        let owner = owners.get(&row.user_id).cloned().ok_or_else(|| {
            AppError::Internal(format!(
                "owner {} not found for livestream {}",
                row.user_id, row.id
            ))
        })?;

        livestreams.insert(
            row.id,
            Livestream {
                id: row.id,
                owner,
                title: row.title,
                description: row.description,
                playlist_url: row.playlist_url,
                thumbnail_url: row.thumbnail_url,
                tags: tags.remove(&row.id).unwrap_or_default(),
                start_at: row.start_at,
                end_at: row.end_at,
            },
        );
    }

    Ok(livestreams)
}

/// Expand reactions, preserving input order
pub async fn fill_reactions(tx: &mut dyn StoreTx, rows: Vec<ReactionRow>) -> Result<Vec<Reaction>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let user_ids: Vec<i64> = rows.iter().map(|r| r.user_id).collect();
    let livestream_ids: Vec<i64> = rows.iter().map(|r| r.livestream_id).collect();

    let users = fill_users(tx, &user_ids).await?;
    let livestreams = fill_livestreams(tx, &livestream_ids).await?;

    rows.into_iter()
        .map(|row| {
            let user = users.get(&row.user_id).cloned().ok_or_else(|| {
                AppError::Internal(format!("user {} not found for reaction {}", row.user_id, row.id))
            })?;
            let livestream = livestreams.get(&row.livestream_id).cloned().ok_or_else(|| {
                AppError::Internal(format!(
                    "livestream {} not found for reaction {}",
                    row.livestream_id, row.id
                ))
            })?;

            Ok(Reaction {
                id: row.id,
                emoji_name: row.emoji_name,
                user,
                livestream,
                created_at: row.created_at,
            })
        })
        .collect()
}
