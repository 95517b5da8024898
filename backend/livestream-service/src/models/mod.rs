/// Data models for livestream-service
///
/// Two families of types live here:
/// - `*Row` records, one per query shape, decoded with `sqlx::FromRow`
/// - response records serialized to JSON by the handlers
use serde::{Deserialize, Serialize};

// =====================================================================
// Store rows
// =====================================================================

/// `users` row without the password column
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub description: String,
}

/// Minimal user identity used when ranking all users
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserName {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ThemeRow {
    pub id: i64,
    pub user_id: i64,
    pub dark_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct IconRow {
    pub user_id: i64,
    pub image: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct LivestreamRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub playlist_url: String,
    pub thumbnail_url: String,
    pub start_at: i64,
    pub end_at: i64,
}

/// `livestream_tags` joined with `tags`
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct LivestreamTagRow {
    pub livestream_id: i64,
    pub tag_id: i64,
    pub tag_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ReactionRow {
    pub id: i64,
    pub emoji_name: String,
    pub user_id: i64,
    pub livestream_id: i64,
    pub created_at: i64,
}

/// Values for a reaction insert; the store assigns the id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReaction {
    pub user_id: i64,
    pub livestream_id: i64,
    pub emoji_name: String,
    pub created_at: i64,
}

impl NewReaction {
    pub fn into_row(self, id: i64) -> ReactionRow {
        ReactionRow {
            id,
            emoji_name: self.emoji_name,
            user_id: self.user_id,
            livestream_id: self.livestream_id,
            created_at: self.created_at,
        }
    }
}

/// One aggregated metric for one subject (user id or livestream id).
///
/// Subjects without matching rows never appear; callers treat them as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct SubjectTotal {
    pub subject_id: i64,
    pub total: i64,
}

/// Reactions received with one emoji
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct EmojiCount {
    pub emoji_name: String,
    pub count: i64,
}

/// Livecomment count and tip sum over a set of livestreams
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct LivecommentTotals {
    pub count: i64,
    pub total_tip: i64,
}

// =====================================================================
// Response records
// =====================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub id: i64,
    pub dark_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub theme: Theme,
    pub icon_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Livestream {
    pub id: i64,
    pub owner: User,
    pub title: String,
    pub description: String,
    pub playlist_url: String,
    pub thumbnail_url: String,
    pub tags: Vec<Tag>,
    pub start_at: i64,
    pub end_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub id: i64,
    pub emoji_name: String,
    pub user: User,
    pub livestream: Livestream,
    pub created_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatistics {
    pub rank: i64,
    pub viewers_count: i64,
    pub total_reactions: i64,
    pub total_livecomments: i64,
    pub total_tip: i64,
    pub favorite_emoji: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivestreamStatistics {
    pub rank: i64,
    pub viewers_count: i64,
    pub total_reactions: i64,
    pub total_reports: i64,
    pub max_tip: i64,
}
