/// Database access layer
///
/// Handlers and services only see the `Store`/`StoreTx` traits. `PgStore` is
/// the production implementation; each query lives in a repository module as a
/// free function over a `PgConnection`.
///
/// - `pool`: connection pool creation and migrations
/// - `postgres`: `Store` implementation backed by a `PgPool`
/// - `user_repo`, `livestream_repo`, `reaction_repo`: entity lookups
/// - `stats_repo`: read-only aggregation queries
use crate::models::{
    EmojiCount, IconRow, LivecommentTotals, LivestreamRow, LivestreamTagRow, NewReaction,
    ReactionRow, SubjectTotal, ThemeRow, UserName, UserRow,
};
use async_trait::async_trait;

pub mod livestream_repo;
pub mod pool;
pub mod postgres;
pub mod reaction_repo;
pub mod stats_repo;
pub mod user_repo;

pub use pool::{create_pool, run_migrations};
pub use postgres::PgStore;

pub type StoreResult<T> = std::result::Result<T, sqlx::Error>;

/// Handle to the relational store. Cheap to share across requests.
#[async_trait]
pub trait Store: Send + Sync {
    /// Open a transaction. Dropping the returned handle without `commit`
    /// rolls it back.
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>>;

    /// Open a read-only transaction in which every read sees the same
    /// snapshot, regardless of writes committed meanwhile.
    async fn begin_snapshot(&self) -> StoreResult<Box<dyn StoreTx>>;

    /// Round-trip check used by the health endpoints.
    async fn ping(&self) -> StoreResult<()>;
}

/// Queries available inside one transaction.
#[async_trait]
pub trait StoreTx: Send {
    async fn commit(&mut self) -> StoreResult<()>;
    async fn rollback(&mut self) -> StoreResult<()>;

    // Users
    async fn find_user_id_by_name(&mut self, name: &str) -> StoreResult<Option<i64>>;
    async fn list_user_names(&mut self) -> StoreResult<Vec<UserName>>;
    async fn users_by_ids(&mut self, user_ids: &[i64]) -> StoreResult<Vec<UserRow>>;
    async fn themes_by_user_ids(&mut self, user_ids: &[i64]) -> StoreResult<Vec<ThemeRow>>;
    async fn icons_by_user_ids(&mut self, user_ids: &[i64]) -> StoreResult<Vec<IconRow>>;

    // Livestreams
    async fn livestream_exists(&mut self, livestream_id: i64) -> StoreResult<bool>;
    async fn list_livestream_ids(&mut self) -> StoreResult<Vec<i64>>;
    async fn livestream_ids_by_owner(&mut self, user_id: i64) -> StoreResult<Vec<i64>>;
    async fn livestreams_by_ids(&mut self, livestream_ids: &[i64])
        -> StoreResult<Vec<LivestreamRow>>;
    async fn tags_by_livestream_ids(
        &mut self,
        livestream_ids: &[i64],
    ) -> StoreResult<Vec<LivestreamTagRow>>;

    // Aggregations
    /// Reactions received on each user's livestreams, keyed by owner id.
    async fn reaction_totals_by_owner(&mut self) -> StoreResult<Vec<SubjectTotal>>;
    /// Tips received on each user's livestreams, keyed by owner id.
    async fn tip_totals_by_owner(&mut self) -> StoreResult<Vec<SubjectTotal>>;
    async fn reaction_totals_by_livestream(&mut self) -> StoreResult<Vec<SubjectTotal>>;
    async fn tip_totals_by_livestream(&mut self) -> StoreResult<Vec<SubjectTotal>>;
    async fn livecomment_totals(&mut self, livestream_ids: &[i64])
        -> StoreResult<LivecommentTotals>;
    async fn viewer_count(&mut self, livestream_ids: &[i64]) -> StoreResult<i64>;
    /// Per-emoji reaction counts on the livestreams owned by `username`.
    async fn emoji_counts_by_owner(&mut self, username: &str) -> StoreResult<Vec<EmojiCount>>;
    async fn livestream_max_tip(&mut self, livestream_id: i64) -> StoreResult<i64>;
    async fn livestream_reaction_count(&mut self, livestream_id: i64) -> StoreResult<i64>;
    async fn livestream_report_count(&mut self, livestream_id: i64) -> StoreResult<i64>;

    // Reactions
    /// Newest first; `None` means no limit.
    async fn reactions_by_livestream(
        &mut self,
        livestream_id: i64,
        limit: Option<i64>,
    ) -> StoreResult<Vec<ReactionRow>>;
    async fn insert_reaction(&mut self, reaction: &NewReaction) -> StoreResult<i64>;
}
