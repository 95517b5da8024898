use super::{livestream_repo, reaction_repo, stats_repo, user_repo, Store, StoreResult, StoreTx};
use crate::models::{
    EmojiCount, IconRow, LivecommentTotals, LivestreamRow, LivestreamTagRow, NewReaction,
    ReactionRow, SubjectTotal, ThemeRow, UserName, UserRow,
};
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

/// `Store` backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgStoreTx { tx: Some(tx) }))
    }

    async fn begin_snapshot(&self) -> StoreResult<Box<dyn StoreTx>> {
        let mut tx = self.pool.begin().await?;
        // Must be the first statement of the transaction
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;
        Ok(Box::new(PgStoreTx { tx: Some(tx) }))
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
    }
}

/// Open PostgreSQL transaction. The inner transaction rolls back on drop.
pub struct PgStoreTx {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgStoreTx {
    fn conn(&mut self) -> StoreResult<&mut PgConnection> {
        self.tx
            .as_deref_mut()
            .ok_or_else(|| sqlx::Error::Protocol("transaction already finished".to_string()))
    }

    fn take(&mut self) -> StoreResult<Transaction<'static, Postgres>> {
        self.tx
            .take()
            .ok_or_else(|| sqlx::Error::Protocol("transaction already finished".to_string()))
    }
}

#[async_trait]
impl StoreTx for PgStoreTx {
    async fn commit(&mut self) -> StoreResult<()> {
        self.take()?.commit().await
    }

    async fn rollback(&mut self) -> StoreResult<()> {
        self.take()?.rollback().await
    }

    async fn find_user_id_by_name(&mut self, name: &str) -> StoreResult<Option<i64>> {
        user_repo::find_user_id_by_name(self.conn()?, name).await
    }

    async fn list_user_names(&mut self) -> StoreResult<Vec<UserName>> {
        user_repo::list_user_names(self.conn()?).await
    }

    async fn users_by_ids(&mut self, user_ids: &[i64]) -> StoreResult<Vec<UserRow>> {
        user_repo::users_by_ids(self.conn()?, user_ids).await
    }

    async fn themes_by_user_ids(&mut self, user_ids: &[i64]) -> StoreResult<Vec<ThemeRow>> {
        user_repo::themes_by_user_ids(self.conn()?, user_ids).await
    }

    async fn icons_by_user_ids(&mut self, user_ids: &[i64]) -> StoreResult<Vec<IconRow>> {
        user_repo::icons_by_user_ids(self.conn()?, user_ids).await
    }

    async fn livestream_exists(&mut self, livestream_id: i64) -> StoreResult<bool> {
        livestream_repo::livestream_exists(self.conn()?, livestream_id).await
    }

    async fn list_livestream_ids(&mut self) -> StoreResult<Vec<i64>> {
        livestream_repo::list_livestream_ids(self.conn()?).await
    }

    async fn livestream_ids_by_owner(&mut self, user_id: i64) -> StoreResult<Vec<i64>> {
        livestream_repo::livestream_ids_by_owner(self.conn()?, user_id).await
    }

    async fn livestreams_by_ids(
        &mut self,
        livestream_ids: &[i64],
    ) -> StoreResult<Vec<LivestreamRow>> {
        livestream_repo::livestreams_by_ids(self.conn()?, livestream_ids).await
    }

    async fn tags_by_livestream_ids(
        &mut self,
        livestream_ids: &[i64],
    ) -> StoreResult<Vec<LivestreamTagRow>> {
        livestream_repo::tags_by_livestream_ids(self.conn()?, livestream_ids).await
    }

    async fn reaction_totals_by_owner(&mut self) -> StoreResult<Vec<SubjectTotal>> {
        stats_repo::reaction_totals_by_owner(self.conn()?).await
    }

    async fn tip_totals_by_owner(&mut self) -> StoreResult<Vec<SubjectTotal>> {
        stats_repo::tip_totals_by_owner(self.conn()?).await
    }

    async fn reaction_totals_by_livestream(&mut self) -> StoreResult<Vec<SubjectTotal>> {
        stats_repo::reaction_totals_by_livestream(self.conn()?).await
    }

    async fn tip_totals_by_livestream(&mut self) -> StoreResult<Vec<SubjectTotal>> {
        stats_repo::tip_totals_by_livestream(self.conn()?).await
    }

    async fn livecomment_totals(
        &mut self,
        livestream_ids: &[i64],
    ) -> StoreResult<LivecommentTotals> {
        stats_repo::livecomment_totals(self.conn()?, livestream_ids).await
    }

    async fn viewer_count(&mut self, livestream_ids: &[i64]) -> StoreResult<i64> {
        stats_repo::viewer_count(self.conn()?, livestream_ids).await
    }

    async fn emoji_counts_by_owner(&mut self, username: &str) -> StoreResult<Vec<EmojiCount>> {
        stats_repo::emoji_counts_by_owner(self.conn()?, username).await
    }

    async fn livestream_max_tip(&mut self, livestream_id: i64) -> StoreResult<i64> {
        stats_repo::livestream_max_tip(self.conn()?, livestream_id).await
    }

    async fn livestream_reaction_count(&mut self, livestream_id: i64) -> StoreResult<i64> {
        stats_repo::livestream_reaction_count(self.conn()?, livestream_id).await
    }

    async fn livestream_report_count(&mut self, livestream_id: i64) -> StoreResult<i64> {
        stats_repo::livestream_report_count(self.conn()?, livestream_id).await
    }

    async fn reactions_by_livestream(
        &mut self,
        livestream_id: i64,
        limit: Option<i64>,
    ) -> StoreResult<Vec<ReactionRow>> {
        reaction_repo::reactions_by_livestream(self.conn()?, livestream_id, limit).await
    }

    async fn insert_reaction(&mut self, reaction: &NewReaction) -> StoreResult<i64> {
        reaction_repo::insert_reaction(self.conn()?, reaction).await
    }
}
