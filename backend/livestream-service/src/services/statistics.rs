/// Statistics service - per-user and per-livestream ranking statistics
///
/// Every request runs all of its reads inside one snapshot transaction, so the
/// ranking and the aggregate counters agree even under concurrent writes.
/// Nothing is cached; the full ranking is rebuilt on each call.
use super::ranking::{Ranking, ScoreEntry};
use super::finish_transaction;
use crate::db::{Store, StoreTx};
use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::{
    EmojiCount, LivecommentTotals, LivestreamStatistics, SubjectTotal, UserStatistics,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

pub struct StatisticsService {
    store: Arc<dyn Store>,
}

impl StatisticsService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Statistics for the user named `username`.
    ///
    /// Unknown users are a client error.
    pub async fn user_statistics(&self, username: &str) -> Result<UserStatistics> {
        let started = Instant::now();
        let result: Result<UserStatistics> = async {
            let mut tx = self.store.begin_snapshot().await?;
            let result = assemble_user_statistics(tx.as_mut(), username, started).await;
            finish_transaction(tx, result).await
        }
        .await;

        metrics::observe_statistics("user", &result, started.elapsed());
        result
    }

    /// Statistics for one livestream.
    ///
    /// Unknown livestreams are a client error.
    pub async fn livestream_statistics(&self, livestream_id: i64) -> Result<LivestreamStatistics> {
        let started = Instant::now();
        let result: Result<LivestreamStatistics> = async {
            let mut tx = self.store.begin_snapshot().await?;
            let result =
                assemble_livestream_statistics(tx.as_mut(), livestream_id, started).await;
            finish_transaction(tx, result).await
        }
        .await;

        metrics::observe_statistics("livestream", &result, started.elapsed());
        result
    }
}

async fn assemble_user_statistics(
    tx: &mut dyn StoreTx,
    username: &str,
    started: Instant,
) -> Result<UserStatistics> {
    let user_id = tx
        .find_user_id_by_name(username)
        .await?
        .ok_or_else(|| AppError::bad_request("not found user that has the given username"))?;
    debug!(user_id, username, elapsed_ms = elapsed_ms(started), "resolved user");

    let users = tx.list_user_names().await?;
    debug!(users = users.len(), elapsed_ms = elapsed_ms(started), "loaded users");

    let reactions = totals_by_subject(&tx.reaction_totals_by_owner().await?);
    debug!(rows = reactions.len(), elapsed_ms = elapsed_ms(started), "counted reactions");

    let tips = totals_by_subject(&tx.tip_totals_by_owner().await?);
    debug!(rows = tips.len(), elapsed_ms = elapsed_ms(started), "summed tips");

    let ranking = Ranking::new(
        users
            .into_iter()
            .map(|user| ScoreEntry::new(user.name, score(&[&reactions, &tips], user.id))),
    );
    metrics::observe_ranking_size("user", ranking.len());

    let rank = ranking.rank_of(username).ok_or_else(|| {
        AppError::Internal(format!("user {} missing from its own ranking", username))
    })?;
    debug!(rank, elapsed_ms = elapsed_ms(started), "calculated rank");

    let livestream_ids = tx.livestream_ids_by_owner(user_id).await?;
    let (livecomments, viewers_count) = if livestream_ids.is_empty() {
        (LivecommentTotals::default(), 0)
    } else {
        let livecomments = tx.livecomment_totals(&livestream_ids).await?;
        let viewers_count = tx.viewer_count(&livestream_ids).await?;
        (livecomments, viewers_count)
    };
    debug!(
        livestreams = livestream_ids.len(),
        elapsed_ms = elapsed_ms(started),
        "aggregated livestreams"
    );

    let emoji_counts = tx.emoji_counts_by_owner(username).await?;
    let favorite_emoji = favorite_emoji(&emoji_counts)
        .map(str::to_owned)
        .unwrap_or_default();
    debug!(%favorite_emoji, elapsed_ms = elapsed_ms(started), "picked favorite emoji");

    Ok(UserStatistics {
        rank,
        viewers_count,
        total_reactions: reactions.get(&user_id).copied().unwrap_or(0),
        total_livecomments: livecomments.count,
        total_tip: livecomments.total_tip,
        favorite_emoji,
    })
}

async fn assemble_livestream_statistics(
    tx: &mut dyn StoreTx,
    livestream_id: i64,
    started: Instant,
) -> Result<LivestreamStatistics> {
    if !tx.livestream_exists(livestream_id).await? {
        return Err(AppError::bad_request(
            "cannot get stats of not found livestream",
        ));
    }

    let livestream_ids = tx.list_livestream_ids().await?;
    let reactions = totals_by_subject(&tx.reaction_totals_by_livestream().await?);
    let tips = totals_by_subject(&tx.tip_totals_by_livestream().await?);

    let ranking = Ranking::new(
        livestream_ids
            .into_iter()
            .map(|id| ScoreEntry::new(id, score(&[&reactions, &tips], id))),
    );
    metrics::observe_ranking_size("livestream", ranking.len());

    let rank = ranking.rank_of(&livestream_id).ok_or_else(|| {
        AppError::Internal(format!(
            "livestream {} missing from its own ranking",
            livestream_id
        ))
    })?;
    debug!(livestream_id, rank, elapsed_ms = elapsed_ms(started), "calculated rank");

    let viewers_count = tx.viewer_count(&[livestream_id]).await?;
    let max_tip = tx.livestream_max_tip(livestream_id).await?;
    let total_reactions = tx.livestream_reaction_count(livestream_id).await?;
    let total_reports = tx.livestream_report_count(livestream_id).await?;
    debug!(livestream_id, elapsed_ms = elapsed_ms(started), "aggregated livestream");

    Ok(LivestreamStatistics {
        rank,
        viewers_count,
        total_reactions,
        total_reports,
        max_tip,
    })
}

/// Index grouped query rows by subject. Later duplicates win.
pub fn totals_by_subject(rows: &[SubjectTotal]) -> HashMap<i64, i64> {
    rows.iter().map(|row| (row.subject_id, row.total)).collect()
}

/// Sum of every component for `subject_id`; absent components count as zero.
pub fn score(components: &[&HashMap<i64, i64>], subject_id: i64) -> i64 {
    components
        .iter()
        .map(|totals| totals.get(&subject_id).copied().unwrap_or(0))
        .sum()
}

/// Most used emoji; among equal counts the lexicographically last name wins.
pub fn favorite_emoji(counts: &[EmojiCount]) -> Option<&str> {
    counts
        .iter()
        .max_by(|a, b| {
            a.count
                .cmp(&b.count)
                .then_with(|| a.emoji_name.cmp(&b.emoji_name))
        })
        .map(|c| c.emoji_name.as_str())
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
