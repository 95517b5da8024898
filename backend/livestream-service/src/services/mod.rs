/// Business logic layer
///
/// - `ranking`: positional ranking over (subject, score) pairs
/// - `statistics`: per-user and per-livestream statistics assembly
/// - `reactions`: reaction listing and creation
/// - `fill`: batch expansion of rows into response records
pub mod fill;
pub mod ranking;
pub mod reactions;
pub mod statistics;

pub use ranking::{Ranking, ScoreEntry};
pub use reactions::ReactionService;
pub use statistics::StatisticsService;

use crate::db::StoreTx;
use crate::error::Result;

/// Commit on success, roll back on error, and hand the result back.
///
/// A failed rollback is logged; the original error is what the caller sees.
pub(crate) async fn finish_transaction<T>(
    mut tx: Box<dyn StoreTx>,
    result: Result<T>,
) -> Result<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!("transaction rollback failed: {}", rollback_err);
            }
            Err(err)
        }
    }
}
