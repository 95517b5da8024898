//! Positional ranking over (subject, score) pairs.
//!
//! Entries are ordered ascending by `(score, subject)`. Rank 1 goes to the last
//! entry of that order and each step towards the front adds one, so tied
//! scores never share a rank: the larger subject wins the tie.

use std::borrow::Borrow;
use std::cmp::Ordering;

/// One subject with its score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEntry<S> {
    pub subject: S,
    pub score: i64,
}

impl<S> ScoreEntry<S> {
    pub fn new(subject: S, score: i64) -> Self {
        Self { subject, score }
    }
}

/// Total order used for ranking: score first, subject second, both ascending.
pub fn compare_entries<S: Ord>(a: &ScoreEntry<S>, b: &ScoreEntry<S>) -> Ordering {
    (a.score, &a.subject).cmp(&(b.score, &b.subject))
}

/// Entries sorted by [`compare_entries`]
#[derive(Debug, Clone)]
pub struct Ranking<S> {
    entries: Vec<ScoreEntry<S>>,
}

impl<S: Ord> Ranking<S> {
    pub fn new(entries: impl IntoIterator<Item = ScoreEntry<S>>) -> Self {
        let mut entries: Vec<ScoreEntry<S>> = entries.into_iter().collect();
        entries.sort_by(compare_entries);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 1-based rank of `target`, scanning from the highest entry down.
    ///
    /// Returns `None` when `target` is not part of the ranking.
    pub fn rank_of<Q>(&self, target: &Q) -> Option<i64>
    where
        S: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let mut rank: i64 = 1;
        for entry in self.entries.iter().rev() {
            if entry.subject.borrow() == target {
                return Some(rank);
            }
            rank += 1;
        }
        None
    }
}
