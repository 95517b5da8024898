//! In-memory Store for integration tests
//!
//! Mirrors the PostgreSQL store closely enough to exercise services and
//! handlers without a database. Each transaction works on a private copy of
//! the dataset and publishes it on commit; snapshot transactions are
//! read-only. Any query can be made to fail by name to simulate a store outage
//! mid-request.

#![allow(dead_code)]

use async_trait::async_trait;
use livestream_service::db::{Store, StoreResult, StoreTx};
use livestream_service::models::{
    EmojiCount, IconRow, LivecommentTotals, LivestreamRow, LivestreamTagRow, NewReaction,
    ReactionRow, SubjectTotal, ThemeRow, UserName, UserRow,
};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const TEST_SECRET: &str = "test-secret";

#[derive(Debug, Clone)]
pub struct Livecomment {
    pub user_id: i64,
    pub livestream_id: i64,
    pub tip: i64,
}

#[derive(Debug, Clone)]
pub struct Tagging {
    pub livestream_id: i64,
    pub tag_id: i64,
}

/// Tables held by the fake store
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub users: Vec<UserRow>,
    pub themes: Vec<ThemeRow>,
    pub icons: Vec<IconRow>,
    pub livestreams: Vec<LivestreamRow>,
    pub tags: Vec<(i64, String)>,
    pub livestream_tags: Vec<Tagging>,
    pub reactions: Vec<ReactionRow>,
    pub livecomments: Vec<Livecomment>,
    /// Livestream id of each spam report
    pub reports: Vec<i64>,
    /// (user_id, livestream_id)
    pub viewers: Vec<(i64, i64)>,
}

impl Dataset {
    /// Add a user with a light theme and no icon
    pub fn add_user(&mut self, name: &str) -> i64 {
        let id = self.users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        self.users.push(UserRow {
            id,
            name: name.to_string(),
            display_name: name.to_uppercase(),
            description: format!("{} description", name),
        });
        self.themes.push(ThemeRow {
            id: 1000 + id,
            user_id: id,
            dark_mode: false,
        });
        id
    }

    pub fn user_id(&self, name: &str) -> i64 {
        self.users
            .iter()
            .find(|u| u.name == name)
            .map(|u| u.id)
            .expect("fixture user exists")
    }

    pub fn set_icon(&mut self, user_id: i64, image: &[u8]) {
        self.icons.push(IconRow {
            user_id,
            image: image.to_vec(),
        });
    }

    pub fn add_livestream(&mut self, owner_id: i64) -> i64 {
        let id = self.livestreams.iter().map(|l| l.id).max().unwrap_or(0) + 1;
        self.insert_livestream(id, owner_id)
    }

    pub fn insert_livestream(&mut self, id: i64, owner_id: i64) -> i64 {
        self.livestreams.push(LivestreamRow {
            id,
            user_id: owner_id,
            title: format!("livestream {}", id),
            description: String::new(),
            playlist_url: format!("https://media.test/{}/playlist.m3u8", id),
            thumbnail_url: format!("https://media.test/{}/thumbnail.jpg", id),
            start_at: 1_700_000_000,
            end_at: 1_700_003_600,
        });
        id
    }

    pub fn tag(&mut self, livestream_id: i64, name: &str) {
        let tag_id = match self.tags.iter().find(|(_, n)| n == name) {
            Some((id, _)) => *id,
            None => {
                let id = self.tags.len() as i64 + 1;
                self.tags.push((id, name.to_string()));
                id
            }
        };
        self.livestream_tags.push(Tagging {
            livestream_id,
            tag_id,
        });
    }

    pub fn add_reaction(
        &mut self,
        user_id: i64,
        livestream_id: i64,
        emoji_name: &str,
        created_at: i64,
    ) -> i64 {
        let id = self.reactions.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        self.reactions.push(ReactionRow {
            id,
            emoji_name: emoji_name.to_string(),
            user_id,
            livestream_id,
            created_at,
        });
        id
    }

    pub fn add_livecomment(&mut self, user_id: i64, livestream_id: i64, tip: i64) {
        self.livecomments.push(Livecomment {
            user_id,
            livestream_id,
            tip,
        });
    }

    pub fn add_report(&mut self, livestream_id: i64) {
        self.reports.push(livestream_id);
    }

    pub fn add_viewer(&mut self, user_id: i64, livestream_id: i64) {
        self.viewers.push((user_id, livestream_id));
    }

    fn owner_of(&self, livestream_id: i64) -> Option<i64> {
        self.livestreams
            .iter()
            .find(|l| l.id == livestream_id)
            .map(|l| l.user_id)
    }
}

/// Shared counters and switches observed by tests
#[derive(Default)]
struct Recorder {
    begins: AtomicUsize,
    snapshot_begins: AtomicUsize,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
    failing: Mutex<HashSet<String>>,
}

impl Recorder {
    fn check(&self, operation: &str) -> StoreResult<()> {
        if self.failing.lock().unwrap().contains(operation) {
            return Err(sqlx::Error::Protocol(format!(
                "injected failure in {}",
                operation
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<Dataset>>,
    recorder: Arc<Recorder>,
}

impl MemoryStore {
    pub fn new(data: Dataset) -> Self {
        Self {
            data: Arc::new(Mutex::new(data)),
            recorder: Arc::new(Recorder::default()),
        }
    }

    /// Make every later call of `operation` fail, e.g. `"livestream_max_tip"`
    pub fn fail_on(&self, operation: &str) {
        self.recorder
            .failing
            .lock()
            .unwrap()
            .insert(operation.to_string());
    }

    pub fn begins(&self) -> usize {
        self.recorder.begins.load(Ordering::SeqCst)
    }

    pub fn snapshot_begins(&self) -> usize {
        self.recorder.snapshot_begins.load(Ordering::SeqCst)
    }

    pub fn commits(&self) -> usize {
        self.recorder.commits.load(Ordering::SeqCst)
    }

    pub fn rollbacks(&self) -> usize {
        self.recorder.rollbacks.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Dataset {
        self.data.lock().unwrap().clone()
    }

    fn open_tx(&self, read_only: bool) -> MemoryTx {
        MemoryTx {
            working: self.snapshot(),
            shared: self.data.clone(),
            recorder: self.recorder.clone(),
            read_only,
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        self.recorder.check("begin")?;
        self.recorder.begins.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.open_tx(false)))
    }

    async fn begin_snapshot(&self) -> StoreResult<Box<dyn StoreTx>> {
        self.recorder.check("begin_snapshot")?;
        self.recorder.begins.fetch_add(1, Ordering::SeqCst);
        self.recorder.snapshot_begins.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.open_tx(true)))
    }

    async fn ping(&self) -> StoreResult<()> {
        self.recorder.check("ping")
    }
}

pub struct MemoryTx {
    working: Dataset,
    shared: Arc<Mutex<Dataset>>,
    recorder: Arc<Recorder>,
    read_only: bool,
}

fn group_totals(pairs: impl Iterator<Item = (i64, i64)>) -> Vec<SubjectTotal> {
    let mut totals: BTreeMap<i64, i64> = BTreeMap::new();
    for (subject_id, value) in pairs {
        *totals.entry(subject_id).or_default() += value;
    }
    totals
        .into_iter()
        .map(|(subject_id, total)| SubjectTotal { subject_id, total })
        .collect()
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn commit(&mut self) -> StoreResult<()> {
        self.recorder.check("commit")?;
        if !self.read_only {
            *self.shared.lock().unwrap() = self.working.clone();
        }
        self.recorder.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(&mut self) -> StoreResult<()> {
        self.recorder.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn find_user_id_by_name(&mut self, name: &str) -> StoreResult<Option<i64>> {
        self.recorder.check("find_user_id_by_name")?;
        Ok(self
            .working
            .users
            .iter()
            .find(|u| u.name == name)
            .map(|u| u.id))
    }

    async fn list_user_names(&mut self) -> StoreResult<Vec<UserName>> {
        self.recorder.check("list_user_names")?;
        Ok(self
            .working
            .users
            .iter()
            .map(|u| UserName {
                id: u.id,
                name: u.name.clone(),
            })
            .collect())
    }

    async fn users_by_ids(&mut self, user_ids: &[i64]) -> StoreResult<Vec<UserRow>> {
        self.recorder.check("users_by_ids")?;
        Ok(self
            .working
            .users
            .iter()
            .filter(|u| user_ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn themes_by_user_ids(&mut self, user_ids: &[i64]) -> StoreResult<Vec<ThemeRow>> {
        self.recorder.check("themes_by_user_ids")?;
        Ok(self
            .working
            .themes
            .iter()
            .filter(|t| user_ids.contains(&t.user_id))
            .cloned()
            .collect())
    }

    async fn icons_by_user_ids(&mut self, user_ids: &[i64]) -> StoreResult<Vec<IconRow>> {
        self.recorder.check("icons_by_user_ids")?;
        // Latest icon per user
        let mut latest: BTreeMap<i64, IconRow> = BTreeMap::new();
        for icon in &self.working.icons {
            if user_ids.contains(&icon.user_id) {
                latest.insert(icon.user_id, icon.clone());
            }
        }
        Ok(latest.into_values().collect())
    }

    async fn livestream_exists(&mut self, livestream_id: i64) -> StoreResult<bool> {
        self.recorder.check("livestream_exists")?;
        Ok(self.working.livestreams.iter().any(|l| l.id == livestream_id))
    }

    async fn list_livestream_ids(&mut self) -> StoreResult<Vec<i64>> {
        self.recorder.check("list_livestream_ids")?;
        Ok(self.working.livestreams.iter().map(|l| l.id).collect())
    }

    async fn livestream_ids_by_owner(&mut self, user_id: i64) -> StoreResult<Vec<i64>> {
        self.recorder.check("livestream_ids_by_owner")?;
        Ok(self
            .working
            .livestreams
            .iter()
            .filter(|l| l.user_id == user_id)
            .map(|l| l.id)
            .collect())
    }

    async fn livestreams_by_ids(
        &mut self,
        livestream_ids: &[i64],
    ) -> StoreResult<Vec<LivestreamRow>> {
        self.recorder.check("livestreams_by_ids")?;
        Ok(self
            .working
            .livestreams
            .iter()
            .filter(|l| livestream_ids.contains(&l.id))
            .cloned()
            .collect())
    }

    async fn tags_by_livestream_ids(
        &mut self,
        livestream_ids: &[i64],
    ) -> StoreResult<Vec<LivestreamTagRow>> {
        self.recorder.check("tags_by_livestream_ids")?;
        let tags = &self.working.tags;
        Ok(self
            .working
            .livestream_tags
            .iter()
            .filter(|lt| livestream_ids.contains(&lt.livestream_id))
            .filter_map(|lt| {
                tags.iter()
                    .find(|(id, _)| *id == lt.tag_id)
                    .map(|(id, name)| LivestreamTagRow {
                        livestream_id: lt.livestream_id,
                        tag_id: *id,
                        tag_name: name.clone(),
                    })
            })
            .collect())
    }

    async fn reaction_totals_by_owner(&mut self) -> StoreResult<Vec<SubjectTotal>> {
        self.recorder.check("reaction_totals_by_owner")?;
        let data = &self.working;
        Ok(group_totals(
            data.reactions
                .iter()
                .filter_map(|r| data.owner_of(r.livestream_id).map(|owner| (owner, 1))),
        ))
    }

    async fn tip_totals_by_owner(&mut self) -> StoreResult<Vec<SubjectTotal>> {
        self.recorder.check("tip_totals_by_owner")?;
        let data = &self.working;
        Ok(group_totals(data.livecomments.iter().filter_map(|c| {
            data.owner_of(c.livestream_id).map(|owner| (owner, c.tip))
        })))
    }

    async fn reaction_totals_by_livestream(&mut self) -> StoreResult<Vec<SubjectTotal>> {
        self.recorder.check("reaction_totals_by_livestream")?;
        Ok(group_totals(
            self.working.reactions.iter().map(|r| (r.livestream_id, 1)),
        ))
    }

    async fn tip_totals_by_livestream(&mut self) -> StoreResult<Vec<SubjectTotal>> {
        self.recorder.check("tip_totals_by_livestream")?;
        Ok(group_totals(
            self.working
                .livecomments
                .iter()
                .map(|c| (c.livestream_id, c.tip)),
        ))
    }

    async fn livecomment_totals(
        &mut self,
        livestream_ids: &[i64],
    ) -> StoreResult<LivecommentTotals> {
        self.recorder.check("livecomment_totals")?;
        let matching = self
            .working
            .livecomments
            .iter()
            .filter(|c| livestream_ids.contains(&c.livestream_id));
        Ok(matching.fold(LivecommentTotals::default(), |acc, c| LivecommentTotals {
            count: acc.count + 1,
            total_tip: acc.total_tip + c.tip,
        }))
    }

    async fn viewer_count(&mut self, livestream_ids: &[i64]) -> StoreResult<i64> {
        self.recorder.check("viewer_count")?;
        Ok(self
            .working
            .viewers
            .iter()
            .filter(|(_, livestream_id)| livestream_ids.contains(livestream_id))
            .count() as i64)
    }

    async fn emoji_counts_by_owner(&mut self, username: &str) -> StoreResult<Vec<EmojiCount>> {
        self.recorder.check("emoji_counts_by_owner")?;
        let data = &self.working;
        let owner_id = match data.users.iter().find(|u| u.name == username) {
            Some(user) => user.id,
            None => return Ok(Vec::new()),
        };

        let mut counts: BTreeMap<String, i64> = BTreeMap::new();
        for reaction in &data.reactions {
            if data.owner_of(reaction.livestream_id) == Some(owner_id) {
                *counts.entry(reaction.emoji_name.clone()).or_default() += 1;
            }
        }
        Ok(counts
            .into_iter()
            .map(|(emoji_name, count)| EmojiCount { emoji_name, count })
            .collect())
    }

    async fn livestream_max_tip(&mut self, livestream_id: i64) -> StoreResult<i64> {
        self.recorder.check("livestream_max_tip")?;
        Ok(self
            .working
            .livecomments
            .iter()
            .filter(|c| c.livestream_id == livestream_id)
            .map(|c| c.tip)
            .max()
            .unwrap_or(0))
    }

    async fn livestream_reaction_count(&mut self, livestream_id: i64) -> StoreResult<i64> {
        self.recorder.check("livestream_reaction_count")?;
        Ok(self
            .working
            .reactions
            .iter()
            .filter(|r| r.livestream_id == livestream_id)
            .count() as i64)
    }

    async fn livestream_report_count(&mut self, livestream_id: i64) -> StoreResult<i64> {
        self.recorder.check("livestream_report_count")?;
        Ok(self
            .working
            .reports
            .iter()
            .filter(|id| **id == livestream_id)
            .count() as i64)
    }

    async fn reactions_by_livestream(
        &mut self,
        livestream_id: i64,
        limit: Option<i64>,
    ) -> StoreResult<Vec<ReactionRow>> {
        self.recorder.check("reactions_by_livestream")?;
        let mut rows: Vec<ReactionRow> = self
            .working
            .reactions
            .iter()
            .filter(|r| r.livestream_id == livestream_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        if let Some(limit) = limit {
            rows.truncate(limit as usize);
        }
        Ok(rows)
    }

    async fn insert_reaction(&mut self, reaction: &NewReaction) -> StoreResult<i64> {
        self.recorder.check("insert_reaction")?;
        if self.read_only {
            return Err(sqlx::Error::Protocol(
                "cannot insert in a read-only transaction".to_string(),
            ));
        }
        Ok(self.working.add_reaction(
            reaction.user_id,
            reaction.livestream_id,
            &reaction.emoji_name,
            reaction.created_at,
        ))
    }
}

/// alice owns two livestreams with 5 reactions and 300 in tips, bob owns one
/// with 200 in tips, carol and dave have no activity. Livestream 42 belongs to
/// bob.
pub fn ranking_fixture() -> Dataset {
    let mut data = Dataset::default();
    let alice = data.add_user("alice");
    let bob = data.add_user("bob");
    let carol = data.add_user("carol");
    let _dave = data.add_user("dave");

    let first = data.add_livestream(alice);
    let second = data.add_livestream(alice);
    let bobs = data.insert_livestream(42, bob);
    data.tag(first, "music");
    data.tag(first, "chill");
    data.set_icon(alice, b"alice-icon");

    data.add_reaction(bob, first, "😀", 100);
    data.add_reaction(carol, first, "😀", 101);
    data.add_reaction(bob, first, "😂", 102);
    data.add_reaction(carol, second, "😂", 103);
    data.add_reaction(bob, second, "👍", 104);

    data.add_livecomment(bob, first, 100);
    data.add_livecomment(carol, second, 200);
    data.add_livecomment(alice, bobs, 150);
    data.add_livecomment(carol, bobs, 50);
    data.add_livecomment(carol, bobs, 0);

    data.add_viewer(bob, first);
    data.add_viewer(carol, first);
    data.add_viewer(carol, second);
    data.add_viewer(alice, bobs);

    data.add_report(bobs);
    data.add_report(bobs);
    data
}
