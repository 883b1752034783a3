//! 测试用内存存储：与 PostgreSQL 实现保持同样的唯一性与外键语义。

use std::sync::{Arc, Mutex, MutexGuard};

use super::{NominationTally, Store, StoreError, UserProfile, UserRecord, VoteOutcome};

#[derive(Debug, Default)]
struct MemoryState {
    users: Vec<UserRecord>,
    nominations: Vec<NominationTally>,
    votes: Vec<(i64, i64)>,
    writes: usize,
    failure: Option<String>,
}

/// 共享内存存储；克隆共享同一份状态。
#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// 预置三个提名（id 1..=3）。
    pub(crate) fn seeded() -> Self {
        let store = Self::default();
        {
            let mut state = store.lock();
            for (id, slug) in [(1, "music"), (2, "video"), (3, "design")] {
                state.nominations.push(NominationTally {
                    id,
                    slug: slug.to_string(),
                    title: format!("{slug} title"),
                    description: format!("{slug} description"),
                    icon: "Star".to_string(),
                    color: "from-red-600 to-red-800".to_string(),
                    votes: 0,
                });
            }
        }
        store
    }

    /// 之后所有操作都返回给定存储错误。
    pub(crate) fn fail_with(&self, message: &str) {
        self.lock().failure = Some(message.to_string());
    }

    /// 成功写入次数（upsert + 新投票）。
    pub(crate) fn write_count(&self) -> usize {
        self.lock().writes
    }

    pub(crate) fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    pub(crate) fn votes_for(&self, nomination_id: i64) -> i64 {
        count_votes(&self.lock(), nomination_id)
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_failure(state: &MemoryState) -> Result<(), StoreError> {
        match &state.failure {
            Some(message) => Err(StoreError::new(message.clone())),
            None => Ok(()),
        }
    }
}

fn count_votes(state: &MemoryState, nomination_id: i64) -> i64 {
    state
        .votes
        .iter()
        .filter(|(_, nid)| *nid == nomination_id)
        .count() as i64
}

impl Store for MemoryStore {
    async fn upsert_user(&self, profile: &UserProfile) -> Result<UserRecord, StoreError> {
        let mut state = self.lock();
        Self::check_failure(&state)?;
        state.writes += 1;
        if let Some(user) = state.users.iter_mut().find(|u| u.vk_id == profile.vk_id) {
            user.first_name = profile.first_name.clone();
            user.last_name = profile.last_name.clone();
            user.photo_url = profile.photo_url.clone();
            return Ok(user.clone());
        }
        let user = UserRecord {
            id: state.users.len() as i64 + 1,
            vk_id: profile.vk_id,
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            photo_url: profile.photo_url.clone(),
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn list_nominations(&self) -> Result<Vec<NominationTally>, StoreError> {
        let state = self.lock();
        Self::check_failure(&state)?;
        let mut rows = state
            .nominations
            .iter()
            .map(|n| NominationTally {
                votes: count_votes(&state, n.id),
                ..n.clone()
            })
            .collect::<Vec<_>>();
        rows.sort_by_key(|n| n.id);
        Ok(rows)
    }

    async fn cast_vote(&self, user_id: i64, nomination_id: i64) -> Result<VoteOutcome, StoreError> {
        let mut state = self.lock();
        Self::check_failure(&state)?;
        if !state.users.iter().any(|u| u.id == user_id) {
            return Err(StoreError::new(
                "insert or update on table \"votes\" violates foreign key constraint \"votes_user_id_fkey\"",
            ));
        }
        if !state.nominations.iter().any(|n| n.id == nomination_id) {
            return Err(StoreError::new(
                "insert or update on table \"votes\" violates foreign key constraint \"votes_nomination_id_fkey\"",
            ));
        }
        if state.votes.contains(&(user_id, nomination_id)) {
            return Ok(VoteOutcome::AlreadyVoted);
        }
        state.votes.push((user_id, nomination_id));
        state.writes += 1;
        Ok(VoteOutcome::Recorded {
            vote_count: count_votes(&state, nomination_id),
        })
    }
}
