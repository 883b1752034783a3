//! 存储能力：处理器通过 `Store` 访问用户、提名与投票数据。
//!
//! 原子性完全交给存储层：用户写入是单条 upsert，投票是单条
//! conflict-do-nothing 插入，依赖 `(user_id, nomination_id)` 唯一约束。

#[cfg(test)]
pub(crate) mod memory;
pub(crate) mod postgres;

use std::{fmt, future::Future};

/// 认证通过后待写入的用户资料。
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UserProfile {
    pub(crate) vk_id: i64,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) photo_url: Option<String>,
}

/// upsert 后存储返回的用户行。
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub(crate) struct UserRecord {
    pub(crate) id: i64,
    pub(crate) vk_id: i64,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) photo_url: Option<String>,
}

/// 提名及其聚合票数。
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub(crate) struct NominationTally {
    pub(crate) id: i64,
    pub(crate) slug: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) icon: String,
    pub(crate) color: String,
    pub(crate) votes: i64,
}

/// 条件插入投票的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VoteOutcome {
    /// 新票已写入，附带该提名最新总票数。
    Recorded { vote_count: i64 },
    /// `(user, nomination)` 已存在，插入为空操作。
    AlreadyVoted,
}

/// 存储层错误：保留驱动原始描述。
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StoreError {
    message: String,
}

impl StoreError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub(crate) fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// 处理器所需的存储能力；实现方负责连接获取与释放。
pub(crate) trait Store: Clone + Send + Sync + 'static {
    /// 按 vk_id 原子 upsert 用户，冲突时覆盖姓名与头像。
    fn upsert_user(
        &self,
        profile: &UserProfile,
    ) -> impl Future<Output = Result<UserRecord, StoreError>> + Send;

    /// 全部提名及票数（零票也列出），按 id 升序。
    fn list_nominations(
        &self,
    ) -> impl Future<Output = Result<Vec<NominationTally>, StoreError>> + Send;

    /// 条件插入一票；重复投票返回 `AlreadyVoted` 而非错误。
    fn cast_vote(
        &self,
        user_id: i64,
        nomination_id: i64,
    ) -> impl Future<Output = Result<VoteOutcome, StoreError>> + Send;
}
