//! PostgreSQL 存储实现（sqlx 连接池）。

use anyhow::Context;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::debug;

use super::{NominationTally, Store, StoreError, UserProfile, UserRecord, VoteOutcome};
use crate::config::DatabaseConfig;

const UPSERT_USER_SQL: &str = r#"
    INSERT INTO users (vk_id, first_name, last_name, photo_url)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (vk_id)
    DO UPDATE SET first_name = EXCLUDED.first_name,
                  last_name = EXCLUDED.last_name,
                  photo_url = EXCLUDED.photo_url
    RETURNING id, vk_id, first_name, last_name, photo_url
"#;

const LIST_NOMINATIONS_SQL: &str = r#"
    SELECT n.id, n.slug, n.title, n.description, n.icon, n.color,
           COUNT(v.id) AS votes
    FROM nominations n
    LEFT JOIN votes v ON n.id = v.nomination_id
    GROUP BY n.id, n.slug, n.title, n.description, n.icon, n.color
    ORDER BY n.id
"#;

const INSERT_VOTE_SQL: &str = r#"
    INSERT INTO votes (user_id, nomination_id)
    VALUES ($1, $2)
    ON CONFLICT (user_id, nomination_id) DO NOTHING
    RETURNING id
"#;

const COUNT_VOTES_SQL: &str = "SELECT COUNT(*) FROM votes WHERE nomination_id = $1";

/// 基于连接池的存储句柄；克隆只复制池引用。
#[derive(Clone)]
pub(crate) struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// 惰性建池：首次获取连接时才真正连接数据库。
    pub(crate) fn connect(config: &DatabaseConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(0)
            .acquire_timeout(config.acquire_timeout)
            .connect_lazy(&config.url)
            .context("create postgres pool")?;
        Ok(Self { pool })
    }

    /// 应用内置迁移。
    pub(crate) async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("apply migrations")
    }

    /// 探活：`SELECT 1`。
    pub(crate) async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

impl Store for PgStore {
    async fn upsert_user(&self, profile: &UserProfile) -> Result<UserRecord, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let user = sqlx::query_as::<_, UserRecord>(UPSERT_USER_SQL)
            .bind(profile.vk_id)
            .bind(&profile.first_name)
            .bind(&profile.last_name)
            .bind(profile.photo_url.as_deref())
            .fetch_one(&mut *conn)
            .await?;
        Ok(user)
    }

    async fn list_nominations(&self) -> Result<Vec<NominationTally>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, NominationTally>(LIST_NOMINATIONS_SQL)
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows)
    }

    async fn cast_vote(&self, user_id: i64, nomination_id: i64) -> Result<VoteOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;
        let inserted: Option<i64> = sqlx::query_scalar(INSERT_VOTE_SQL)
            .bind(user_id)
            .bind(nomination_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(vote_id) = inserted else {
            tx.rollback().await?;
            return Ok(VoteOutcome::AlreadyVoted);
        };

        let vote_count: i64 = sqlx::query_scalar(COUNT_VOTES_SQL)
            .bind(nomination_id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        debug!(vote_id, nomination_id, vote_count, "vote committed");
        Ok(VoteOutcome::Recorded { vote_count })
    }
}
