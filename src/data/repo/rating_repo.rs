use futures_util::TryStreamExt;
use sqlx::{Error, Pool, Sqlite};

use crate::data::model::rating::{RatingRecord, DEFAULT_NICKNAME};

/// Leaderboard size.
pub const TOP_LIMIT: i64 = 20;

/// Every method runs in its own transaction. A transaction dropped before
/// `commit` is rolled back, so early returns through `?` leave no partial writes.
#[derive(Clone)]
pub struct RatingRepo {
    pool: Pool<Sqlite>,
}

impl RatingRepo {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Ties on score are ordered by `user_id` so the leaderboard is stable.
    pub async fn fetch_top(&self) -> Result<Vec<RatingRecord>, Error> {
        let mut tx = self.pool.begin().await?;
        let top = sqlx::query_as::<_, RatingRecord>(
            "SELECT id, user_id, nickname, total_correct, total_wrong FROM rating
ORDER BY total_correct + total_wrong DESC, user_id ASC
LIMIT ?",
        )
        .bind(TOP_LIMIT)
        .fetch(&mut *tx)
        .try_collect::<Vec<_>>()
        .await?;
        tx.commit().await?;
        Ok(top)
    }

    pub async fn fetch_by_user_id(&self, user_id: i64) -> Result<Option<RatingRecord>, Error> {
        let mut tx = self.pool.begin().await?;
        let rating = sqlx::query_as::<_, RatingRecord>(
            "SELECT id, user_id, nickname, total_correct, total_wrong FROM rating WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(rating)
    }

    /// Returns `false` when the user already has a record; it is left untouched.
    pub async fn initialize(&self, user_id: i64) -> Result<bool, Error> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "INSERT INTO rating (user_id, nickname, total_correct, total_wrong)
VALUES (?, ?, 0, 0)
ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(DEFAULT_NICKNAME)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn increment_correct(&self, user_id: i64) -> Result<bool, Error> {
        self.apply(
            "UPDATE rating SET total_correct = total_correct + 1 WHERE user_id = ?",
            user_id,
        )
        .await
    }

    pub async fn increment_wrong(&self, user_id: i64) -> Result<bool, Error> {
        self.apply(
            "UPDATE rating SET total_wrong = total_wrong + 1 WHERE user_id = ?",
            user_id,
        )
        .await
    }

    pub async fn rename(&self, user_id: i64, nickname: &str) -> Result<bool, Error> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("UPDATE rating SET nickname = ? WHERE user_id = ?")
            .bind(nickname)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn remove(&self, user_id: i64) -> Result<bool, Error> {
        self.apply("DELETE FROM rating WHERE user_id = ?", user_id)
            .await
    }

    async fn apply(&self, sql: &'static str, user_id: i64) -> Result<bool, Error> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(sql).bind(user_id).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
