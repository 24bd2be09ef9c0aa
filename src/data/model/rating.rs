pub static DEFAULT_NICKNAME: &str = "Some user 🐟";

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct RatingRecord {
    pub id: i64,
    pub user_id: i64,
    pub nickname: String,
    pub total_correct: i64,
    pub total_wrong: i64,
}

impl RatingRecord {
    /// Leaderboard key: every answer counts, right or wrong.
    pub fn score(&self) -> i64 {
        self.total_correct + self.total_wrong
    }
}
