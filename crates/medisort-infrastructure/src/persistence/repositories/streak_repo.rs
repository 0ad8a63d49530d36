use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use std::sync::Arc;

use medisort_domain::shared::{DomainError, UserId};
use medisort_domain::streak::{StreakMutation, StreakRepository, UserStreak};

use crate::persistence::{RepoResultExt, SqliteRepositoryBase};

#[derive(FromRow)]
struct StreakRow {
    user_id: String,
    current_streak: i64,
    longest_streak: i64,
    last_adherence_date: Option<NaiveDate>,
    streak_start_date: Option<NaiveDate>,
}

impl StreakRow {
    fn into_streak(self) -> Result<UserStreak, DomainError> {
        let current = u32::try_from(self.current_streak).map_err(|_| {
            DomainError::DataIntegrity(format!(
                "Invalid current_streak {} for user {}",
                self.current_streak, self.user_id
            ))
        })?;
        let longest = u32::try_from(self.longest_streak).map_err(|_| {
            DomainError::DataIntegrity(format!(
                "Invalid longest_streak {} for user {}",
                self.longest_streak, self.user_id
            ))
        })?;

        UserStreak::restore(
            UserId::from_string(&self.user_id),
            current,
            longest,
            self.last_adherence_date,
            self.streak_start_date,
        )
    }
}

const SELECT_STREAK: &str = "SELECT user_id, current_streak, longest_streak, last_adherence_date, streak_start_date FROM user_streaks WHERE user_id = ?1";

pub struct SqliteStreakRepository {
    base: SqliteRepositoryBase,
}

impl SqliteStreakRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            base: SqliteRepositoryBase::new(pool),
        }
    }

    async fn read_modify_write(
        conn: &mut SqliteConnection,
        user_id: &UserId,
        mutation: StreakMutation,
    ) -> Result<UserStreak, DomainError> {
        let row: Option<StreakRow> = sqlx::query_as(SELECT_STREAK)
            .bind(user_id.as_str())
            .fetch_optional(&mut *conn)
            .await
            .map_repo_error("Read streak")?;

        let current = match row {
            Some(row) => row.into_streak()?,
            None => UserStreak::new(user_id.clone()),
        };

        let updated = mutation(current);
        if updated.user_id() != user_id {
            return Err(DomainError::DataIntegrity(format!(
                "Streak mutation for {} returned user {}",
                user_id,
                updated.user_id()
            )));
        }

        let query = r#"
            INSERT INTO user_streaks
                (user_id, current_streak, longest_streak, last_adherence_date, streak_start_date, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(user_id) DO UPDATE SET
                current_streak = ?2,
                longest_streak = ?3,
                last_adherence_date = ?4,
                streak_start_date = ?5,
                updated_at = ?6
        "#;

        sqlx::query(query)
            .bind(user_id.as_str())
            .bind(i64::from(updated.current_streak()))
            .bind(i64::from(updated.longest_streak()))
            .bind(updated.last_adherence_date())
            .bind(updated.streak_start_date())
            .bind(Utc::now())
            .execute(&mut *conn)
            .await
            .map_repo_error("Write streak")?;

        Ok(updated)
    }
}

#[async_trait]
impl StreakRepository for SqliteStreakRepository {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<UserStreak>, DomainError> {
        let row: Option<StreakRow> = self
            .base
            .fetch_optional(
                sqlx::query_as(SELECT_STREAK).bind(user_id.as_str()),
                "Find streak by user",
            )
            .await?;

        row.map(StreakRow::into_streak).transpose()
    }

    async fn update_atomically(
        &self,
        user_id: &UserId,
        mutation: StreakMutation,
    ) -> Result<UserStreak, DomainError> {
        // IMMEDIATE takes the write lock up front so concurrent updaters
        // queue on busy_timeout instead of failing on lock upgrade. Dropping
        // the transaction without a commit rolls it back.
        let mut tx = self
            .base
            .pool()
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_repo_error("Begin streak transaction")?;

        let streak = Self::read_modify_write(&mut tx, user_id, mutation).await?;

        tx.commit()
            .await
            .map_repo_error("Commit streak transaction")?;
        Ok(streak)
    }
}
