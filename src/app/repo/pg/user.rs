use crate::{
    core::{
        model::user::{OtpInsert, SessionInsert, User, UserInsert},
        repo::{user::UserRepo, Atomic},
    },
    error::StowageError,
    map_err,
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[async_trait::async_trait]
impl UserRepo for PgPool {
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, StowageError> {
        Ok(map_err!(
            sqlx::query_as::<_, User>(
                "SELECT id, account_id, full_name, email, avatar, created_at, updated_at
                 FROM users
                 WHERE email = $1"
            )
            .bind(email)
            .fetch_optional(self)
            .await
        ))
    }

    async fn get_by_account_id(&self, account_id: Uuid) -> Result<Option<User>, StowageError> {
        Ok(map_err!(
            sqlx::query_as::<_, User>(
                "SELECT id, account_id, full_name, email, avatar, created_at, updated_at
                 FROM users
                 WHERE account_id = $1"
            )
            .bind(account_id)
            .fetch_optional(self)
            .await
        ))
    }

    async fn insert(&self, user: UserInsert<'_>) -> Result<User, StowageError> {
        let UserInsert {
            id,
            account_id,
            full_name,
            email,
            avatar,
        } = user;

        Ok(map_err!(
            sqlx::query_as::<_, User>(
                "INSERT INTO users(id, account_id, full_name, email, avatar)
                 VALUES($1, $2, $3, $4, $5)
                 RETURNING id, account_id, full_name, email, avatar, created_at, updated_at"
            )
            .bind(id)
            .bind(account_id)
            .bind(full_name)
            .bind(email)
            .bind(avatar)
            .fetch_one(self)
            .await
        ))
    }

    async fn upsert_otp(&self, otp: OtpInsert<'_>) -> Result<(), StowageError> {
        let OtpInsert {
            account_id,
            code_hash,
            expires_at,
        } = otp;

        map_err!(
            sqlx::query(
                "INSERT INTO otps(account_id, code_hash, expires_at)
                 VALUES($1, $2, $3)
                 ON CONFLICT(account_id) DO UPDATE SET code_hash = $2, expires_at = $3, attempts = 0"
            )
            .bind(account_id)
            .bind(code_hash)
            .bind(expires_at)
            .execute(self)
            .await
        );

        Ok(())
    }

    async fn consume_otp(
        &self,
        account_id: Uuid,
        code_hash: &str,
        now: DateTime<Utc>,
        max_attempts: i32,
        tx: &mut <Self as Atomic>::Tx,
    ) -> Result<bool, StowageError>
    where
        Self: Atomic,
    {
        let result = map_err!(
            sqlx::query(
                "DELETE FROM otps WHERE account_id = $1 AND code_hash = $2 AND expires_at > $3"
            )
            .bind(account_id)
            .bind(code_hash)
            .bind(now)
            .execute(&mut *tx)
            .await
        );

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        map_err!(
            sqlx::query("UPDATE otps SET attempts = attempts + 1 WHERE account_id = $1")
                .bind(account_id)
                .execute(&mut *tx)
                .await
        );

        map_err!(
            sqlx::query("DELETE FROM otps WHERE account_id = $1 AND attempts >= $2")
                .bind(account_id)
                .bind(max_attempts)
                .execute(&mut *tx)
                .await
        );

        Ok(false)
    }

    async fn insert_session(
        &self,
        session: SessionInsert<'_>,
        tx: &mut <Self as Atomic>::Tx,
    ) -> Result<(), StowageError>
    where
        Self: Atomic,
    {
        let SessionInsert {
            token_hash,
            user_id,
            expires_at,
        } = session;

        map_err!(
            sqlx::query("INSERT INTO sessions(token_hash, user_id, expires_at) VALUES($1, $2, $3)")
                .bind(token_hash)
                .bind(user_id)
                .bind(expires_at)
                .execute(&mut *tx)
                .await
        );

        Ok(())
    }

    async fn get_by_session(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StowageError> {
        Ok(map_err!(
            sqlx::query_as::<_, User>(
                "SELECT u.id, u.account_id, u.full_name, u.email, u.avatar, u.created_at, u.updated_at
                 FROM sessions s
                 INNER JOIN users u ON u.id = s.user_id
                 WHERE s.token_hash = $1 AND s.expires_at > $2"
            )
            .bind(token_hash)
            .bind(now)
            .fetch_optional(self)
            .await
        ))
    }

    async fn remove_session(&self, token_hash: &str) -> Result<u64, StowageError> {
        let result = map_err!(
            sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
                .bind(token_hash)
                .execute(self)
                .await
        );
        Ok(result.rows_affected())
    }
}
