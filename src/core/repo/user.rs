use super::Atomic;
use crate::{
    core::model::user::{OtpInsert, SessionInsert, User, UserInsert},
    error::StowageError,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Users, their pending one-time codes and their sessions.
#[async_trait::async_trait]
pub trait UserRepo {
    /// * `email`: Lowercase email.
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, StowageError>;

    async fn get_by_account_id(&self, account_id: Uuid) -> Result<Option<User>, StowageError>;

    async fn insert(&self, user: UserInsert<'_>) -> Result<User, StowageError>;

    /// Store a one-time code for the account, replacing any pending one
    /// along with its attempt count.
    ///
    /// * `otp`: Insert payload.
    async fn upsert_otp(&self, otp: OtpInsert<'_>) -> Result<(), StowageError>;

    /// Delete the account's code if the hash matches and it has not expired.
    /// Returns whether a code was consumed. A miss counts as an attempt and
    /// the code is deleted once it reaches `max_attempts`.
    ///
    /// * `account_id`: Account the code was issued for.
    /// * `code_hash`: Digest of the submitted code.
    /// * `now`: Expiry reference.
    /// * `max_attempts`: Misses allowed before the code is discarded.
    /// * `tx`: The transaction to run in.
    async fn consume_otp(
        &self,
        account_id: Uuid,
        code_hash: &str,
        now: DateTime<Utc>,
        max_attempts: i32,
        tx: &mut <Self as Atomic>::Tx,
    ) -> Result<bool, StowageError>
    where
        Self: Atomic;

    /// * `session`: Insert payload.
    /// * `tx`: The transaction to run in.
    async fn insert_session(
        &self,
        session: SessionInsert<'_>,
        tx: &mut <Self as Atomic>::Tx,
    ) -> Result<(), StowageError>
    where
        Self: Atomic;

    /// Get the user of an unexpired session.
    ///
    /// * `token_hash`: Digest of the session token.
    /// * `now`: Expiry reference.
    async fn get_by_session(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StowageError>;

    /// * `token_hash`: Digest of the session token.
    async fn remove_session(&self, token_hash: &str) -> Result<u64, StowageError>;
}
