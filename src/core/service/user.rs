use crate::{
    core::{
        model::user::{initials, OtpInsert, Session, SessionInsert, User, UserInsert},
        notify::OtpSender,
        repo::{user::UserRepo, Atomic},
        sha256,
    },
    err,
    error::StowageError,
    map_err, transaction,
};
use chrono::{Duration, Utc};
use dto::{SignIn, SignUp};
use rand::Rng;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validify::Validify;

/// Wrong guesses allowed before a pending code is discarded.
pub const MAX_OTP_ATTEMPTS: i32 = 5;

/// Settings for [UserService].
#[derive(Debug, Clone)]
pub struct UserServiceConfig {
    /// Avatar URL template. `{initials}` gets replaced with the user's initials.
    pub avatar_url: String,

    /// How long a session stays valid.
    pub session_ttl: Duration,

    /// How long a one-time code stays valid.
    pub otp_ttl: Duration,
}

/// Email one-time code authentication and session management.
#[derive(Clone)]
pub struct UserService<R> {
    pub repo: R,
    sender: Arc<dyn OtpSender + Send + Sync>,
    config: UserServiceConfig,
}

impl<R> UserService<R>
where
    R: UserRepo + Atomic + Send + Sync,
    R::Tx: Send + Sync,
{
    pub fn new(repo: R, sender: Arc<dyn OtpSender + Send + Sync>, config: UserServiceConfig) -> Self {
        Self {
            repo,
            sender,
            config,
        }
    }

    /// Create the user if the email is new and send a sign in code.
    /// Returns the account ID the code has to be verified against.
    ///
    /// * `params`: Name and email.
    pub async fn sign_up(&self, mut params: SignUp) -> Result<Uuid, StowageError> {
        map_err!(params.validify());

        let user = match self.repo.get_by_email(&params.email).await? {
            Some(user) => user,
            None => {
                let avatar = self
                    .config
                    .avatar_url
                    .replace("{initials}", &initials(&params.full_name));
                let user = self
                    .repo
                    .insert(UserInsert::new(&params.full_name, &params.email, &avatar))
                    .await?;
                info!("Created user '{}' ({})", user.email, user.id);
                user
            }
        };

        self.send_otp(&user).await?;

        Ok(user.account_id)
    }

    /// Send a sign in code to an existing user.
    ///
    /// * `params`: Email.
    pub async fn sign_in(&self, mut params: SignIn) -> Result<Uuid, StowageError> {
        map_err!(params.validify());

        let Some(user) = self.repo.get_by_email(&params.email).await? else {
            return err!(DoesNotExist, "User with email '{}'", params.email);
        };

        self.send_otp(&user).await?;

        Ok(user.account_id)
    }

    /// Exchange a one-time code for a session. The code is consumed.
    /// Every wrong guess counts against the pending code, which is discarded
    /// after [MAX_OTP_ATTEMPTS] of them.
    ///
    /// * `account_id`: The account the code was sent for.
    /// * `code`: The code.
    pub async fn verify_otp(&self, account_id: Uuid, code: &str) -> Result<Session, StowageError> {
        let Some(user) = self.repo.get_by_account_id(account_id).await? else {
            return err!(Unauthorized);
        };

        let code_hash = sha256(code.trim().as_bytes());
        let token = generate_token();
        let token_hash = sha256(token.as_bytes());
        let now = Utc::now();
        let expires_at = now + self.config.session_ttl;
        let user_id = user.id;

        // A rejected code still commits so the attempt is counted
        let verified = transaction!(self.repo, |tx| async move {
            let tx: &mut <R as Atomic>::Tx = tx;
            let consumed = self
                .repo
                .consume_otp(account_id, &code_hash, now, MAX_OTP_ATTEMPTS, &mut *tx)
                .await?;

            if !consumed {
                return Ok(false);
            }

            let session = SessionInsert {
                token_hash: &token_hash,
                user_id,
                expires_at,
            };

            self.repo.insert_session(session, tx).await?;

            Ok::<_, StowageError>(true)
        })?;

        if !verified {
            warn!("Rejected sign in code for account '{account_id}'");
            return err!(Unauthorized);
        }

        info!("Started session for '{}'", user.email);

        Ok(Session {
            token,
            user_id,
            expires_at,
        })
    }

    /// Resolve a session token to its user.
    ///
    /// * `token`: Session token.
    pub async fn current_user(&self, token: &str) -> Result<User, StowageError> {
        let hash = sha256(token.as_bytes());
        match self.repo.get_by_session(&hash, Utc::now()).await? {
            Some(user) => Ok(user),
            None => err!(Unauthorized),
        }
    }

    /// End a session. Unknown tokens are ignored.
    ///
    /// * `token`: Session token.
    pub async fn sign_out(&self, token: &str) -> Result<(), StowageError> {
        let hash = sha256(token.as_bytes());
        self.repo.remove_session(&hash).await?;
        Ok(())
    }

    async fn send_otp(&self, user: &User) -> Result<(), StowageError> {
        let code = generate_code();
        let code_hash = sha256(code.as_bytes());

        self.repo
            .upsert_otp(OtpInsert {
                account_id: user.account_id,
                code_hash: &code_hash,
                expires_at: Utc::now() + self.config.otp_ttl,
            })
            .await?;

        self.sender.send(&user.email, &code).await
    }
}

/// Six random digits.
fn generate_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{n:06}")
}

/// 32 random bytes, hex encoded.
fn generate_token() -> String {
    hex::encode(rand::random::<[u8; 32]>())
}

/// User service DTOs.
pub mod dto {
    use serde::Deserialize;
    use validify::Validify;

    #[derive(Debug, Deserialize, Validify, utoipa::ToSchema)]
    #[serde(rename_all = "camelCase")]
    pub struct SignUp {
        #[modify(trim)]
        #[validate(length(min = 1, max = 100, message = "Full name cannot be empty."))]
        pub full_name: String,

        #[modify(trim, lowercase)]
        #[validate(email)]
        pub email: String,
    }

    #[derive(Debug, Deserialize, Validify, utoipa::ToSchema)]
    #[serde(rename_all = "camelCase")]
    pub struct SignIn {
        #[modify(trim, lowercase)]
        #[validate(email)]
        pub email: String,
    }
}
