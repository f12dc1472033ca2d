use super::{notify::TracingOtpSender, storage::fs::FsBlobStore};
use crate::core::service::{
    file::{FileService, FileServiceConfig},
    user::{UserService, UserServiceConfig},
};
use chrono::Duration;
use sqlx::PgPool;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// How long a one-time sign in code stays valid.
const OTP_TTL_MINUTES: i64 = 15;

#[derive(Clone)]
pub struct AppState {
    /// Stowage services.
    pub services: ServiceState,

    /// Largest accepted upload in bytes. Also bounds request bodies.
    pub max_upload_size: usize,
}

impl AppState {
    /// Load the application state using the provided configuration.
    pub async fn new(args: &crate::config::StartArgs) -> Self {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from(args.log()))
            .init();

        let postgres = crate::app::repo::pg::init(&args.db_url()).await;
        let store = Arc::new(FsBlobStore::new(&args.upload_path()));
        let max_upload_size = args.max_upload_size();

        let file = FileService::new(
            postgres.clone(),
            store,
            FileServiceConfig {
                public_url: args.public_url(),
                max_upload_size,
            },
        );

        let user = UserService::new(
            postgres,
            Arc::new(TracingOtpSender),
            UserServiceConfig {
                avatar_url: args.avatar_url(),
                session_ttl: Duration::days(args.session_ttl_days()),
                otp_ttl: Duration::minutes(OTP_TTL_MINUTES),
            },
        );

        Self {
            services: ServiceState { file, user },
            max_upload_size,
        }
    }

    #[cfg(test)]
    pub fn new_test(services: ServiceState, max_upload_size: usize) -> Self {
        Self {
            services,
            max_upload_size,
        }
    }
}

#[derive(Clone)]
pub struct ServiceState {
    pub file: FileService<PgPool>,
    pub user: UserService<PgPool>,
}
