use clap::Parser;

/// The default upload path for the `fs` blob store.
const DEFAULT_UPLOAD_PATH: &str = "upload";
/// The default address to listen on.
const DEFAULT_ADDRESS: &str = "0.0.0.0:42069";
/// The default base URL used when building view and download links.
const DEFAULT_PUBLIC_URL: &str = "http://localhost:42069";
/// The default avatar template. `{initials}` gets replaced with the user's initials.
const DEFAULT_AVATAR_URL: &str = "https://ui-avatars.com/api/?name={initials}";
/// 50 MiB.
const DEFAULT_MAX_UPLOAD_SIZE: usize = 50 * 1024 * 1024;
/// One year.
const DEFAULT_SESSION_TTL_DAYS: i64 = 365;

#[derive(Debug, Parser)]
#[command(name = "stowage", version = "0.1", about = "Store and share files", long_about = None)]
pub struct StartArgs {
    /// Database URL.
    #[arg(short, long)]
    db_url: Option<String>,

    /// RUST_LOG string to use as the env filter.
    #[arg(short, long)]
    log: Option<String>,

    /// Directory of the `fs` blob store.
    #[arg(short, long)]
    upload_path: Option<String>,

    /// Address to listen on.
    #[arg(short, long)]
    address: Option<String>,

    /// Base URL of the server as seen by clients.
    #[arg(short, long)]
    public_url: Option<String>,

    /// Avatar URL template for new users.
    #[arg(long)]
    avatar_url: Option<String>,

    /// Maximum size of a single uploaded file in bytes.
    #[arg(short, long)]
    max_upload_size: Option<usize>,

    /// Session lifetime in days.
    #[arg(long)]
    session_ttl_days: Option<i64>,

    /// CORS allowed origins.
    #[arg(short, long)]
    cors_allowed_origins: Option<String>,
}

/// Implement a getter method on [StartArgs], using the `$var` environment variable as a fallback
/// and either panic or default if neither the argument nor the environment variable is set.
macro_rules! arg {
    ($id:ident, $var:literal, panic $msg:literal) => {
        impl StartArgs {
            pub fn $id(&self) -> String {
                match &self.$id {
                    Some(val) => val.to_string(),
                    None => match std::env::var($var) {
                        Ok(val) => val,
                        Err(_) => panic!($msg),
                    },
                }
            }
        }
    };
    ($id:ident, $var:literal, default $value:expr) => {
        impl StartArgs {
            pub fn $id(&self) -> String {
                match &self.$id {
                    Some(val) => val.to_string(),
                    None => match std::env::var($var) {
                        Ok(val) => val,
                        Err(_) => $value,
                    },
                }
            }
        }
    };
    ($id:ident: $ty:ty, $var:literal, default $value:expr) => {
        impl StartArgs {
            pub fn $id(&self) -> $ty {
                match self.$id {
                    Some(val) => val,
                    None => match std::env::var($var) {
                        Ok(val) => val
                            .parse()
                            .unwrap_or_else(|_| panic!("{} must be a valid {}", $var, stringify!($ty))),
                        Err(_) => $value,
                    },
                }
            }
        }
    };
}

impl StartArgs {
    pub fn allowed_origins(&self) -> Vec<String> {
        match &self.cors_allowed_origins {
            Some(origins) => origins
                .split(',')
                .filter_map(|o| (!o.is_empty()).then_some(String::from(o)))
                .collect(),
            None => match std::env::var("CORS_ALLOWED_ORIGINS") {
                Ok(origins) => origins
                    .split(',')
                    .filter_map(|o| (!o.is_empty()).then_some(String::from(o)))
                    .collect(),
                Err(_) => panic!(
                    "Allowed origins not found; Pass --cors-allowed-origins (-c) or set CORS_ALLOWED_ORIGINS as a comma separated list"
                ),
            },
        }
    }
}

arg!(db_url,                  "DATABASE_URL",     panic   "Database url not found; Pass --db-url or set DATABASE_URL");
arg!(log,                     "RUST_LOG",         default "info".to_string());
arg!(upload_path,             "UPLOAD_PATH",      default DEFAULT_UPLOAD_PATH.to_string());
arg!(address,                 "ADDRESS",          default DEFAULT_ADDRESS.to_string());
arg!(public_url,              "PUBLIC_URL",       default DEFAULT_PUBLIC_URL.to_string());
arg!(avatar_url,              "AVATAR_URL",       default DEFAULT_AVATAR_URL.to_string());
arg!(max_upload_size: usize,  "MAX_UPLOAD_SIZE",  default DEFAULT_MAX_UPLOAD_SIZE);
arg!(session_ttl_days: i64,   "SESSION_TTL_DAYS", default DEFAULT_SESSION_TTL_DAYS);
