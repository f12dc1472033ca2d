use std::error::Error as _;
use thiserror::Error;
use tracing::error;
use validify::ValidationErrors;

pub mod http;

#[derive(Debug, Error)]
pub enum StowageErr {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden; {0}")]
    Forbidden(String),

    #[error("Does not exist; {0}")]
    DoesNotExist(String),

    #[error("Entity already exists; {0}")]
    AlreadyExists(String),

    #[error("Invalid file name; {0}")]
    InvalidFileName(String),

    #[error("Payload too large; {0}")]
    PayloadTooLarge(String),

    #[error("Invalid sort; {0}")]
    ParseSort(String),

    #[error("IO; {0}")]
    IO(#[from] std::io::Error),

    #[error("SQL; {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Validation; {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Multipart; {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
}

#[derive(Debug, Error)]
#[error("{error}")]
pub struct StowageError {
    file: &'static str,
    line: u32,
    column: u32,
    pub error: StowageErr,
}

impl StowageError {
    pub fn new(file: &'static str, line: u32, column: u32, error: StowageErr) -> StowageError {
        StowageError {
            file,
            line,
            column,
            error,
        }
    }

    pub fn location(&self) -> String {
        format!("{}:{}:{}", self.file, self.line, self.column)
    }

    pub fn print(&self) {
        let location = self.location();

        error!("{location} | {self}");

        if self.error.source().is_some() {
            error!("Causes:");
        }

        let mut src = self.error.source();
        while let Some(source) = src {
            error!(" - {source}");
            src = source.source();
        }
    }
}

#[macro_export]
macro_rules! err {
    ($ty:ident $(, $l:literal $(,)? $($args:expr),* )?) => {
        Err($crate::error::StowageError::new(
            file!(),
            line!(),
            column!(),
            $crate::error::StowageErr::$ty $( (format!($l, $( $args, )*)) )?,
        ))
    };
}

#[macro_export]
macro_rules! map_err {
    ($ex:expr) => {
        $ex.map_err(|e| $crate::error::StowageError::new(file!(), line!(), column!(), e.into()))?
    };
}
