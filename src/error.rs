//! Error types for the tracker.

use rusqlite::ErrorCode;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Input rejected before it reached the database.
    #[error("{0}")]
    Validation(String),

    #[error("{entity} #{id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A UNIQUE or FOREIGN KEY constraint refused the write.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// True for errors the menu reports and recovers from.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::NotFound { .. } | Error::Conflict(_)
        )
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, message)
                if code.code == ErrorCode::ConstraintViolation =>
            {
                let detail = message
                    .clone()
                    .unwrap_or_else(|| "constraint violation".to_string());
                Error::Conflict(describe_constraint(&detail))
            }
            _ => Error::Database(err),
        }
    }
}

/// Turn SQLite's constraint message into something a person can act on.
fn describe_constraint(detail: &str) -> String {
    if detail.contains("applications.applicant_id, applications.job_id") {
        "applicant has already applied to this job".to_string()
    } else if detail.contains("applicants.email") {
        "an applicant with this email already exists".to_string()
    } else if detail.contains("companies.name") {
        "a company with this name already exists".to_string()
    } else if detail.contains("skills.name") {
        "skill already exists".to_string()
    } else if detail.contains("FOREIGN KEY") {
        "referenced record does not exist".to_string()
    } else {
        detail.to_string()
    }
}
