//! Personal job-application tracker backed by a single SQLite file.
//!
//! Companies own jobs, applicants and jobs share skills, and each
//! application links one applicant to one job with a status. [`Tracker`]
//! exposes the operations; [`Database`] owns the connection.

pub mod console;
pub mod db;
pub mod display;
pub mod error;
pub mod models;
pub mod repo;
pub mod report;
pub mod schema;
pub mod tracker;
pub mod tui;

pub use db::Database;
pub use error::{Error, Result};
pub use models::{ApplicationStatus, JobApplication};
pub use report::CompanyStats;
pub use tracker::Tracker;
