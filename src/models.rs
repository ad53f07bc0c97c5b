use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Number of `ApplicationStatus` variants.
pub const STATUS_COUNT: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub industry: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    pub company_id: i64,
    pub company_name: String, // denormalized for display
    pub title: String,
    pub deadline: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Applicant {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: i64,
    pub name: String,
}

/// An application joined with the names it points at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: i64,
    pub applicant_id: i64,
    pub applicant_name: String,
    pub job_id: i64,
    pub job_title: String,
    pub company_name: String,
    pub deadline: Option<NaiveDate>,
    pub status: ApplicationStatus,
    pub date_applied: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Applied,
    Interviewing,
    Offer,
    Rejected,
    Accepted,
    Withdrawn,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; STATUS_COUNT] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Interviewing,
        ApplicationStatus::Offer,
        ApplicationStatus::Rejected,
        ApplicationStatus::Accepted,
        ApplicationStatus::Withdrawn,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Interviewing => "interviewing",
            ApplicationStatus::Offer => "offer",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Interviewing => "Interviewing",
            ApplicationStatus::Offer => "Offer",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Withdrawn => "Withdrawn",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ApplicationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "applied" => Ok(ApplicationStatus::Applied),
            "interviewing" | "interview" => Ok(ApplicationStatus::Interviewing),
            "offer" => Ok(ApplicationStatus::Offer),
            "rejected" => Ok(ApplicationStatus::Rejected),
            "accepted" => Ok(ApplicationStatus::Accepted),
            "withdrawn" => Ok(ApplicationStatus::Withdrawn),
            other => Err(Error::validation(format!(
                "unknown status '{}' (expected one of: applied, interviewing, offer, rejected, accepted, withdrawn)",
                other
            ))),
        }
    }
}

impl ToSql for ApplicationStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ApplicationStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        text.parse()
            .map_err(|e: Error| FromSqlError::Other(e.to_string().into()))
    }
}

// --- Write-side inputs ---

#[derive(Debug, Clone, Default)]
pub struct NewCompany {
    pub name: String,
    pub industry: Option<String>,
    pub location: Option<String>,
}

impl NewCompany {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn normalize(self) -> Result<Self> {
        Ok(Self {
            name: required("Company name", &self.name)?,
            industry: optional(self.industry),
            location: optional(self.location),
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewJob {
    pub company_id: i64,
    pub title: String,
    pub deadline: Option<NaiveDate>,
}

impl NewJob {
    pub fn normalize(self) -> Result<Self> {
        Ok(Self {
            title: required("Job title", &self.title)?,
            ..self
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewApplicant {
    pub name: String,
    pub email: String,
}

impl NewApplicant {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    pub fn normalize(self) -> Result<Self> {
        Ok(Self {
            name: required("Applicant name", &self.name)?,
            email: normalize_email(&self.email)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewSkill {
    pub name: String,
}

impl NewSkill {
    pub fn normalize(self) -> Result<Self> {
        Ok(Self {
            name: normalize_skill(&self.name)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub applicant_id: i64,
    pub job_id: i64,
    pub status: ApplicationStatus,
    pub date_applied: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl NewApplication {
    pub fn new(applicant_id: i64, job_id: i64) -> Self {
        Self {
            applicant_id,
            job_id,
            status: ApplicationStatus::default(),
            date_applied: None,
            notes: None,
        }
    }

    pub fn normalize(self) -> Result<Self> {
        Ok(Self {
            notes: optional(self.notes),
            ..self
        })
    }
}

/// Everything the menu collects for a one-step add.
#[derive(Debug, Clone)]
pub struct ApplicationDraft {
    pub job_title: String,
    pub company: String,
    pub applicant_name: String,
    pub applicant_email: String,
    pub status: ApplicationStatus,
    pub date_applied: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
    pub notes: Option<String>,
}

// --- Normalization helpers ---

pub fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{} cannot be empty", field)));
    }
    Ok(trimmed.to_string())
}

pub fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn normalize_email(value: &str) -> Result<String> {
    let email = value.trim().to_lowercase();
    if !email.contains('@') || !email.contains('.') {
        return Err(Error::validation(format!("Invalid email format: '{}'", value.trim())));
    }
    Ok(email)
}

pub fn normalize_skill(value: &str) -> Result<String> {
    let name = value.trim().to_lowercase();
    if name.is_empty() {
        return Err(Error::validation("Skill name cannot be empty"));
    }
    Ok(name)
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        Error::validation(format!(
            "Invalid date '{}'. Please use YYYY-MM-DD.",
            value.trim()
        ))
    })
}
