//! Text rendering shared by the CLI, the menu and the browser.

use chrono::NaiveDate;

use crate::models::{ApplicationStatus, JobApplication, DATE_FORMAT};
use crate::report::CompanyStats;

pub const RULE_WIDTH: usize = 40;

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

pub fn date_or(date: Option<NaiveDate>, fallback: &str) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| fallback.to_string())
}

pub fn application_block(app: &JobApplication) -> String {
    format!(
        "ID: {}\nJob Title: {}\nCompany: {}\nApplicant: {}\nApplication Date: {}\nStatus: {}\nDeadline: {}\nNotes: {}\n{}",
        app.id,
        app.job_title,
        app.company_name,
        app.applicant_name,
        date_or(app.date_applied, "Not set"),
        app.status,
        date_or(app.deadline, "No deadline"),
        app.notes.as_deref().unwrap_or("No notes"),
        "-".repeat(RULE_WIDTH)
    )
}

pub fn stats_block(stats: &CompanyStats) -> String {
    let count = |status: ApplicationStatus| stats.count(status);
    format!(
        "Company: {}\nTotal Applications: {}\n  Applied: {}, Interviewing: {}, Offers: {}\n  Rejected: {}, Accepted: {}, Withdrawn: {}\n{}",
        stats.company,
        stats.total,
        count(ApplicationStatus::Applied),
        count(ApplicationStatus::Interviewing),
        count(ApplicationStatus::Offer),
        count(ApplicationStatus::Rejected),
        count(ApplicationStatus::Accepted),
        count(ApplicationStatus::Withdrawn),
        "-".repeat(RULE_WIDTH)
    )
}

pub fn application_table_header() -> String {
    format!(
        "{:<6} {:<13} {:<26} {:<20} {:<11}\n{}",
        "ID",
        "STATUS",
        "TITLE",
        "COMPANY",
        "APPLIED",
        "-".repeat(80)
    )
}

pub fn application_table_row(app: &JobApplication) -> String {
    format!(
        "{:<6} {:<13} {:<26} {:<20} {:<11}",
        app.id,
        app.status.label(),
        truncate(&app.job_title, 24),
        truncate(&app.company_name, 18),
        date_or(app.date_applied, "-")
    )
}
