//! Per-company application counts, broken down by status.

use std::collections::HashMap;

use rusqlite::Connection;
use serde::Serialize;

use crate::error::Result;
use crate::models::{ApplicationStatus, STATUS_COUNT};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyStats {
    pub company_id: i64,
    pub company: String,
    pub total: u32,
    /// Indexed by `ApplicationStatus::index`.
    pub by_status: [u32; STATUS_COUNT],
}

impl CompanyStats {
    fn new(company_id: i64, company: String) -> Self {
        Self {
            company_id,
            company,
            total: 0,
            by_status: [0; STATUS_COUNT],
        }
    }

    pub fn count(&self, status: ApplicationStatus) -> u32 {
        self.by_status[status.index()]
    }
}

pub fn company_stats(conn: &Connection) -> Result<Vec<CompanyStats>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.name, a.status, COUNT(*)
         FROM applications a
         JOIN jobs j ON j.id = a.job_id
         JOIN companies c ON c.id = j.company_id
         GROUP BY c.id, a.status",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(StatusCount {
                company_id: row.get(0)?,
                company: row.get(1)?,
                status: row.get(2)?,
                count: row.get(3)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(fold(rows))
}

/// One `(company, status)` group from the aggregate query.
#[derive(Debug, Clone)]
pub struct StatusCount {
    pub company_id: i64,
    pub company: String,
    pub status: ApplicationStatus,
    pub count: u32,
}

/// Collapse status groups into one row per company, busiest first.
pub fn fold(rows: impl IntoIterator<Item = StatusCount>) -> Vec<CompanyStats> {
    let mut by_company: HashMap<i64, CompanyStats> = HashMap::new();
    for row in rows {
        let stats = by_company
            .entry(row.company_id)
            .or_insert_with(|| CompanyStats::new(row.company_id, row.company));
        stats.by_status[row.status.index()] += row.count;
        stats.total += row.count;
    }

    let mut stats: Vec<CompanyStats> = by_company.into_values().collect();
    stats.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.company.to_lowercase().cmp(&b.company.to_lowercase()))
    });
    stats
}
