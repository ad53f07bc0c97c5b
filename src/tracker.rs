//! Operations the interaction layer calls: create, list, update, delete,
//! search, skill links, and the company report.

use chrono::{Local, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use tracing::{debug, info};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{
    normalize_email, normalize_skill, required, Applicant, ApplicationDraft, ApplicationStatus,
    Company, Job, JobApplication, NewApplicant, NewApplication, NewCompany, NewJob, NewSkill,
    Skill,
};
use crate::repo::{Entity, Repository};
use crate::report::{self, CompanyStats};

pub struct Tracker<'db> {
    db: &'db mut Database,
}

/// Full dump of the store, used by `export`.
#[derive(Debug, Serialize)]
pub struct Snapshot {
    pub exported_at: String,
    pub companies: Vec<Company>,
    pub jobs: Vec<Job>,
    pub applicants: Vec<Applicant>,
    pub skills: Vec<Skill>,
    pub applications: Vec<JobApplication>,
    pub applicant_skills: Vec<(i64, i64)>,
    pub job_skills: Vec<(i64, i64)>,
}

impl<'db> Tracker<'db> {
    pub fn new(db: &'db mut Database) -> Self {
        Self { db }
    }

    fn conn(&self) -> &Connection {
        self.db.conn()
    }

    // --- Create ---

    pub fn add_company(&mut self, company: NewCompany) -> Result<i64> {
        self.db
            .write(|tx| Repository::<Company>::new(tx).create(company))
    }

    pub fn add_job(&mut self, job: NewJob, skills: &[String]) -> Result<i64> {
        self.db.write(|tx| {
            let job_id = Repository::<Job>::new(tx).create(job)?;
            for name in skills {
                link_skill(tx, SkillOwner::Job, job_id, name)?;
            }
            Ok(job_id)
        })
    }

    pub fn add_applicant(&mut self, applicant: NewApplicant, skills: &[String]) -> Result<i64> {
        self.db.write(|tx| {
            let applicant_id = Repository::<Applicant>::new(tx).create(applicant)?;
            for name in skills {
                link_skill(tx, SkillOwner::Applicant, applicant_id, name)?;
            }
            Ok(applicant_id)
        })
    }

    /// Returns the id of the (possibly pre-existing) normalized skill.
    pub fn add_skill(&mut self, name: &str) -> Result<i64> {
        self.db.write(|tx| skill_id(tx, name))
    }

    pub fn apply(&mut self, application: NewApplication) -> Result<i64> {
        let id = self
            .db
            .write(|tx| Repository::<JobApplication>::new(tx).create(application))?;
        info!(id, "application recorded");
        Ok(id)
    }

    /// One-step add: find or create the company, job and applicant, then
    /// record the application. Nothing is written if any step fails.
    pub fn record_application(&mut self, draft: ApplicationDraft) -> Result<i64> {
        let title = required("Job title", &draft.job_title)?;
        let company = required("Company", &draft.company)?;
        let applicant_name = required("Applicant name", &draft.applicant_name)?;
        let email = normalize_email(&draft.applicant_email)?;

        let id = self.db.write(|tx| {
            let company_id = match find_company_id(tx, &company)? {
                Some(id) => id,
                None => Repository::<Company>::new(tx).create(NewCompany::new(company.clone()))?,
            };
            let job_id = match find_job_id(tx, company_id, &title)? {
                Some(id) => id,
                None => Repository::<Job>::new(tx).create(NewJob {
                    company_id,
                    title: title.clone(),
                    deadline: draft.deadline,
                })?,
            };
            let applicant_id = match find_applicant_id(tx, &email)? {
                Some(id) => id,
                None => Repository::<Applicant>::new(tx)
                    .create(NewApplicant::new(applicant_name, email.clone()))?,
            };
            Repository::<JobApplication>::new(tx).create(NewApplication {
                applicant_id,
                job_id,
                status: draft.status,
                date_applied: draft.date_applied,
                notes: draft.notes,
            })
        })?;
        info!(id, title = %title, company = %company, "application recorded");
        Ok(id)
    }

    // --- Read ---

    pub fn companies(&self) -> Result<Vec<Company>> {
        Repository::<Company>::new(self.conn()).all()
    }

    pub fn company(&self, id: i64) -> Result<Option<Company>> {
        Repository::<Company>::new(self.conn()).find(id)
    }

    pub fn jobs(&self) -> Result<Vec<Job>> {
        Repository::<Job>::new(self.conn()).all()
    }

    pub fn jobs_for_company(&self, company_id: i64) -> Result<Vec<Job>> {
        Repository::<Job>::new(self.conn()).filter("j.company_id = ?1", [company_id])
    }

    pub fn applicants(&self) -> Result<Vec<Applicant>> {
        Repository::<Applicant>::new(self.conn()).all()
    }

    pub fn skills(&self) -> Result<Vec<Skill>> {
        Repository::<Skill>::new(self.conn()).all()
    }

    /// Most recent first; undated applications last.
    pub fn applications(&self) -> Result<Vec<JobApplication>> {
        Repository::<JobApplication>::new(self.conn()).all()
    }

    pub fn find_application(&self, id: i64) -> Result<Option<JobApplication>> {
        Repository::<JobApplication>::new(self.conn()).find(id)
    }

    pub fn applicant_skills(&self, applicant_id: i64) -> Result<Vec<Skill>> {
        Repository::<Skill>::new(self.conn()).filter(
            "s.id IN (SELECT skill_id FROM applicant_skills WHERE applicant_id = ?1)",
            [applicant_id],
        )
    }

    pub fn job_skills(&self, job_id: i64) -> Result<Vec<Skill>> {
        Repository::<Skill>::new(self.conn()).filter(
            "s.id IN (SELECT skill_id FROM job_skills WHERE job_id = ?1)",
            [job_id],
        )
    }

    /// Case-insensitive substring match on job title or company name.
    pub fn search(&self, term: &str) -> Result<Vec<JobApplication>> {
        let term = required("Search term", term)?;
        let pattern = like_pattern(&term);
        debug!(%term, "searching applications");
        Repository::<JobApplication>::new(self.conn()).filter(
            "(j.title LIKE ?1 ESCAPE '\\' OR c.name LIKE ?1 ESCAPE '\\')",
            [pattern],
        )
    }

    pub fn company_stats(&self) -> Result<Vec<CompanyStats>> {
        report::company_stats(self.conn())
    }

    // --- Update ---

    /// `false` when no application has that id; the store is left as is.
    pub fn update_status(&mut self, id: i64, status: ApplicationStatus) -> Result<bool> {
        let changed = self.db.write(|tx| {
            Ok(tx.execute(
                "UPDATE applications SET status = ?1, updated_at = datetime('now') WHERE id = ?2",
                params![status, id],
            )?)
        })?;
        if changed > 0 {
            info!(id, status = status.as_str(), "status updated");
        }
        Ok(changed > 0)
    }

    pub fn link_applicant_skill(&mut self, applicant_id: i64, skill: &str) -> Result<()> {
        self.db
            .write(|tx| link_skill(tx, SkillOwner::Applicant, applicant_id, skill))
    }

    pub fn link_job_skill(&mut self, job_id: i64, skill: &str) -> Result<()> {
        self.db
            .write(|tx| link_skill(tx, SkillOwner::Job, job_id, skill))
    }

    // --- Delete ---

    /// Remove a row by id, cascading to its dependents. `false` when absent.
    pub fn delete<E: Entity>(&mut self, id: i64) -> Result<bool> {
        let removed = self.db.write(|tx| Repository::<E>::new(tx).delete(id))?;
        if removed {
            info!(entity = E::NAME, id, "deleted");
        }
        Ok(removed)
    }

    pub fn delete_application(&mut self, id: i64) -> Result<bool> {
        self.delete::<JobApplication>(id)
    }

    pub fn delete_company(&mut self, id: i64) -> Result<bool> {
        self.delete::<Company>(id)
    }

    pub fn delete_job(&mut self, id: i64) -> Result<bool> {
        self.delete::<Job>(id)
    }

    pub fn delete_applicant(&mut self, id: i64) -> Result<bool> {
        self.delete::<Applicant>(id)
    }

    pub fn delete_skill(&mut self, id: i64) -> Result<bool> {
        self.delete::<Skill>(id)
    }

    // --- Export ---

    pub fn export(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            exported_at: Local::now().to_rfc3339(),
            companies: self.companies()?,
            jobs: self.jobs()?,
            applicants: self.applicants()?,
            skills: self.skills()?,
            applications: self.applications()?,
            applicant_skills: link_pairs(self.conn(), "applicant_skills", "applicant_id")?,
            job_skills: link_pairs(self.conn(), "job_skills", "job_id")?,
        })
    }
}

/// Today's date, used when the user leaves the applied date blank.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Debug, Clone, Copy)]
enum SkillOwner {
    Applicant,
    Job,
}

fn link_skill(conn: &Connection, owner: SkillOwner, owner_id: i64, skill: &str) -> Result<()> {
    let (exists, sql) = match owner {
        SkillOwner::Applicant => (
            Repository::<Applicant>::new(conn).exists(owner_id)?,
            "INSERT OR IGNORE INTO applicant_skills (applicant_id, skill_id) VALUES (?1, ?2)",
        ),
        SkillOwner::Job => (
            Repository::<Job>::new(conn).exists(owner_id)?,
            "INSERT OR IGNORE INTO job_skills (job_id, skill_id) VALUES (?1, ?2)",
        ),
    };
    if !exists {
        let entity = match owner {
            SkillOwner::Applicant => Applicant::NAME,
            SkillOwner::Job => Job::NAME,
        };
        return Err(Error::NotFound {
            entity,
            id: owner_id,
        });
    }
    let skill_id = skill_id(conn, skill)?;
    conn.execute(sql, params![owner_id, skill_id])?;
    Ok(())
}

/// Get-or-create a skill by its normalized name.
fn skill_id(conn: &Connection, name: &str) -> Result<i64> {
    let name = normalize_skill(name)?;
    let existing: Option<i64> = conn
        .query_row("SELECT id FROM skills WHERE name = ?1", [&name], |row| {
            row.get(0)
        })
        .optional()?;
    match existing {
        Some(id) => Ok(id),
        None => Repository::<Skill>::new(conn).create(NewSkill { name }),
    }
}

fn find_company_id(conn: &Connection, name: &str) -> Result<Option<i64>> {
    // `name` is declared COLLATE NOCASE.
    Ok(conn
        .query_row("SELECT id FROM companies WHERE name = ?1", [name], |row| {
            row.get(0)
        })
        .optional()?)
}

fn find_job_id(conn: &Connection, company_id: i64, title: &str) -> Result<Option<i64>> {
    Ok(conn
        .query_row(
            "SELECT id FROM jobs WHERE company_id = ?1 AND title = ?2 COLLATE NOCASE
             ORDER BY id LIMIT 1",
            params![company_id, title],
            |row| row.get(0),
        )
        .optional()?)
}

fn find_applicant_id(conn: &Connection, email: &str) -> Result<Option<i64>> {
    Ok(conn
        .query_row("SELECT id FROM applicants WHERE email = ?1", [email], |row| {
            row.get(0)
        })
        .optional()?)
}

fn link_pairs(conn: &Connection, table: &str, owner_column: &str) -> Result<Vec<(i64, i64)>> {
    let sql = format!(
        "SELECT {owner_column}, skill_id FROM {table} ORDER BY {owner_column}, skill_id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let pairs = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(pairs)
}

/// Wrap `term` for LIKE, matching `%`, `_` and `\` literally.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("acme"), "%acme%");
        assert_eq!(like_pattern("100%_"), "%100\\%\\_%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_skill_id_reuses_normalized_row() {
        let mut db = Database::open_in_memory().unwrap();
        let mut tracker = Tracker::new(&mut db);
        let first = tracker.add_skill("Rust").unwrap();
        let second = tracker.add_skill("  rust ").unwrap();
        assert_eq!(first, second);
        assert_eq!(tracker.skills().unwrap().len(), 1);
    }
}
