//! Generic row access shared by every entity.
//!
//! An [`Entity`] describes how to read its rows; an [`Insertable`] describes
//! how to validate and write a new one. [`Repository`] is written once
//! against those two traits.

use std::marker::PhantomData;

use rusqlite::{params, Connection, OptionalExtension, Params, Row};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{
    Applicant, Company, Job, JobApplication, NewApplicant, NewApplication, NewCompany, NewJob,
    NewSkill, Skill,
};

pub trait Entity: Sized {
    /// Human name used in not-found messages.
    const NAME: &'static str;
    const TABLE: &'static str;
    /// SELECT ... FROM ... (with joins), no WHERE or ORDER BY.
    const SELECT: &'static str;
    /// Qualified id column as it appears in `SELECT`.
    const ID: &'static str;
    const ORDER_BY: &'static str;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

pub trait Insertable {
    type Entity: Entity;

    /// Normalize, then insert. Returns the new row id.
    fn insert(self, conn: &Connection) -> Result<i64>;
}

pub struct Repository<'c, E> {
    conn: &'c Connection,
    _entity: PhantomData<E>,
}

impl<'c, E: Entity> Repository<'c, E> {
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            _entity: PhantomData,
        }
    }

    pub fn all(&self) -> Result<Vec<E>> {
        self.filter("1=1", [])
    }

    /// Rows matching `where_clause`, in the entity's natural order.
    pub fn filter<P: Params>(&self, where_clause: &str, params: P) -> Result<Vec<E>> {
        let sql = format!(
            "{} WHERE {} ORDER BY {}",
            E::SELECT,
            where_clause,
            E::ORDER_BY
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params, E::from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(Error::from)
    }

    pub fn find(&self, id: i64) -> Result<Option<E>> {
        let sql = format!("{} WHERE {} = ?1", E::SELECT, E::ID);
        self.conn
            .query_row(&sql, [id], E::from_row)
            .optional()
            .map_err(Error::from)
    }

    pub fn get(&self, id: i64) -> Result<E> {
        self.find(id)?.ok_or(Error::NotFound {
            entity: E::NAME,
            id,
        })
    }

    pub fn exists(&self, id: i64) -> Result<bool> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)", E::TABLE);
        let found: bool = self.conn.query_row(&sql, [id], |row| row.get(0))?;
        Ok(found)
    }

    pub fn count(&self) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", E::TABLE);
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn create<N>(&self, new: N) -> Result<i64>
    where
        N: Insertable<Entity = E>,
    {
        let id = new.insert(self.conn)?;
        debug!(entity = E::NAME, id, "created");
        Ok(id)
    }

    /// Returns `false` when no row had that id. Dependents go with it.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", E::TABLE);
        let removed = self.conn.execute(&sql, [id])?;
        if removed > 0 {
            debug!(entity = E::NAME, id, "deleted");
        }
        Ok(removed > 0)
    }
}

// --- Entities ---

impl Entity for Company {
    const NAME: &'static str = "company";
    const TABLE: &'static str = "companies";
    const SELECT: &'static str = "SELECT c.id, c.name, c.industry, c.location FROM companies c";
    const ID: &'static str = "c.id";
    const ORDER_BY: &'static str = "c.name COLLATE NOCASE";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Company {
            id: row.get(0)?,
            name: row.get(1)?,
            industry: row.get(2)?,
            location: row.get(3)?,
        })
    }
}

impl Entity for Job {
    const NAME: &'static str = "job";
    const TABLE: &'static str = "jobs";
    const SELECT: &'static str = "SELECT j.id, j.company_id, c.name, j.title, j.deadline
         FROM jobs j
         JOIN companies c ON c.id = j.company_id";
    const ID: &'static str = "j.id";
    const ORDER_BY: &'static str = "j.deadline IS NULL, j.deadline, j.title COLLATE NOCASE";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Job {
            id: row.get(0)?,
            company_id: row.get(1)?,
            company_name: row.get(2)?,
            title: row.get(3)?,
            deadline: row.get(4)?,
        })
    }
}

impl Entity for Applicant {
    const NAME: &'static str = "applicant";
    const TABLE: &'static str = "applicants";
    const SELECT: &'static str = "SELECT p.id, p.name, p.email FROM applicants p";
    const ID: &'static str = "p.id";
    const ORDER_BY: &'static str = "p.name COLLATE NOCASE, p.id";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Applicant {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
        })
    }
}

impl Entity for Skill {
    const NAME: &'static str = "skill";
    const TABLE: &'static str = "skills";
    const SELECT: &'static str = "SELECT s.id, s.name FROM skills s";
    const ID: &'static str = "s.id";
    const ORDER_BY: &'static str = "s.name";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Skill {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }
}

impl Entity for JobApplication {
    const NAME: &'static str = "application";
    const TABLE: &'static str = "applications";
    const SELECT: &'static str = "SELECT a.id, a.applicant_id, p.name, a.job_id, j.title, c.name,
                j.deadline, a.status, a.date_applied, a.notes, a.created_at, a.updated_at
         FROM applications a
         JOIN applicants p ON p.id = a.applicant_id
         JOIN jobs j ON j.id = a.job_id
         JOIN companies c ON c.id = j.company_id";
    const ID: &'static str = "a.id";
    // Undated applications sort last under DESC.
    const ORDER_BY: &'static str = "a.date_applied DESC, a.id DESC";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(JobApplication {
            id: row.get(0)?,
            applicant_id: row.get(1)?,
            applicant_name: row.get(2)?,
            job_id: row.get(3)?,
            job_title: row.get(4)?,
            company_name: row.get(5)?,
            deadline: row.get(6)?,
            status: row.get(7)?,
            date_applied: row.get(8)?,
            notes: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }
}

// --- Inserts ---

impl Insertable for NewCompany {
    type Entity = Company;

    fn insert(self, conn: &Connection) -> Result<i64> {
        let company = self.normalize()?;
        conn.execute(
            "INSERT INTO companies (name, industry, location) VALUES (?1, ?2, ?3)",
            params![company.name, company.industry, company.location],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

impl Insertable for NewJob {
    type Entity = Job;

    fn insert(self, conn: &Connection) -> Result<i64> {
        let job = self.normalize()?;
        if !Repository::<Company>::new(conn).exists(job.company_id)? {
            return Err(Error::NotFound {
                entity: Company::NAME,
                id: job.company_id,
            });
        }
        conn.execute(
            "INSERT INTO jobs (company_id, title, deadline) VALUES (?1, ?2, ?3)",
            params![job.company_id, job.title, job.deadline],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

impl Insertable for NewApplicant {
    type Entity = Applicant;

    fn insert(self, conn: &Connection) -> Result<i64> {
        let applicant = self.normalize()?;
        conn.execute(
            "INSERT INTO applicants (name, email) VALUES (?1, ?2)",
            params![applicant.name, applicant.email],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

impl Insertable for NewSkill {
    type Entity = Skill;

    fn insert(self, conn: &Connection) -> Result<i64> {
        let skill = self.normalize()?;
        conn.execute("INSERT INTO skills (name) VALUES (?1)", [&skill.name])?;
        Ok(conn.last_insert_rowid())
    }
}

impl Insertable for NewApplication {
    type Entity = JobApplication;

    fn insert(self, conn: &Connection) -> Result<i64> {
        let app = self.normalize()?;
        if !Repository::<Applicant>::new(conn).exists(app.applicant_id)? {
            return Err(Error::NotFound {
                entity: Applicant::NAME,
                id: app.applicant_id,
            });
        }
        if !Repository::<Job>::new(conn).exists(app.job_id)? {
            return Err(Error::NotFound {
                entity: Job::NAME,
                id: app.job_id,
            });
        }
        conn.execute(
            "INSERT INTO applications (applicant_id, job_id, status, date_applied, notes)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                app.applicant_id,
                app.job_id,
                app.status,
                app.date_applied,
                app.notes
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }
}
