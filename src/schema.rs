//! Database schema definitions.
//!
//! Every statement is idempotent so the schema can be applied on each open.

pub const CREATE_COMPANIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS companies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE COLLATE NOCASE,
    industry TEXT,
    location TEXT
)
"#;

pub const CREATE_JOBS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS jobs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    company_id INTEGER NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    deadline TEXT
)
"#;

pub const CREATE_APPLICANTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS applicants (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE
)
"#;

pub const CREATE_SKILLS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS skills (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
)
"#;

pub const CREATE_APPLICANT_SKILLS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS applicant_skills (
    applicant_id INTEGER NOT NULL REFERENCES applicants(id) ON DELETE CASCADE,
    skill_id INTEGER NOT NULL REFERENCES skills(id) ON DELETE CASCADE,
    PRIMARY KEY (applicant_id, skill_id)
)
"#;

pub const CREATE_JOB_SKILLS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS job_skills (
    job_id INTEGER NOT NULL REFERENCES jobs(id) ON DELETE CASCADE,
    skill_id INTEGER NOT NULL REFERENCES skills(id) ON DELETE CASCADE,
    PRIMARY KEY (job_id, skill_id)
)
"#;

/// Status membership is enforced by `ApplicationStatus`, not by a CHECK here.
pub const CREATE_APPLICATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS applications (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    applicant_id INTEGER NOT NULL REFERENCES applicants(id) ON DELETE CASCADE,
    job_id INTEGER NOT NULL REFERENCES jobs(id) ON DELETE CASCADE,
    status TEXT NOT NULL DEFAULT 'applied',
    date_applied TEXT,
    notes TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE (applicant_id, job_id)
)
"#;

pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_jobs_company ON jobs(company_id)",
    "CREATE INDEX IF NOT EXISTS idx_applications_job ON applications(job_id)",
    "CREATE INDEX IF NOT EXISTS idx_applications_date ON applications(date_applied)",
    "CREATE INDEX IF NOT EXISTS idx_applicant_skills_skill ON applicant_skills(skill_id)",
    "CREATE INDEX IF NOT EXISTS idx_job_skills_skill ON job_skills(skill_id)",
];

/// Tables in dependency order.
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_COMPANIES_TABLE,
        CREATE_JOBS_TABLE,
        CREATE_APPLICANTS_TABLE,
        CREATE_SKILLS_TABLE,
        CREATE_APPLICANT_SKILLS_TABLE,
        CREATE_JOB_SKILLS_TABLE,
        CREATE_APPLICATIONS_TABLE,
    ];
    stmts.extend(CREATE_INDEXES);
    stmts
}
