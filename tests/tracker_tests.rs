//! Integration tests for the tracker.
//!
//! Tests cover:
//! - Recording and listing applications (ordering by date applied)
//! - Status updates and deletes, including unknown ids
//! - Search across job title and company name
//! - The per-company status report
//! - Validation, uniqueness and cascade behaviour
//! - Reopening a file-backed store

use apptrack::models::{
    ApplicationDraft, NewApplicant, NewApplication, NewCompany, NewJob,
};
use apptrack::{ApplicationStatus, Database, Error, Tracker};
use chrono::NaiveDate;

// ========== TEST FIXTURES ==========

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn draft(title: &str, company: &str, email: &str, applied: &str, status: ApplicationStatus) -> ApplicationDraft {
    ApplicationDraft {
        job_title: title.to_string(),
        company: company.to_string(),
        applicant_name: "Ada Lovelace".to_string(),
        applicant_email: email.to_string(),
        status,
        date_applied: Some(date(applied)),
        deadline: None,
        notes: None,
    }
}

// ========== CREATE / READ ==========

#[test]
fn test_recorded_application_reads_back() {
    let mut db = Database::open_in_memory().unwrap();
    let mut tracker = Tracker::new(&mut db);

    let id = tracker
        .record_application(draft(
            "Engineer",
            "Acme",
            "ada@example.com",
            "2024-01-01",
            ApplicationStatus::Applied,
        ))
        .unwrap();

    let apps = tracker.applications().unwrap();
    assert_eq!(apps.len(), 1);
    let app = &apps[0];
    assert_eq!(app.id, id);
    assert_eq!(app.job_title, "Engineer");
    assert_eq!(app.company_name, "Acme");
    assert_eq!(app.applicant_name, "Ada Lovelace");
    assert_eq!(app.date_applied, Some(date("2024-01-01")));
    assert_eq!(app.status, ApplicationStatus::Applied);
}

#[test]
fn test_applications_are_most_recent_first() {
    let mut db = Database::open_in_memory().unwrap();
    let mut tracker = Tracker::new(&mut db);

    let older = tracker
        .record_application(draft("Engineer", "Acme", "a@example.com", "2024-01-01", ApplicationStatus::Applied))
        .unwrap();
    let newer = tracker
        .record_application(draft("Analyst", "Globex", "a@example.com", "2024-03-10", ApplicationStatus::Applied))
        .unwrap();
    let middle = tracker
        .record_application(draft("Designer", "Initech", "a@example.com", "2024-02-01", ApplicationStatus::Applied))
        .unwrap();

    let ids: Vec<i64> = tracker.applications().unwrap().iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![newer, middle, older]);
}

#[test]
fn test_undated_applications_sort_last() {
    let mut db = Database::open_in_memory().unwrap();
    let mut tracker = Tracker::new(&mut db);

    let company = tracker.add_company(NewCompany::new("Acme")).unwrap();
    let job = tracker
        .add_job(NewJob { company_id: company, title: "Engineer".into(), deadline: None }, &[])
        .unwrap();
    let ada = tracker.add_applicant(NewApplicant::new("Ada", "ada@example.com"), &[]).unwrap();
    let bob = tracker.add_applicant(NewApplicant::new("Bob", "bob@example.com"), &[]).unwrap();

    let undated = tracker.apply(NewApplication::new(ada, job)).unwrap();
    let dated = tracker
        .apply(NewApplication {
            date_applied: Some(date("2024-01-01")),
            ..NewApplication::new(bob, job)
        })
        .unwrap();

    let ids: Vec<i64> = tracker.applications().unwrap().iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![dated, undated]);
}

#[test]
fn test_record_application_reuses_existing_rows() {
    let mut db = Database::open_in_memory().unwrap();
    let mut tracker = Tracker::new(&mut db);

    tracker
        .record_application(draft("Engineer", "Acme", "ada@example.com", "2024-01-01", ApplicationStatus::Applied))
        .unwrap();
    tracker
        .record_application(draft("Analyst", "ACME", "ADA@example.com", "2024-01-02", ApplicationStatus::Applied))
        .unwrap();
    tracker
        .record_application(draft("engineer", "acme", "bob@example.com", "2024-01-03", ApplicationStatus::Applied))
        .unwrap();

    assert_eq!(tracker.companies().unwrap().len(), 1);
    assert_eq!(tracker.jobs().unwrap().len(), 2);
    assert_eq!(tracker.applicants().unwrap().len(), 2);
}

// ========== UPDATE / DELETE ==========

#[test]
fn test_update_status_changes_only_status() {
    let mut db = Database::open_in_memory().unwrap();
    let mut tracker = Tracker::new(&mut db);

    let id = tracker
        .record_application(draft("Engineer", "Acme", "ada@example.com", "2024-01-01", ApplicationStatus::Applied))
        .unwrap();
    let before = tracker.find_application(id).unwrap().unwrap();

    assert!(tracker.update_status(id, ApplicationStatus::Offer).unwrap());

    let after = tracker.find_application(id).unwrap().unwrap();
    assert_eq!(after.status, ApplicationStatus::Offer);
    assert_eq!(after.job_title, before.job_title);
    assert_eq!(after.company_name, before.company_name);
    assert_eq!(after.date_applied, before.date_applied);
    assert_eq!(after.notes, before.notes);
    assert_eq!(after.created_at, before.created_at);
}

#[test]
fn test_update_unknown_id_leaves_store_unchanged() {
    let mut db = Database::open_in_memory().unwrap();
    let mut tracker = Tracker::new(&mut db);

    tracker
        .record_application(draft("Engineer", "Acme", "ada@example.com", "2024-01-01", ApplicationStatus::Applied))
        .unwrap();
    let before = tracker.applications().unwrap();

    assert!(!tracker.update_status(999, ApplicationStatus::Rejected).unwrap());
    assert_eq!(tracker.applications().unwrap(), before);
}

#[test]
fn test_delete_application() {
    let mut db = Database::open_in_memory().unwrap();
    let mut tracker = Tracker::new(&mut db);

    let id = tracker
        .record_application(draft("Engineer", "Acme", "ada@example.com", "2024-01-01", ApplicationStatus::Applied))
        .unwrap();

    assert!(tracker.delete_application(id).unwrap());
    assert!(tracker.applications().unwrap().is_empty());
    assert!(tracker.find_application(id).unwrap().is_none());
    assert!(!tracker.delete_application(id).unwrap());
}

#[test]
fn test_delete_company_cascades_to_jobs_and_applications() {
    let mut db = Database::open_in_memory().unwrap();
    let mut tracker = Tracker::new(&mut db);

    tracker
        .record_application(draft("Engineer", "Acme", "ada@example.com", "2024-01-01", ApplicationStatus::Applied))
        .unwrap();
    tracker
        .record_application(draft("Analyst", "Globex", "ada@example.com", "2024-01-02", ApplicationStatus::Applied))
        .unwrap();
    let acme = tracker.companies().unwrap().into_iter().find(|c| c.name == "Acme").unwrap();

    assert!(tracker.delete_company(acme.id).unwrap());

    let jobs = tracker.jobs().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].company_name, "Globex");
    let apps = tracker.applications().unwrap();
    assert_eq!(apps.len(), 1);
    assert_eq!(apps[0].company_name, "Globex");
    // The applicant is not a dependent of the company.
    assert_eq!(tracker.applicants().unwrap().len(), 1);
}

#[test]
fn test_delete_applicant_cascades_to_applications_and_skill_links() {
    let mut db = Database::open_in_memory().unwrap();
    let mut tracker = Tracker::new(&mut db);

    let applicant = tracker
        .add_applicant(NewApplicant::new("Ada", "ada@example.com"), &["Rust".into()])
        .unwrap();
    let company = tracker.add_company(NewCompany::new("Acme")).unwrap();
    let job = tracker
        .add_job(NewJob { company_id: company, title: "Engineer".into(), deadline: None }, &[])
        .unwrap();
    tracker.apply(NewApplication::new(applicant, job)).unwrap();

    assert!(tracker.delete_applicant(applicant).unwrap());
    assert!(tracker.applications().unwrap().is_empty());
    assert!(tracker.export().unwrap().applicant_skills.is_empty());
    // Skills themselves survive.
    assert_eq!(tracker.skills().unwrap().len(), 1);
}

#[test]
fn test_delete_job_cascades_to_applications() {
    let mut db = Database::open_in_memory().unwrap();
    let mut tracker = Tracker::new(&mut db);

    let id = tracker
        .record_application(draft("Engineer", "Acme", "ada@example.com", "2024-01-01", ApplicationStatus::Applied))
        .unwrap();
    let job_id = tracker.find_application(id).unwrap().unwrap().job_id;

    assert!(tracker.delete_job(job_id).unwrap());
    assert!(tracker.applications().unwrap().is_empty());
    assert_eq!(tracker.companies().unwrap().len(), 1);
}

// ========== SEARCH ==========

#[test]
fn test_search_matches_title_or_company_case_insensitively() {
    let mut db = Database::open_in_memory().unwrap();
    let mut tracker = Tracker::new(&mut db);

    let by_title = tracker
        .record_application(draft("Backend Engineer", "Globex", "a@example.com", "2024-01-01", ApplicationStatus::Applied))
        .unwrap();
    let by_company = tracker
        .record_application(draft("Analyst", "Engineering Partners", "a@example.com", "2024-02-01", ApplicationStatus::Applied))
        .unwrap();
    tracker
        .record_application(draft("Designer", "Initech", "a@example.com", "2024-03-01", ApplicationStatus::Applied))
        .unwrap();

    let ids: Vec<i64> = tracker.search("ENGINEER").unwrap().iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![by_company, by_title]);

    assert!(tracker.search("nothing-here").unwrap().is_empty());
}

#[test]
fn test_search_treats_wildcards_literally() {
    let mut db = Database::open_in_memory().unwrap();
    let mut tracker = Tracker::new(&mut db);

    tracker
        .record_application(draft("Engineer", "Acme", "a@example.com", "2024-01-01", ApplicationStatus::Applied))
        .unwrap();
    let literal = tracker
        .record_application(draft("100% Remote", "Acme", "a@example.com", "2024-01-02", ApplicationStatus::Applied))
        .unwrap();

    let ids: Vec<i64> = tracker.search("%").unwrap().iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![literal]);
    assert!(tracker.search("_").unwrap().is_empty());
}

#[test]
fn test_blank_search_term_is_rejected() {
    let mut db = Database::open_in_memory().unwrap();
    let tracker = Tracker::new(&mut db);
    assert!(matches!(tracker.search("   "), Err(Error::Validation(_))));
}

// ========== REPORT ==========

#[test]
fn test_company_stats_example() {
    let mut db = Database::open_in_memory().unwrap();
    let mut tracker = Tracker::new(&mut db);

    tracker
        .record_application(draft("Engineer", "Acme", "ada@example.com", "2024-01-01", ApplicationStatus::Applied))
        .unwrap();
    tracker
        .record_application(draft("Engineer", "Acme", "bob@example.com", "2024-01-05", ApplicationStatus::Interviewing))
        .unwrap();

    let stats = tracker.company_stats().unwrap();
    assert_eq!(stats.len(), 1);
    let acme = &stats[0];
    assert_eq!(acme.company, "Acme");
    assert_eq!(acme.total, 2);
    assert_eq!(acme.count(ApplicationStatus::Applied), 1);
    assert_eq!(acme.count(ApplicationStatus::Interviewing), 1);
    assert_eq!(acme.count(ApplicationStatus::Offer), 0);
    assert_eq!(acme.count(ApplicationStatus::Rejected), 0);
    assert_eq!(acme.count(ApplicationStatus::Accepted), 0);
    assert_eq!(acme.count(ApplicationStatus::Withdrawn), 0);
}

#[test]
fn test_company_stats_totals_match_application_counts() {
    let mut db = Database::open_in_memory().unwrap();
    let mut tracker = Tracker::new(&mut db);

    let rows = [
        ("Engineer", "Acme", "a@example.com", ApplicationStatus::Applied),
        ("Analyst", "Acme", "a@example.com", ApplicationStatus::Rejected),
        ("Designer", "Acme", "a@example.com", ApplicationStatus::Offer),
        ("Engineer", "Globex", "a@example.com", ApplicationStatus::Withdrawn),
        ("Engineer", "Globex", "b@example.com", ApplicationStatus::Withdrawn),
        ("Engineer", "Initech", "a@example.com", ApplicationStatus::Accepted),
    ];
    for (title, company, email, status) in rows {
        tracker
            .record_application(draft(title, company, email, "2024-01-01", status))
            .unwrap();
    }
    // A company without applications does not appear.
    tracker.add_company(NewCompany::new("Hooli")).unwrap();

    let stats = tracker.company_stats().unwrap();
    let names: Vec<&str> = stats.iter().map(|s| s.company.as_str()).collect();
    assert_eq!(names, ["Acme", "Globex", "Initech"]);

    let apps = tracker.applications().unwrap();
    for company in &stats {
        let expected = apps.iter().filter(|a| a.company_name == company.company).count() as u32;
        assert_eq!(company.total, expected);
        assert_eq!(company.by_status.iter().sum::<u32>(), company.total);
    }
    assert_eq!(stats[1].count(ApplicationStatus::Withdrawn), 2);
}

#[test]
fn test_company_stats_empty_store() {
    let mut db = Database::open_in_memory().unwrap();
    let tracker = Tracker::new(&mut db);
    assert!(tracker.company_stats().unwrap().is_empty());
}

// ========== VALIDATION / CONSTRAINTS ==========

#[test]
fn test_invalid_email_rejected_before_persistence() {
    let mut db = Database::open_in_memory().unwrap();
    let mut tracker = Tracker::new(&mut db);

    let err = tracker
        .add_applicant(NewApplicant::new("Ada", "not-an-email"), &[])
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(tracker.applicants().unwrap().is_empty());
}

#[test]
fn test_emails_are_normalized_and_unique() {
    let mut db = Database::open_in_memory().unwrap();
    let mut tracker = Tracker::new(&mut db);

    tracker
        .add_applicant(NewApplicant::new("Ada", " Ada@Example.com "), &[])
        .unwrap();
    assert_eq!(tracker.applicants().unwrap()[0].email, "ada@example.com");

    let err = tracker
        .add_applicant(NewApplicant::new("Ada Again", "ada@example.com"), &[])
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[test]
fn test_empty_names_rejected() {
    let mut db = Database::open_in_memory().unwrap();
    let mut tracker = Tracker::new(&mut db);

    assert!(matches!(
        tracker.add_company(NewCompany::new("   ")),
        Err(Error::Validation(_))
    ));
    let company = tracker.add_company(NewCompany::new("Acme")).unwrap();
    assert!(matches!(
        tracker.add_job(NewJob { company_id: company, title: " ".into(), deadline: None }, &[]),
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        tracker.add_applicant(NewApplicant::new("", "ada@example.com"), &[]),
        Err(Error::Validation(_))
    ));
    assert!(matches!(tracker.add_skill("  "), Err(Error::Validation(_))));
}

#[test]
fn test_same_applicant_cannot_apply_twice() {
    let mut db = Database::open_in_memory().unwrap();
    let mut tracker = Tracker::new(&mut db);

    let company = tracker.add_company(NewCompany::new("Acme")).unwrap();
    let job = tracker
        .add_job(NewJob { company_id: company, title: "Engineer".into(), deadline: None }, &[])
        .unwrap();
    let applicant = tracker.add_applicant(NewApplicant::new("Ada", "ada@example.com"), &[]).unwrap();

    tracker.apply(NewApplication::new(applicant, job)).unwrap();
    let err = tracker.apply(NewApplication::new(applicant, job)).unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    assert_eq!(tracker.applications().unwrap().len(), 1);
}

#[test]
fn test_failed_record_application_writes_nothing() {
    let mut db = Database::open_in_memory().unwrap();
    let mut tracker = Tracker::new(&mut db);

    tracker
        .record_application(draft("Engineer", "Acme", "ada@example.com", "2024-01-01", ApplicationStatus::Applied))
        .unwrap();
    // Same applicant and job under a different spelling of the company.
    let err = tracker
        .record_application(draft("Engineer", "acme", "ada@example.com", "2024-02-01", ApplicationStatus::Offer))
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    assert_eq!(tracker.applications().unwrap().len(), 1);
    assert_eq!(tracker.applications().unwrap()[0].status, ApplicationStatus::Applied);
}

#[test]
fn test_apply_with_unknown_ids_is_not_found() {
    let mut db = Database::open_in_memory().unwrap();
    let mut tracker = Tracker::new(&mut db);

    let applicant = tracker.add_applicant(NewApplicant::new("Ada", "ada@example.com"), &[]).unwrap();
    let err = tracker.apply(NewApplication::new(applicant, 404)).unwrap_err();
    assert!(matches!(err, Error::NotFound { entity: "job", id: 404 }));

    let err = tracker.apply(NewApplication::new(505, 404)).unwrap_err();
    assert!(matches!(err, Error::NotFound { entity: "applicant", id: 505 }));
}

// ========== SKILLS ==========

#[test]
fn test_skills_are_lowercased_and_shared() {
    let mut db = Database::open_in_memory().unwrap();
    let mut tracker = Tracker::new(&mut db);

    let applicant = tracker
        .add_applicant(
            NewApplicant::new("Ada", "ada@example.com"),
            &["Rust".into(), "SQL".into(), "rust".into()],
        )
        .unwrap();
    let company = tracker.add_company(NewCompany::new("Acme")).unwrap();
    let job = tracker
        .add_job(
            NewJob { company_id: company, title: "Engineer".into(), deadline: Some(date("2024-06-30")) },
            &[" RUST ".into()],
        )
        .unwrap();
    tracker.link_job_skill(job, "Python").unwrap();
    tracker.link_job_skill(job, "python").unwrap();

    let skill_names = |skills: Vec<apptrack::models::Skill>| -> Vec<String> {
        skills.into_iter().map(|s| s.name).collect()
    };
    assert_eq!(skill_names(tracker.skills().unwrap()), ["python", "rust", "sql"]);
    assert_eq!(skill_names(tracker.applicant_skills(applicant).unwrap()), ["rust", "sql"]);
    assert_eq!(skill_names(tracker.job_skills(job).unwrap()), ["python", "rust"]);
}

#[test]
fn test_link_skill_to_unknown_owner() {
    let mut db = Database::open_in_memory().unwrap();
    let mut tracker = Tracker::new(&mut db);

    let err = tracker.link_applicant_skill(9, "rust").unwrap_err();
    assert!(matches!(err, Error::NotFound { entity: "applicant", id: 9 }));
    // The skill was not left behind.
    assert!(tracker.skills().unwrap().is_empty());
}

#[test]
fn test_delete_skill_unlinks_it() {
    let mut db = Database::open_in_memory().unwrap();
    let mut tracker = Tracker::new(&mut db);

    let applicant = tracker
        .add_applicant(NewApplicant::new("Ada", "ada@example.com"), &["rust".into()])
        .unwrap();
    let skill = tracker.skills().unwrap()[0].id;

    assert!(tracker.delete_skill(skill).unwrap());
    assert!(tracker.applicant_skills(applicant).unwrap().is_empty());
    assert!(!tracker.delete_skill(skill).unwrap());
}

// ========== EXPORT / PERSISTENCE ==========

#[test]
fn test_export_serializes_every_table() {
    let mut db = Database::open_in_memory().unwrap();
    let mut tracker = Tracker::new(&mut db);

    let id = tracker
        .record_application(ApplicationDraft {
            notes: Some("Referred by Bob".into()),
            ..draft("Engineer", "Acme", "ada@example.com", "2024-01-01", ApplicationStatus::Interviewing)
        })
        .unwrap();

    let snapshot = tracker.export().unwrap();
    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["companies"][0]["name"], "Acme");
    assert_eq!(json["applications"][0]["id"], id);
    assert_eq!(json["applications"][0]["status"], "interviewing");
    assert_eq!(json["applications"][0]["date_applied"], "2024-01-01");
    assert_eq!(json["applications"][0]["notes"], "Referred by Bob");
}

#[test]
fn test_file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("apptrack.db");

    {
        let mut db = Database::open(&path).unwrap();
        let mut tracker = Tracker::new(&mut db);
        tracker
            .record_application(draft("Engineer", "Acme", "ada@example.com", "2024-01-01", ApplicationStatus::Applied))
            .unwrap();
        db.close().unwrap();
    }

    // Schema creation runs again on open and must not disturb existing rows.
    let mut db = Database::open(&path).unwrap();
    assert_eq!(db.path(), Some(path.as_path()));
    let tracker = Tracker::new(&mut db);
    let apps = tracker.applications().unwrap();
    assert_eq!(apps.len(), 1);
    assert_eq!(apps[0].company_name, "Acme");
}
