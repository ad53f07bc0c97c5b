use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result};
use apptrack::console::Console;
use apptrack::display::{
    application_block, application_table_header, application_table_row, date_or, stats_block,
    truncate,
};
use apptrack::models::{parse_date, ApplicationDraft, NewApplicant, NewApplication, NewCompany, NewJob};
use apptrack::{tui, ApplicationStatus, Database, Tracker};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "apptrack")]
#[command(about = "Track job applications, companies, applicants and skills")]
struct Cli {
    /// Path to the database file (defaults to the platform data directory)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Runs the interactive menu when omitted
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database if it does not exist
    Init,

    /// Interactive numbered menu
    Menu,

    /// Record an application, creating the company, job and applicant as needed
    Add {
        /// Job title
        title: String,

        /// Company name
        company: String,

        /// Applicant name
        #[arg(short, long)]
        name: String,

        /// Applicant email
        #[arg(short, long)]
        email: String,

        /// Status (applied, interviewing, offer, rejected, accepted, withdrawn)
        #[arg(short, long, default_value = "applied")]
        status: ApplicationStatus,

        /// Date applied, YYYY-MM-DD (defaults to today)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        /// Job deadline, YYYY-MM-DD
        #[arg(long, value_parser = parse_date)]
        deadline: Option<NaiveDate>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Apply an existing applicant to an existing job
    Apply {
        /// Applicant ID
        #[arg(short, long)]
        applicant: i64,

        /// Job ID
        #[arg(short, long)]
        job: i64,

        #[arg(short, long, default_value = "applied")]
        status: ApplicationStatus,

        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// List applications, most recent first
    List {
        /// Only show applications with this status
        #[arg(short, long)]
        status: Option<ApplicationStatus>,
    },

    /// Show application details
    Show {
        /// Application ID
        id: i64,
    },

    /// Change an application's status
    Status {
        /// Application ID
        id: i64,

        /// New status
        status: ApplicationStatus,
    },

    /// Delete an application
    Delete {
        /// Application ID
        id: i64,
    },

    /// Search applications by job title or company name
    Search {
        term: String,
    },

    /// Application counts per company, by status
    Companies,

    /// Browse applications in a full-screen view
    Browse {
        /// Only show applications with this status
        #[arg(short, long)]
        status: Option<ApplicationStatus>,
    },

    /// Dump every table as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage companies
    Company {
        #[command(subcommand)]
        command: CompanyCommands,
    },

    /// Manage job postings
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },

    /// Manage applicants
    Applicant {
        #[command(subcommand)]
        command: ApplicantCommands,
    },

    /// Manage skills
    Skill {
        #[command(subcommand)]
        command: SkillCommands,
    },
}

#[derive(Subcommand)]
enum CompanyCommands {
    /// Add a company
    Add {
        name: String,

        #[arg(short, long)]
        industry: Option<String>,

        #[arg(short, long)]
        location: Option<String>,
    },

    /// List companies
    List,

    /// Show a company and its jobs
    Show {
        /// Company ID
        id: i64,
    },

    /// Delete a company with its jobs and their applications
    Delete {
        /// Company ID
        id: i64,
    },
}

#[derive(Subcommand)]
enum JobCommands {
    /// Add a job posting
    Add {
        title: String,

        /// Company ID
        #[arg(short, long)]
        company: i64,

        /// Deadline, YYYY-MM-DD
        #[arg(long, value_parser = parse_date)]
        deadline: Option<NaiveDate>,

        /// Required skill (repeatable)
        #[arg(short, long = "skill")]
        skills: Vec<String>,
    },

    /// List job postings
    List,

    /// Link a required skill to a job
    Skill {
        /// Job ID
        id: i64,

        skill: String,
    },

    /// Delete a job and its applications
    Delete {
        /// Job ID
        id: i64,
    },
}

#[derive(Subcommand)]
enum ApplicantCommands {
    /// Add an applicant
    Add {
        name: String,

        email: String,

        /// Skill (repeatable)
        #[arg(short, long = "skill")]
        skills: Vec<String>,
    },

    /// List applicants
    List,

    /// Link a skill to an applicant
    Skill {
        /// Applicant ID
        id: i64,

        skill: String,
    },

    /// Delete an applicant and their applications
    Delete {
        /// Applicant ID
        id: i64,
    },
}

#[derive(Subcommand)]
enum SkillCommands {
    /// List skills
    List,

    /// Delete a skill and unlink it everywhere
    Delete {
        /// Skill ID
        id: i64,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("apptrack=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let path = cli.database.unwrap_or_else(Database::default_path);
    let mut db = Database::open(&path)
        .with_context(|| format!("Failed to open database at {}", path.display()))?;

    run(&mut db, cli.command)?;

    db.close()?;
    Ok(())
}

fn run(db: &mut Database, command: Option<Commands>) -> Result<()> {
    let db_path = db.path().map(|p| p.display().to_string()).unwrap_or_default();
    let mut tracker = Tracker::new(db);

    let Some(command) = command else {
        let stdin = io::stdin();
        let interactive = stdin.is_terminal();
        return Console::new(&mut tracker, stdin.lock(), io::stdout())
            .with_clear_screen(interactive)
            .run();
    };

    match command {
        Commands::Init => {
            println!("Database ready at {}", db_path);
        }

        Commands::Menu => {
            let stdin = io::stdin();
            let interactive = stdin.is_terminal();
            Console::new(&mut tracker, stdin.lock(), io::stdout())
                .with_clear_screen(interactive)
                .run()?;
        }

        Commands::Add {
            title,
            company,
            name,
            email,
            status,
            date,
            deadline,
            notes,
        } => {
            let id = tracker.record_application(ApplicationDraft {
                job_title: title.clone(),
                company: company.clone(),
                applicant_name: name,
                applicant_email: email,
                status,
                date_applied: Some(date.unwrap_or_else(apptrack::tracker::today)),
                deadline,
                notes,
            })?;
            println!("Added application #{} for {} at {}", id, title, company);
        }

        Commands::Apply {
            applicant,
            job,
            status,
            date,
            notes,
        } => {
            let id = tracker.apply(NewApplication {
                applicant_id: applicant,
                job_id: job,
                status,
                date_applied: Some(date.unwrap_or_else(apptrack::tracker::today)),
                notes,
            })?;
            println!("Added application #{}", id);
        }

        Commands::List { status } => {
            let applications: Vec<_> = tracker
                .applications()?
                .into_iter()
                .filter(|app| status.is_none_or(|s| app.status == s))
                .collect();
            if applications.is_empty() {
                println!("No applications found.");
            } else {
                println!("{}", application_table_header());
                for app in &applications {
                    println!("{}", application_table_row(app));
                }
            }
        }

        Commands::Show { id } => match tracker.find_application(id)? {
            Some(app) => {
                println!("{}", application_block(&app));
                let skills = tracker.job_skills(app.job_id)?;
                if !skills.is_empty() {
                    let names: Vec<&str> = skills.iter().map(|s| s.name.as_str()).collect();
                    println!("Skills: {}", names.join(", "));
                }
                println!("Created: {}", app.created_at);
                println!("Updated: {}", app.updated_at);
            }
            None => {
                println!("Application #{} not found.", id);
            }
        },

        Commands::Status { id, status } => {
            if tracker.update_status(id, status)? {
                println!("Application #{} is now {}.", id, status);
            } else {
                println!("No application found with ID {}.", id);
            }
        }

        Commands::Delete { id } => {
            if tracker.delete_application(id)? {
                println!("Deleted application #{}.", id);
            } else {
                println!("No application found with ID {}.", id);
            }
        }

        Commands::Search { term } => {
            let applications = tracker.search(&term)?;
            if applications.is_empty() {
                println!("No applications found.");
            } else {
                println!("{}", application_table_header());
                for app in &applications {
                    println!("{}", application_table_row(app));
                }
            }
        }

        Commands::Companies => {
            let stats = tracker.company_stats()?;
            if stats.is_empty() {
                println!("No company data found.");
            }
            for company in &stats {
                println!("{}", stats_block(company));
            }
        }

        Commands::Browse { status } => {
            tui::run_browse(&mut tracker, status)?;
        }

        Commands::Export { output } => {
            let snapshot = tracker.export()?;
            let json = serde_json::to_string_pretty(&snapshot)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write to {}", path.display()))?;
                    println!("Exported to {}", path.display());
                }
                None => println!("{}", json),
            }
        }

        Commands::Company { command } => match command {
            CompanyCommands::Add {
                name,
                industry,
                location,
            } => {
                let id = tracker.add_company(NewCompany {
                    name: name.clone(),
                    industry,
                    location,
                })?;
                println!("Added company '{}' (ID: {})", name.trim(), id);
            }

            CompanyCommands::List => {
                let companies = tracker.companies()?;
                if companies.is_empty() {
                    println!("No companies found.");
                } else {
                    println!("{:<6} {:<28} {:<20} {:<20}", "ID", "NAME", "INDUSTRY", "LOCATION");
                    println!("{}", "-".repeat(76));
                    for company in companies {
                        println!(
                            "{:<6} {:<28} {:<20} {:<20}",
                            company.id,
                            truncate(&company.name, 26),
                            truncate(&company.industry.unwrap_or_default(), 18),
                            truncate(&company.location.unwrap_or_default(), 18)
                        );
                    }
                }
            }

            CompanyCommands::Show { id } => match tracker.company(id)? {
                Some(company) => {
                    println!("Company #{}", company.id);
                    println!("Name: {}", company.name);
                    if let Some(industry) = &company.industry {
                        println!("Industry: {}", industry);
                    }
                    if let Some(location) = &company.location {
                        println!("Location: {}", location);
                    }
                    let jobs = tracker.jobs_for_company(company.id)?;
                    if !jobs.is_empty() {
                        println!("\nJobs ({}):", jobs.len());
                        for job in jobs {
                            println!(
                                "  #{} - {} (deadline: {})",
                                job.id,
                                job.title,
                                date_or(job.deadline, "none")
                            );
                        }
                    }
                }
                None => {
                    println!("Company #{} not found.", id);
                }
            },

            CompanyCommands::Delete { id } => {
                if tracker.delete_company(id)? {
                    println!("Deleted company #{} with its jobs and applications.", id);
                } else {
                    println!("Company #{} not found.", id);
                }
            }
        },

        Commands::Job { command } => match command {
            JobCommands::Add {
                title,
                company,
                deadline,
                skills,
            } => {
                let id = tracker.add_job(
                    NewJob {
                        company_id: company,
                        title: title.clone(),
                        deadline,
                    },
                    &skills,
                )?;
                println!("Added job #{} '{}'", id, title.trim());
            }

            JobCommands::List => {
                let jobs = tracker.jobs()?;
                if jobs.is_empty() {
                    println!("No jobs found.");
                } else {
                    println!("{:<6} {:<30} {:<22} {:<11}", "ID", "TITLE", "COMPANY", "DEADLINE");
                    println!("{}", "-".repeat(72));
                    for job in jobs {
                        println!(
                            "{:<6} {:<30} {:<22} {:<11}",
                            job.id,
                            truncate(&job.title, 28),
                            truncate(&job.company_name, 20),
                            date_or(job.deadline, "-")
                        );
                    }
                }
            }

            JobCommands::Skill { id, skill } => {
                tracker.link_job_skill(id, &skill)?;
                println!("Linked skill '{}' to job #{}.", skill.trim().to_lowercase(), id);
            }

            JobCommands::Delete { id } => {
                if tracker.delete_job(id)? {
                    println!("Deleted job #{} with its applications.", id);
                } else {
                    println!("Job #{} not found.", id);
                }
            }
        },

        Commands::Applicant { command } => match command {
            ApplicantCommands::Add {
                name,
                email,
                skills,
            } => {
                let id = tracker.add_applicant(NewApplicant::new(name.clone(), email), &skills)?;
                println!("Added applicant '{}' (ID: {})", name.trim(), id);
            }

            ApplicantCommands::List => {
                let applicants = tracker.applicants()?;
                if applicants.is_empty() {
                    println!("No applicants found.");
                } else {
                    println!("{:<6} {:<24} {:<30} {:<20}", "ID", "NAME", "EMAIL", "SKILLS");
                    println!("{}", "-".repeat(82));
                    for applicant in applicants {
                        let skills = tracker.applicant_skills(applicant.id)?;
                        let names: Vec<&str> = skills.iter().map(|s| s.name.as_str()).collect();
                        println!(
                            "{:<6} {:<24} {:<30} {:<20}",
                            applicant.id,
                            truncate(&applicant.name, 22),
                            truncate(&applicant.email, 28),
                            truncate(&names.join(", "), 20)
                        );
                    }
                }
            }

            ApplicantCommands::Skill { id, skill } => {
                tracker.link_applicant_skill(id, &skill)?;
                println!(
                    "Linked skill '{}' to applicant #{}.",
                    skill.trim().to_lowercase(),
                    id
                );
            }

            ApplicantCommands::Delete { id } => {
                if tracker.delete_applicant(id)? {
                    println!("Deleted applicant #{} with their applications.", id);
                } else {
                    println!("Applicant #{} not found.", id);
                }
            }
        },

        Commands::Skill { command } => match command {
            SkillCommands::List => {
                let skills = tracker.skills()?;
                if skills.is_empty() {
                    println!("No skills found.");
                } else {
                    for skill in skills {
                        println!("{:<6} {}", skill.id, skill.name);
                    }
                }
            }

            SkillCommands::Delete { id } => {
                if tracker.delete_skill(id)? {
                    println!("Deleted skill #{}.", id);
                } else {
                    println!("Skill #{} not found.", id);
                }
            }
        },
    }

    Ok(())
}
