//! Numbered, line-based menu over the tracker.

use std::io::{BufRead, Write};

use anyhow::Result;
use chrono::NaiveDate;
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};

use crate::display::{application_block, stats_block};
use crate::error::Error;
use crate::models::{normalize_email, parse_date, ApplicationDraft, ApplicationStatus, JobApplication};
use crate::tracker::{today, Tracker};

const MENU_ITEMS: [&str; 7] = [
    "Add a new application",
    "View all applications",
    "Update application status",
    "Delete an application",
    "Search applications",
    "View companies",
    "Exit",
];

/// Stdin reached EOF; the menu stops as if Exit was chosen.
#[derive(Debug, thiserror::Error)]
#[error("input closed")]
struct InputClosed;

pub struct Console<'t, 'db, R, W> {
    tracker: &'t mut Tracker<'db>,
    input: R,
    out: W,
    clear_screen: bool,
}

impl<'t, 'db, R: BufRead, W: Write> Console<'t, 'db, R, W> {
    pub fn new(tracker: &'t mut Tracker<'db>, input: R, out: W) -> Self {
        Self {
            tracker,
            input,
            out,
            clear_screen: false,
        }
    }

    /// Clear the terminal between screens. Only useful on a real tty.
    pub fn with_clear_screen(mut self, clear: bool) -> Self {
        self.clear_screen = clear;
        self
    }

    pub fn run(&mut self) -> Result<()> {
        loop {
            self.display_menu()?;
            let choice = match self.read_line(&format!("\nEnter your choice (1-{}): ", MENU_ITEMS.len())) {
                Ok(choice) => choice,
                Err(e) if e.is::<InputClosed>() => break,
                Err(e) => return Err(e),
            };

            let outcome = match choice.as_str() {
                "1" => self.add_application(),
                "2" => self.view_applications(),
                "3" => self.update_application(),
                "4" => self.delete_application(),
                "5" => self.search_applications(),
                "6" => self.view_companies(),
                "7" => {
                    writeln!(self.out, "Goodbye!")?;
                    break;
                }
                _ => {
                    writeln!(
                        self.out,
                        "Invalid choice. Please enter a number between 1 and {}.",
                        MENU_ITEMS.len()
                    )?;
                    self.press_enter_to_continue()
                }
            };

            match outcome {
                Ok(()) => {}
                Err(e) if e.is::<InputClosed>() => break,
                Err(e) => match e.downcast_ref::<Error>() {
                    Some(err) if err.is_user_facing() => {
                        writeln!(self.out, "\nError: {}", err)?;
                        if let Err(e) = self.press_enter_to_continue() {
                            if e.is::<InputClosed>() {
                                break;
                            }
                            return Err(e);
                        }
                    }
                    _ => return Err(e),
                },
            }
        }
        self.out.flush()?;
        Ok(())
    }

    // --- Screens ---

    fn add_application(&mut self) -> Result<()> {
        self.screen("Add New Job Application")?;

        let job_title = self.prompt_required("Job Title: ")?;
        let company = self.prompt_required("Company: ")?;
        let applicant_name = self.prompt_required("Your Name: ")?;
        let applicant_email = self.prompt_email("Your Email: ")?;
        let date_applied = self
            .prompt_date("Application Date (YYYY-MM-DD, today if blank): ", true)?
            .unwrap_or_else(today);
        let status = self.prompt_status("Select status:")?;
        let deadline = self.prompt_date("Deadline (YYYY-MM-DD, optional): ", true)?;
        let notes = self.read_line("Notes (optional): ")?;

        let id = self.tracker.record_application(ApplicationDraft {
            job_title: job_title.clone(),
            company: company.clone(),
            applicant_name,
            applicant_email,
            status,
            date_applied: Some(date_applied),
            deadline,
            notes: Some(notes),
        })?;
        writeln!(
            self.out,
            "\nApplication for {} at {} added successfully (ID: {})!",
            job_title, company, id
        )?;
        self.press_enter_to_continue()
    }

    fn view_applications(&mut self) -> Result<()> {
        self.screen("All Job Applications")?;
        let applications = self.tracker.applications()?;
        self.display_applications(&applications)
    }

    fn update_application(&mut self) -> Result<()> {
        self.screen("Update Application Status")?;
        if !self.list_current(true)? {
            return Ok(());
        }

        let id = self.prompt_id("\nEnter the ID of the application to update: ")?;
        let status = self.prompt_status("Select new status:")?;

        if self.tracker.update_status(id, status)? {
            writeln!(self.out, "Application status updated successfully!")?;
        } else {
            writeln!(self.out, "No application found with ID {}.", id)?;
        }
        self.press_enter_to_continue()
    }

    fn delete_application(&mut self) -> Result<()> {
        self.screen("Delete Application")?;
        if !self.list_current(false)? {
            return Ok(());
        }

        let id = self.prompt_id("\nEnter the ID of the application to delete: ")?;
        let confirm = self.read_line(&format!(
            "Are you sure you want to delete application {}? (y/N): ",
            id
        ))?;
        if !confirm.eq_ignore_ascii_case("y") {
            writeln!(self.out, "Deletion cancelled.")?;
            return self.press_enter_to_continue();
        }

        if self.tracker.delete_application(id)? {
            writeln!(self.out, "Application deleted successfully!")?;
        } else {
            writeln!(self.out, "No application found with ID {}.", id)?;
        }
        self.press_enter_to_continue()
    }

    fn search_applications(&mut self) -> Result<()> {
        self.screen("Search Applications")?;
        let term = self.read_line("Enter company name or job title to search for: ")?;
        if term.is_empty() {
            writeln!(self.out, "Please enter a search term.")?;
            return self.press_enter_to_continue();
        }

        let applications = self.tracker.search(&term)?;
        self.screen(&format!("Search Results for '{}'", term))?;
        self.display_applications(&applications)
    }

    fn view_companies(&mut self) -> Result<()> {
        self.screen("Company Statistics")?;
        let stats = self.tracker.company_stats()?;
        if stats.is_empty() {
            writeln!(self.out, "No company data found.")?;
        }
        for company in &stats {
            writeln!(self.out, "{}", stats_block(company))?;
        }
        self.press_enter_to_continue()
    }

    // --- Output helpers ---

    fn display_menu(&mut self) -> Result<()> {
        self.clear()?;
        writeln!(self.out, "{}", "=".repeat(50))?;
        writeln!(self.out, "      JOB APPLICATION TRACKER")?;
        writeln!(self.out, "{}", "=".repeat(50))?;
        for (i, item) in MENU_ITEMS.iter().enumerate() {
            writeln!(self.out, "{}. {}", i + 1, item)?;
        }
        writeln!(self.out, "{}", "=".repeat(50))?;
        Ok(())
    }

    fn screen(&mut self, title: &str) -> Result<()> {
        self.clear()?;
        writeln!(self.out, "=== {} ===\n", title)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        if self.clear_screen {
            execute!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        Ok(())
    }

    fn display_applications(&mut self, applications: &[JobApplication]) -> Result<()> {
        if applications.is_empty() {
            writeln!(self.out, "No applications found.")?;
        }
        for app in applications {
            writeln!(self.out, "{}", application_block(app))?;
        }
        self.press_enter_to_continue()
    }

    /// Print a one-line summary per application; `false` when there are none.
    fn list_current(&mut self, with_status: bool) -> Result<bool> {
        let applications = self.tracker.applications()?;
        if applications.is_empty() {
            writeln!(self.out, "No applications found.")?;
            self.press_enter_to_continue()?;
            return Ok(false);
        }

        writeln!(self.out, "Current Applications:\n")?;
        for app in &applications {
            if with_status {
                writeln!(
                    self.out,
                    "{}. {} at {} - Current Status: {}",
                    app.id, app.job_title, app.company_name, app.status
                )?;
            } else {
                writeln!(self.out, "{}. {} at {}", app.id, app.job_title, app.company_name)?;
            }
        }
        Ok(true)
    }

    // --- Input helpers ---

    fn read_line(&mut self, prompt: &str) -> Result<String> {
        write!(self.out, "{}", prompt)?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(InputClosed.into());
        }
        Ok(line.trim().to_string())
    }

    fn press_enter_to_continue(&mut self) -> Result<()> {
        self.read_line("\nPress Enter to continue...")?;
        Ok(())
    }

    fn prompt_required(&mut self, prompt: &str) -> Result<String> {
        loop {
            let value = self.read_line(prompt)?;
            if !value.is_empty() {
                return Ok(value);
            }
            writeln!(self.out, "This field is required.")?;
        }
    }

    fn prompt_email(&mut self, prompt: &str) -> Result<String> {
        loop {
            let value = self.read_line(prompt)?;
            match normalize_email(&value) {
                Ok(email) => return Ok(email),
                Err(e) => writeln!(self.out, "{}", e)?,
            }
        }
    }

    fn prompt_date(&mut self, prompt: &str, allow_blank: bool) -> Result<Option<NaiveDate>> {
        loop {
            let value = self.read_line(prompt)?;
            if value.is_empty() {
                if allow_blank {
                    return Ok(None);
                }
                writeln!(self.out, "This field is required.")?;
                continue;
            }
            match parse_date(&value) {
                Ok(date) => return Ok(Some(date)),
                Err(_) => writeln!(self.out, "Invalid date format. Please use YYYY-MM-DD.")?,
            }
        }
    }

    fn prompt_option(&mut self, prompt: &str, options: &[&str]) -> Result<usize> {
        loop {
            writeln!(self.out, "{}", prompt)?;
            for (i, option) in options.iter().enumerate() {
                writeln!(self.out, "{}. {}", i + 1, option)?;
            }
            let value = self.read_line("\nEnter your choice: ")?;
            match value.parse::<usize>() {
                Ok(choice) if (1..=options.len()).contains(&choice) => return Ok(choice - 1),
                Ok(_) => writeln!(
                    self.out,
                    "Please enter a number between 1 and {}.",
                    options.len()
                )?,
                Err(_) => writeln!(self.out, "Please enter a valid number.")?,
            }
        }
    }

    fn prompt_status(&mut self, prompt: &str) -> Result<ApplicationStatus> {
        let labels = ApplicationStatus::ALL.map(ApplicationStatus::label);
        let index = self.prompt_option(prompt, &labels)?;
        Ok(ApplicationStatus::ALL[index])
    }

    fn prompt_id(&mut self, prompt: &str) -> Result<i64> {
        loop {
            let value = self.read_line(prompt)?;
            match value.parse::<i64>() {
                Ok(id) => return Ok(id),
                Err(_) => writeln!(self.out, "Please enter a valid number.")?,
            }
        }
    }
}
