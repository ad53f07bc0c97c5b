use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;

use crate::display::{date_or, truncate};
use crate::models::{ApplicationStatus, JobApplication, Skill};
use crate::tracker::Tracker;

struct AppState {
    applications: Vec<JobApplication>,
    selected: usize,
    scroll_offset: u16,
    skills: Vec<Skill>,
}

impl AppState {
    fn new(applications: Vec<JobApplication>) -> Self {
        Self {
            applications,
            selected: 0,
            scroll_offset: 0,
            skills: Vec::new(),
        }
    }

    fn current(&self) -> Option<&JobApplication> {
        self.applications.get(self.selected)
    }

    fn load_skills(&mut self, tracker: &Tracker) {
        let Some(app) = self.current() else { return };
        self.skills = tracker.job_skills(app.job_id).unwrap_or_default();
    }

    fn next(&mut self) {
        if !self.applications.is_empty() && self.selected < self.applications.len() - 1 {
            self.selected += 1;
            self.scroll_offset = 0;
        }
    }

    fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.scroll_offset = 0;
        }
    }

    fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(3);
    }

    fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(3);
    }

    fn set_status(&mut self, tracker: &mut Tracker, status: ApplicationStatus) -> Result<()> {
        let Some(app) = self.applications.get_mut(self.selected) else {
            return Ok(());
        };
        if tracker.update_status(app.id, status)? {
            app.status = status;
        }
        Ok(())
    }
}

fn status_for_key(code: KeyCode) -> Option<ApplicationStatus> {
    match code {
        KeyCode::Char('a') => Some(ApplicationStatus::Applied),
        KeyCode::Char('i') => Some(ApplicationStatus::Interviewing),
        KeyCode::Char('o') => Some(ApplicationStatus::Offer),
        KeyCode::Char('x') => Some(ApplicationStatus::Rejected),
        KeyCode::Char('y') => Some(ApplicationStatus::Accepted),
        KeyCode::Char('w') => Some(ApplicationStatus::Withdrawn),
        _ => None,
    }
}

pub fn run_browse(tracker: &mut Tracker, status: Option<ApplicationStatus>) -> Result<()> {
    let applications: Vec<JobApplication> = tracker
        .applications()?
        .into_iter()
        .filter(|app| status.is_none_or(|s| app.status == s))
        .collect();
    if applications.is_empty() {
        println!("No applications found.");
        return Ok(());
    }

    let mut state = AppState::new(applications);
    state.load_skills(tracker);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state, tracker);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    tracker: &mut Tracker,
) -> Result<()> {
    let mut list_state = ListState::default();
    list_state.select(Some(0));

    loop {
        terminal.draw(|frame| draw(frame, state, &mut list_state))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let prev_selected = state.selected;
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Down | KeyCode::Char('j') => state.next(),
                KeyCode::Up | KeyCode::Char('k') => state.prev(),
                KeyCode::Char('J') | KeyCode::PageDown => state.scroll_down(),
                KeyCode::Char('K') | KeyCode::PageUp => state.scroll_up(),
                code => {
                    if let Some(status) = status_for_key(code) {
                        state.set_status(tracker, status)?;
                    }
                }
            }
            if state.selected != prev_selected {
                list_state.select(Some(state.selected));
                state.load_skills(tracker);
            }
        }
    }
    Ok(())
}

fn status_icon(status: ApplicationStatus) -> &'static str {
    match status {
        ApplicationStatus::Applied => " ",
        ApplicationStatus::Interviewing => "*",
        ApplicationStatus::Offer => "$",
        ApplicationStatus::Rejected => "x",
        ApplicationStatus::Accepted => "+",
        ApplicationStatus::Withdrawn => "-",
    }
}

fn status_style(status: ApplicationStatus) -> Style {
    match status {
        ApplicationStatus::Applied => Style::default().fg(Color::Cyan),
        ApplicationStatus::Interviewing => Style::default().fg(Color::Yellow),
        ApplicationStatus::Offer | ApplicationStatus::Accepted => Style::default().fg(Color::Green),
        ApplicationStatus::Rejected => Style::default().fg(Color::Red),
        ApplicationStatus::Withdrawn => Style::default().fg(Color::DarkGray),
    }
}

fn draw(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(frame.area());

    let items: Vec<ListItem> = state
        .applications
        .iter()
        .map(|app| {
            ListItem::new(format!(
                "{} #{:<4} {} | {}",
                status_icon(app.status),
                app.id,
                truncate(&app.job_title, 30),
                app.company_name
            ))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Applications ({}) ", state.applications.len())),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[0], list_state);

    let detail = build_detail(state);
    let detail_widget = Paragraph::new(detail)
        .block(Block::default().borders(Borders::ALL).title(" Detail "))
        .wrap(Wrap { trim: false })
        .scroll((state.scroll_offset, 0));

    frame.render_widget(detail_widget, chunks[1]);

    let help_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    let help = Paragraph::new(
        " j/k:navigate  J/K:scroll  a:applied i:interviewing o:offer x:rejected y:accepted w:withdrawn  q:quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, help_area[1]);
}

fn build_detail<'a>(state: &'a AppState) -> Text<'a> {
    let Some(app) = state.current() else {
        return Text::raw("No application selected");
    };

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        &app.job_title,
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(format!("at {}", app.company_name)));
    lines.push(Line::from(Span::styled(
        format!("Status: {}", app.status),
        status_style(app.status),
    )));
    lines.push(Line::from(format!("Applicant: {}", app.applicant_name)));
    lines.push(Line::from(format!(
        "Applied: {}",
        date_or(app.date_applied, "not set")
    )));
    lines.push(Line::from(format!(
        "Deadline: {}",
        date_or(app.deadline, "none")
    )));
    lines.push(Line::from(Span::styled(
        format!("Updated: {}", app.updated_at),
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(""));

    if !state.skills.is_empty() {
        lines.push(Line::from(Span::styled(
            "Skills",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        let names: Vec<&str> = state.skills.iter().map(|s| s.name.as_str()).collect();
        for line in textwrap::fill(&names.join(", "), 70).lines() {
            lines.push(Line::from(format!("  {}", line)));
        }
        lines.push(Line::from(""));
    }

    match &app.notes {
        Some(notes) => {
            lines.push(Line::from(Span::styled(
                "Notes",
                Style::default().add_modifier(Modifier::BOLD),
            )));
            for line in textwrap::fill(notes, 70).lines() {
                lines.push(Line::from(format!("  {}", line)));
            }
        }
        None => {
            lines.push(Line::from(Span::styled(
                "(No notes)",
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    Text::from(lines)
}
