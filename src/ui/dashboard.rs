use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::source::DashboardStats;

pub struct DashboardState {
    pub stats: DashboardStats,
    pub user_name: String,
}

impl DashboardState {
    pub fn new(stats: DashboardStats, user_name: String) -> Self {
        Self { stats, user_name }
    }
}

pub enum DashboardAction {
    OpenClients,
    OpenProjects,
    Logout,
    Exit,
}

pub fn render_dashboard<B: Backend>(f: &mut Frame<B>, state: &mut DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title = Paragraph::new(format!("Dashboard - welcome, {}", state.user_name))
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(chunks[1]);

    let stats = &state.stats;
    let clients = Paragraph::new(vec![
        Spans::from(""),
        Spans::from(Span::raw(format!("  Total:    {}", stats.total_clients))),
        Spans::from(Span::styled(
            format!("  Active:   {}", stats.active_clients),
            Style::default().fg(Color::Green),
        )),
        Spans::from(Span::styled(
            format!("  Inactive: {}", stats.inactive_clients),
            Style::default().fg(Color::Gray),
        )),
    ])
    .block(Block::default().title("Clients").borders(Borders::ALL));
    f.render_widget(clients, columns[0]);

    let projects = Paragraph::new(vec![
        Spans::from(""),
        Spans::from(Span::raw(format!("  Total:       {}", stats.total_projects))),
        Spans::from(Span::styled(
            format!("  Pending:     {}", stats.pending_projects),
            Style::default().fg(Color::Yellow),
        )),
        Spans::from(Span::styled(
            format!("  In Progress: {}", stats.in_progress_projects),
            Style::default().fg(Color::Blue),
        )),
        Spans::from(Span::styled(
            format!("  Completed:   {}", stats.completed_projects),
            Style::default().fg(Color::Green),
        )),
    ])
    .block(Block::default().title("Projects").borders(Borders::ALL));
    f.render_widget(projects, columns[1]);

    let help = Paragraph::new("C - Clients | P - Projects | L - Log out | Q - Quit")
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

pub fn handle_input(_state: &mut DashboardState) -> Result<Option<DashboardAction>> {
    if let Event::Key(key) = event::read()? {
        match key.code {
            KeyCode::Char('c') => return Ok(Some(DashboardAction::OpenClients)),
            KeyCode::Char('p') => return Ok(Some(DashboardAction::OpenProjects)),
            KeyCode::Char('l') => return Ok(Some(DashboardAction::Logout)),
            KeyCode::Char('q') | KeyCode::Esc => return Ok(Some(DashboardAction::Exit)),
            _ => {}
        }
    }
    Ok(None)
}
