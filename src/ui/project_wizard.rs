use anyhow::Result;
use chrono::Local;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::models::{Project, ProjectDraft, ProjectStatus};
use crate::ui::components::date_input::DateInputState;
use crate::validate::{self, FormErrors};

pub enum ProjectWizardAction {
    Cancel,
    Save {
        id: Option<String>,
        draft: ProjectDraft,
    },
}

#[derive(Clone, PartialEq, Copy)]
pub enum ProjectField {
    Title,
    Description,
    Client,
    Status,
    StartDate,
    EndDate,
    Budget,
}

pub struct ProjectWizardState {
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    /// (id, name) of every client the project can belong to.
    pub clients: Vec<(String, String)>,
    pub client_index: Option<usize>,
    pub status: ProjectStatus,
    pub start_date: DateInputState,
    pub end_date: Option<DateInputState>,
    pub budget: String,
    pub current_field: ProjectField,
    pub editing: bool,
    pub errors: FormErrors,
    pub notice: Option<String>,
}

impl ProjectWizardState {
    pub fn new(clients: Vec<(String, String)>, preselect_client: Option<String>) -> Self {
        let client_index = preselect_client
            .and_then(|id| clients.iter().position(|(client_id, _)| *client_id == id));

        Self {
            id: None,
            title: String::new(),
            description: String::new(),
            clients,
            client_index,
            status: ProjectStatus::Pending,
            start_date: DateInputState::new(Local::now().date_naive()),
            end_date: None,
            budget: String::new(),
            current_field: ProjectField::Title,
            editing: false,
            errors: FormErrors::default(),
            notice: None,
        }
    }

    pub fn from_existing(project: &Project, clients: Vec<(String, String)>) -> Self {
        let client_index = clients
            .iter()
            .position(|(client_id, _)| *client_id == project.client_id);

        Self {
            id: Some(project.id.clone()),
            title: project.title.clone(),
            description: project.description.clone(),
            clients,
            client_index,
            status: project.status,
            start_date: DateInputState::new(project.start_date),
            end_date: project.end_date.map(DateInputState::new),
            budget: format!("{}", project.budget),
            current_field: ProjectField::Title,
            editing: false,
            errors: FormErrors::default(),
            notice: None,
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        match self.current_field {
            ProjectField::StartDate => self.start_date.toggle_editing(),
            ProjectField::EndDate => {
                // Editing a blank end date starts it at the start date.
                if self.end_date.is_none() && self.editing {
                    self.end_date = Some(DateInputState::new(self.start_date.date));
                }
                if let Some(end) = &mut self.end_date {
                    end.toggle_editing();
                }
            }
            _ => {}
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            ProjectField::Title => ProjectField::Description,
            ProjectField::Description => ProjectField::Client,
            ProjectField::Client => ProjectField::Status,
            ProjectField::Status => ProjectField::StartDate,
            ProjectField::StartDate => ProjectField::EndDate,
            ProjectField::EndDate => ProjectField::Budget,
            ProjectField::Budget => ProjectField::Title,
        };
    }

    pub fn previous_field(&mut self) {
        self.current_field = match self.current_field {
            ProjectField::Title => ProjectField::Budget,
            ProjectField::Description => ProjectField::Title,
            ProjectField::Client => ProjectField::Description,
            ProjectField::Status => ProjectField::Client,
            ProjectField::StartDate => ProjectField::Status,
            ProjectField::EndDate => ProjectField::StartDate,
            ProjectField::Budget => ProjectField::EndDate,
        };
    }

    pub fn clear_end_date(&mut self) {
        self.end_date = None;
    }

    fn cycle_client(&mut self, forward: bool) {
        if self.clients.is_empty() {
            return;
        }
        let count = self.clients.len();
        self.client_index = Some(match self.client_index {
            None => 0,
            Some(i) if forward => (i + 1) % count,
            Some(i) => (i + count - 1) % count,
        });
    }

    fn cycle_status(&mut self) {
        self.status = match self.status {
            ProjectStatus::Pending => ProjectStatus::InProgress,
            ProjectStatus::InProgress => ProjectStatus::Completed,
            ProjectStatus::Completed => ProjectStatus::Pending,
        };
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        match self.current_field {
            ProjectField::Client => match key {
                KeyCode::Right | KeyCode::Char(' ') => self.cycle_client(true),
                KeyCode::Left => self.cycle_client(false),
                _ => {}
            },
            ProjectField::Status => {
                if matches!(key, KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')) {
                    self.cycle_status();
                }
            }
            ProjectField::StartDate => self.start_date.handle_input(key),
            ProjectField::EndDate => {
                if let Some(end) = &mut self.end_date {
                    end.handle_input(key);
                }
            }
            ProjectField::Budget => match key {
                KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => {
                    self.budget.push(c);
                }
                KeyCode::Backspace => {
                    self.budget.pop();
                }
                _ => {}
            },
            ProjectField::Title | ProjectField::Description => {
                let field_value = if self.current_field == ProjectField::Title {
                    &mut self.title
                } else {
                    &mut self.description
                };
                match key {
                    KeyCode::Char(c) => {
                        field_value.push(c);
                    }
                    KeyCode::Backspace => {
                        field_value.pop();
                    }
                    _ => {}
                }
            }
        }
    }

    fn parsed_budget(&self) -> Option<f64> {
        self.budget
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| *value >= 0.0)
    }

    /// Every rule runs; all messages display at once.
    pub fn validate(&mut self) -> bool {
        let mut errors = FormErrors::default();
        errors.record("title", validate::required(&self.title, "Title"));
        if self.client_index.is_none() {
            errors.record("clientId", Some("Client is required".to_string()));
        }
        if self.parsed_budget().is_none() {
            errors.record(
                "budget",
                Some("Budget must be a non-negative number".to_string()),
            );
        }
        let valid = errors.is_valid();
        self.errors = errors;
        valid
    }

    /// Only meaningful after `validate` has passed.
    pub fn draft(&self) -> ProjectDraft {
        let client_id = self
            .client_index
            .map(|i| self.clients[i].0.clone())
            .unwrap_or_default();

        ProjectDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            client_id,
            status: self.status,
            start_date: self.start_date.date,
            end_date: self.end_date.as_ref().map(|end| end.date),
            budget: self.parsed_budget().unwrap_or_default(),
        }
    }
}

pub fn render_project_wizard<B: Backend>(f: &mut Frame<B>, state: &mut ProjectWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(12),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title_text = if state.id.is_none() {
        "New Project"
    } else {
        "Edit Project"
    };

    let title = Paragraph::new(title_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_form(f, state, chunks[1]);

    let help_text = if state.editing {
        match state.current_field {
            ProjectField::Client | ProjectField::Status => {
                "Left/Right - Cycle value | Enter - Save field | Esc - Cancel editing"
            }
            ProjectField::StartDate | ProjectField::EndDate => {
                "Type YYYYMMDD | Up/Down - Step day | Enter - Save field | Esc - Cancel editing"
            }
            _ => "Enter - Save field | Esc - Cancel editing",
        }
    } else if state.current_field == ProjectField::EndDate {
        "Enter - Edit field | X - Clear end date | Up/Down - Navigate | S - Save project | Esc - Cancel"
    } else {
        "Enter - Edit field | Up/Down - Navigate fields | S - Save project | Esc - Cancel"
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

fn render_form<B: Backend>(f: &mut Frame<B>, state: &mut ProjectWizardState, area: Rect) {
    let client_display = state
        .client_index
        .map(|i| state.clients[i].1.clone())
        .unwrap_or_else(|| "(none selected)".to_string());
    let end_display = state
        .end_date
        .as_ref()
        .map(|end| end.get_display_string())
        .unwrap_or_else(|| "(none)".to_string());

    let field_rows = [
        ("Title", state.title.clone(), "title"),
        ("Description", state.description.clone(), "description"),
        ("Client", client_display, "clientId"),
        ("Status", state.status.label().to_string(), "status"),
        ("Start Date", state.start_date.get_display_string(), "startDate"),
        ("End Date", end_display, "endDate"),
        ("Budget", state.budget.clone(), "budget"),
    ];

    let mut items: Vec<ListItem> = Vec::new();
    for (i, (name, value, error_key)) in field_rows.iter().enumerate() {
        let selected = i == state.current_field as usize;
        let content = if selected && state.editing {
            Spans::from(vec![
                Span::styled(
                    format!("{}: ", name),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled(
                    format!("{}|", value),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ])
        } else {
            let style = if selected {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };

            Spans::from(vec![
                Span::styled(format!("{}: ", name), style),
                Span::raw(value.clone()),
            ])
        };
        items.push(ListItem::new(content));

        if let Some(message) = state.errors.get(error_key) {
            items.push(ListItem::new(Spans::from(Span::styled(
                format!("  {message}"),
                Style::default().fg(Color::Red),
            ))));
        }
    }

    if let Some(notice) = &state.notice {
        items.push(ListItem::new(Spans::from("")));
        items.push(ListItem::new(Spans::from(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Red),
        ))));
    }

    let form_list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Project Details"))
        .highlight_style(Style::default().fg(Color::Yellow));

    f.render_widget(form_list, area);
}

pub fn handle_input(state: &mut ProjectWizardState) -> Result<Option<ProjectWizardAction>> {
    if let Event::Key(key) = event::read()? {
        match key.code {
            KeyCode::Esc => {
                if state.editing {
                    state.toggle_editing();
                } else {
                    return Ok(Some(ProjectWizardAction::Cancel));
                }
            }
            KeyCode::Enter => {
                state.toggle_editing();
            }
            KeyCode::Up if !state.editing => {
                state.previous_field();
            }
            KeyCode::Down if !state.editing => {
                state.next_field();
            }
            KeyCode::Char('x')
                if !state.editing && state.current_field == ProjectField::EndDate =>
            {
                state.clear_end_date();
            }
            KeyCode::Char('s') if !state.editing => {
                if state.validate() {
                    return Ok(Some(ProjectWizardAction::Save {
                        id: state.id.clone(),
                        draft: state.draft(),
                    }));
                }
            }
            _ if state.editing => {
                state.edit_current_field(key.code);
            }
            _ => {}
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fixtures;

    fn client_choices() -> Vec<(String, String)> {
        fixtures::clients()
            .iter()
            .map(|c| (c.id.clone(), c.name.clone()))
            .collect()
    }

    #[test]
    fn blank_form_reports_title_client_and_budget() {
        let mut state = ProjectWizardState::new(client_choices(), None);
        assert!(!state.validate());
        assert_eq!(state.errors.len(), 3);
        assert_eq!(state.errors.get("title").unwrap(), "Title is required");
        assert_eq!(state.errors.get("clientId").unwrap(), "Client is required");
        assert_eq!(
            state.errors.get("budget").unwrap(),
            "Budget must be a non-negative number"
        );
    }

    #[test]
    fn preselected_client_carries_into_the_draft() {
        let mut state = ProjectWizardState::new(client_choices(), Some("2".to_string()));
        state.title = "Brand Refresh".to_string();
        state.budget = "1500".to_string();
        assert!(state.validate());
        let draft = state.draft();
        assert_eq!(draft.client_id, "2");
        assert_eq!(draft.budget, 1500.0);
        assert_eq!(draft.end_date, None);
    }

    #[test]
    fn garbage_budget_is_rejected() {
        let mut state = ProjectWizardState::new(client_choices(), Some("1".to_string()));
        state.title = "Audit".to_string();
        state.budget = "12..5".to_string();
        assert!(!state.validate());
        assert!(state.errors.get("budget").is_some());
    }

    #[test]
    fn from_existing_keeps_identity_and_dates() {
        let project = &fixtures::projects()[0];
        let mut state = ProjectWizardState::from_existing(project, client_choices());
        assert!(state.validate());
        assert_eq!(state.id.as_deref(), Some("1"));
        let draft = state.draft();
        assert_eq!(draft.start_date, project.start_date);
        assert_eq!(draft.client_id, project.client_id);
    }

    #[test]
    fn clearing_the_end_date_makes_it_open_ended() {
        let project = &fixtures::projects()[2];
        let mut state = ProjectWizardState::from_existing(project, client_choices());
        assert!(state.end_date.is_some());
        state.clear_end_date();
        assert_eq!(state.draft().end_date, None);
    }
}
