use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::models::{Client, ClientDraft, ClientStatus};
use crate::validate::{self, FormErrors};

pub enum ClientWizardAction {
    Cancel,
    Save {
        id: Option<String>,
        draft: ClientDraft,
    },
}

#[derive(Clone, PartialEq, Copy)]
pub enum ClientField {
    Name,
    Email,
    Phone,
    Company,
    Address,
    Status,
}

pub struct ClientWizardState {
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub address: String,
    pub status: ClientStatus,
    pub current_field: ClientField,
    pub editing: bool,
    pub errors: FormErrors,
    pub notice: Option<String>,
}

impl ClientWizardState {
    pub fn new() -> Self {
        Self {
            id: None,
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            company: String::new(),
            address: String::new(),
            status: ClientStatus::Active,
            current_field: ClientField::Name,
            editing: false,
            errors: FormErrors::default(),
            notice: None,
        }
    }

    pub fn from_existing(client: &Client) -> Self {
        Self {
            id: Some(client.id.clone()),
            name: client.name.clone(),
            email: client.email.clone(),
            phone: client.phone.clone(),
            company: client.company.clone(),
            address: client.address.clone().unwrap_or_default(),
            status: client.status,
            current_field: ClientField::Name,
            editing: false,
            errors: FormErrors::default(),
            notice: None,
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            ClientField::Name => ClientField::Email,
            ClientField::Email => ClientField::Phone,
            ClientField::Phone => ClientField::Company,
            ClientField::Company => ClientField::Address,
            ClientField::Address => ClientField::Status,
            ClientField::Status => ClientField::Name,
        };
    }

    pub fn previous_field(&mut self) {
        self.current_field = match self.current_field {
            ClientField::Name => ClientField::Status,
            ClientField::Email => ClientField::Name,
            ClientField::Phone => ClientField::Email,
            ClientField::Company => ClientField::Phone,
            ClientField::Address => ClientField::Company,
            ClientField::Status => ClientField::Address,
        };
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        if self.current_field == ClientField::Status {
            if matches!(
                key,
                KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')
            ) {
                self.status = match self.status {
                    ClientStatus::Active => ClientStatus::Inactive,
                    ClientStatus::Inactive => ClientStatus::Active,
                };
            }
            return;
        }

        let field_value = match self.current_field {
            ClientField::Name => &mut self.name,
            ClientField::Email => &mut self.email,
            ClientField::Phone => &mut self.phone,
            ClientField::Company => &mut self.company,
            ClientField::Address => &mut self.address,
            ClientField::Status => unreachable!("handled above"),
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

    /// Every validator runs; all messages display at once.
    pub fn validate(&mut self) -> bool {
        let mut errors = FormErrors::default();
        errors.record("name", validate::required(&self.name, "Name"));
        errors.record("email", validate::email(&self.email));
        errors.record("phone", validate::required(&self.phone, "Phone"));
        errors.record("company", validate::required(&self.company, "Company"));
        let valid = errors.is_valid();
        self.errors = errors;
        valid
    }

    pub fn draft(&self) -> ClientDraft {
        let address = self.address.trim();
        ClientDraft {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            company: self.company.clone(),
            address: if address.is_empty() {
                None
            } else {
                Some(address.to_string())
            },
            status: self.status,
        }
    }
}

pub fn render_client_wizard<B: Backend>(f: &mut Frame<B>, state: &mut ClientWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    // Title with appropriate text based on whether we're editing or creating
    let title_text = if state.id.is_none() {
        "New Client"
    } else {
        "Edit Client"
    };

    let title = Paragraph::new(title_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_form(f, state, chunks[1]);

    let help_text = if state.editing {
        if state.current_field == ClientField::Status {
            "Space - Toggle status | Enter - Save field | Esc - Cancel editing"
        } else {
            "Enter - Save field | Esc - Cancel editing"
        }
    } else {
        "Enter - Edit field | Up/Down - Navigate fields | S - Save client | Esc - Cancel"
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

fn render_form<B: Backend>(f: &mut Frame<B>, state: &mut ClientWizardState, area: Rect) {
    let field_rows = [
        ("Name", state.name.clone(), "name"),
        ("Email", state.email.clone(), "email"),
        ("Phone", state.phone.clone(), "phone"),
        ("Company", state.company.clone(), "company"),
        ("Address", state.address.clone(), "address"),
        ("Status", state.status.label().to_string(), "status"),
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
        .block(Block::default().borders(Borders::ALL).title("Client Details"))
        .highlight_style(Style::default().fg(Color::Yellow));

    f.render_widget(form_list, area);
}

pub fn handle_input(state: &mut ClientWizardState) -> Result<Option<ClientWizardAction>> {
    if let Event::Key(key) = event::read()? {
        match key.code {
            KeyCode::Esc => {
                if state.editing {
                    state.toggle_editing();
                } else {
                    return Ok(Some(ClientWizardAction::Cancel));
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
            KeyCode::Char('s') if !state.editing => {
                if state.validate() {
                    return Ok(Some(ClientWizardAction::Save {
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

    #[test]
    fn blank_form_reports_every_required_field() {
        let mut state = ClientWizardState::new();
        assert!(!state.validate());
        assert_eq!(state.errors.len(), 4);
        assert_eq!(state.errors.get("name").unwrap(), "Name is required");
        assert_eq!(state.errors.get("company").unwrap(), "Company is required");
    }

    #[test]
    fn draft_drops_a_blank_address() {
        let mut state = ClientWizardState::new();
        state.address = "   ".to_string();
        assert_eq!(state.draft().address, None);
        state.address = "1 Main St".to_string();
        assert_eq!(state.draft().address.as_deref(), Some("1 Main St"));
    }

    #[test]
    fn from_existing_preserves_identity_for_save() {
        let client = &fixtures::clients()[0];
        let mut state = ClientWizardState::from_existing(client);
        assert!(state.validate());
        assert_eq!(state.id.as_deref(), Some("1"));
        assert_eq!(state.draft().company, "TechCorp Inc.");
    }
}
