use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::validate::{self, FormErrors};

pub enum SignupAction {
    Submit {
        name: String,
        email: String,
        password: String,
    },
    GotoLogin,
}

#[derive(Clone, PartialEq, Copy)]
pub enum SignupField {
    Name,
    Email,
    Password,
    ConfirmPassword,
}

pub struct SignupState {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub current_field: SignupField,
    pub editing: bool,
    pub errors: FormErrors,
    pub submitting: bool,
    pub notice: Option<String>,
}

impl SignupState {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            current_field: SignupField::Name,
            editing: false,
            errors: FormErrors::default(),
            submitting: false,
            notice: None,
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            SignupField::Name => SignupField::Email,
            SignupField::Email => SignupField::Password,
            SignupField::Password => SignupField::ConfirmPassword,
            SignupField::ConfirmPassword => SignupField::Name,
        };
    }

    pub fn previous_field(&mut self) {
        self.current_field = match self.current_field {
            SignupField::Name => SignupField::ConfirmPassword,
            SignupField::Email => SignupField::Name,
            SignupField::Password => SignupField::Email,
            SignupField::ConfirmPassword => SignupField::Password,
        };
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        let field_value = match self.current_field {
            SignupField::Name => &mut self.name,
            SignupField::Email => &mut self.email,
            SignupField::Password => &mut self.password,
            SignupField::ConfirmPassword => &mut self.confirm_password,
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

    /// All four validators run unconditionally so every violated rule is
    /// shown at once.
    pub fn validate(&mut self) -> bool {
        let mut errors = FormErrors::default();
        errors.record("name", validate::required(&self.name, "Name"));
        errors.record("email", validate::email(&self.email));
        errors.record("password", validate::password(&self.password));
        errors.record(
            "confirmPassword",
            validate::confirm_password(&self.password, &self.confirm_password),
        );
        let valid = errors.is_valid();
        self.errors = errors;
        valid
    }

    pub fn finish_submit(&mut self, notice: Option<String>) {
        self.submitting = false;
        self.notice = notice;
    }
}

pub fn render_signup<B: Backend>(f: &mut Frame<B>, state: &mut SignupState) {
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

    let title = Paragraph::new("Create your account")
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let mask = |value: &str| "*".repeat(value.chars().count());
    let field_rows = [
        ("Name", state.name.clone(), "name"),
        ("Email", state.email.clone(), "email"),
        ("Password", mask(&state.password), "password"),
        (
            "Confirm Password",
            mask(&state.confirm_password),
            "confirmPassword",
        ),
    ];

    let mut items: Vec<ListItem> = Vec::new();
    for (i, (name, value, error_key)) in field_rows.iter().enumerate() {
        let selected = i == state.current_field as usize;
        let style = if selected {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let value_span = if selected && state.editing {
            Span::styled(
                format!("{value}|"),
                Style::default().add_modifier(Modifier::BOLD),
            )
        } else {
            Span::raw(value.clone())
        };
        items.push(ListItem::new(Spans::from(vec![
            Span::styled(format!("{name}: "), style),
            value_span,
        ])));
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

    let form = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Account Details"));
    f.render_widget(form, chunks[1]);

    let help_text = if state.submitting {
        "Creating account..."
    } else if state.editing {
        "Enter - Save field | Esc - Cancel editing"
    } else {
        "Enter - Edit field | Up/Down - Navigate | S - Sign up | Esc - Back to sign in"
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

pub fn handle_input(state: &mut SignupState) -> Result<Option<SignupAction>> {
    if let Event::Key(key) = event::read()? {
        match key.code {
            KeyCode::Esc => {
                if state.editing {
                    state.toggle_editing();
                } else {
                    return Ok(Some(SignupAction::GotoLogin));
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
                    state.submitting = true;
                    state.notice = None;
                    return Ok(Some(SignupAction::Submit {
                        name: state.name.clone(),
                        email: state.email.clone(),
                        password: state.password.clone(),
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

    #[test]
    fn weak_password_and_blank_name_report_together() {
        let mut state = SignupState::new();
        state.email = "ada@example.com".to_string();
        state.password = "abc".to_string();
        state.confirm_password = "abc".to_string();
        assert!(!state.validate());
        assert_eq!(state.errors.len(), 2);
        assert_eq!(state.errors.get("name").unwrap(), "Name is required");
        assert_eq!(
            state.errors.get("password").unwrap(),
            "Password must be at least 6 characters long"
        );
    }

    #[test]
    fn mismatched_confirmation_blocks_submission() {
        let mut state = SignupState::new();
        state.name = "Ada".to_string();
        state.email = "ada@example.com".to_string();
        state.password = "Abcdef1".to_string();
        state.confirm_password = "Abcdef2".to_string();
        assert!(!state.validate());
        assert_eq!(
            state.errors.get("confirmPassword").unwrap(),
            "Passwords do not match"
        );
    }

    #[test]
    fn complete_form_passes() {
        let mut state = SignupState::new();
        state.name = "Ada".to_string();
        state.email = "ada@example.com".to_string();
        state.password = "Abcdef1".to_string();
        state.confirm_password = "Abcdef1".to_string();
        assert!(state.validate());
    }
}
