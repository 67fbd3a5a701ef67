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

pub enum LoginAction {
    Submit { email: String, password: String },
    GotoSignup,
    Exit,
}

#[derive(Clone, PartialEq, Copy)]
pub enum LoginField {
    Email,
    Password,
}

pub struct LoginState {
    pub email: String,
    pub password: String,
    pub current_field: LoginField,
    pub editing: bool,
    pub errors: FormErrors,
    pub submitting: bool,
    pub notice: Option<String>,
}

impl LoginState {
    pub fn new() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            current_field: LoginField::Email,
            editing: false,
            errors: FormErrors::default(),
            submitting: false,
            notice: None,
        }
    }

    pub fn with_notice(notice: String) -> Self {
        let mut state = Self::new();
        state.notice = Some(notice);
        state
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        let field_value = match self.current_field {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
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

    /// Run every field validator and keep all messages, so the operator
    /// sees each violated rule at once.
    pub fn validate(&mut self) -> bool {
        let mut errors = FormErrors::default();
        errors.record("email", validate::email(&self.email));
        errors.record("password", validate::required(&self.password, "Password"));
        let valid = errors.is_valid();
        self.errors = errors;
        valid
    }

    pub fn finish_submit(&mut self, notice: Option<String>) {
        self.submitting = false;
        self.notice = notice;
    }
}

pub fn render_login<B: Backend>(f: &mut Frame<B>, state: &mut LoginState) {
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

    let title = Paragraph::new("Sign in to your account")
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let masked: String = "*".repeat(char_count(&state.password));
    let field_rows = [
        ("Email", state.email.clone(), "email"),
        ("Password", masked, "password"),
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
        .block(Block::default().borders(Borders::ALL).title("Credentials"));
    f.render_widget(form, chunks[1]);

    let help_text = if state.submitting {
        "Signing in..."
    } else if state.editing {
        "Enter - Save field | Esc - Cancel editing"
    } else {
        "Enter - Edit field | Up/Down - Navigate | S - Sign in | G - Create account | Esc - Quit"
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

// Mask by character count, not byte length.
fn char_count(value: &str) -> usize {
    value.chars().count()
}

pub fn handle_input(state: &mut LoginState) -> Result<Option<LoginAction>> {
    if let Event::Key(key) = event::read()? {
        match key.code {
            KeyCode::Esc => {
                if state.editing {
                    state.toggle_editing();
                } else {
                    return Ok(Some(LoginAction::Exit));
                }
            }
            KeyCode::Enter => {
                state.toggle_editing();
            }
            KeyCode::Up | KeyCode::Down if !state.editing => {
                state.next_field();
            }
            KeyCode::Char('s') if !state.editing => {
                if state.validate() {
                    state.submitting = true;
                    state.notice = None;
                    return Ok(Some(LoginAction::Submit {
                        email: state.email.clone(),
                        password: state.password.clone(),
                    }));
                }
            }
            KeyCode::Char('g') if !state.editing => {
                return Ok(Some(LoginAction::GotoSignup));
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
    fn invalid_email_and_missing_password_report_together() {
        let mut state = LoginState::new();
        state.email = "x".to_string();
        assert!(!state.validate());
        assert_eq!(state.errors.len(), 2);
        assert_eq!(
            state.errors.get("email").unwrap(),
            "Please enter a valid email address"
        );
        assert_eq!(state.errors.get("password").unwrap(), "Password is required");
    }

    #[test]
    fn valid_credentials_pass_validation() {
        let mut state = LoginState::new();
        state.email = "admin@example.com".to_string();
        state.password = "Abcdef1".to_string();
        assert!(state.validate());
    }
}
