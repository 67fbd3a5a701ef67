use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::models::{Project, ProjectStatus};
use crate::query::{Page, QueryDescriptor, SortDirection};

pub const PAGE_SIZE: usize = 10;

const SORT_OPTIONS: [(&str, SortDirection, &str); 6] = [
    ("createdAt", SortDirection::Desc, "Newest First"),
    ("createdAt", SortDirection::Asc, "Oldest First"),
    ("title", SortDirection::Asc, "Title (A-Z)"),
    ("title", SortDirection::Desc, "Title (Z-A)"),
    ("startDate", SortDirection::Desc, "Start Date (Newest)"),
    ("startDate", SortDirection::Asc, "Start Date (Oldest)"),
];

// Represents the state of the project list screen, optionally scoped to a
// single client's projects.
pub struct ProjectsState {
    page: Page<Project>,
    list_state: ListState,
    search: String,
    searching: bool,
    status_filter: Option<ProjectStatus>,
    client_filter: Option<(String, String)>, // (client id, display name)
    sort_index: usize,
    page_no: usize,
    show_delete_confirmation: bool,
    load_error: Option<String>,
}

impl ProjectsState {
    pub fn new(page: Page<Project>, client_filter: Option<(String, String)>) -> Self {
        let mut list_state = ListState::default();
        if !page.items.is_empty() {
            list_state.select(Some(0));
        }

        Self {
            page,
            list_state,
            search: String::new(),
            searching: false,
            status_filter: None,
            client_filter,
            sort_index: 0,
            page_no: 1,
            show_delete_confirmation: false,
            load_error: None,
        }
    }

    pub fn descriptor(&self) -> QueryDescriptor {
        let (field, direction, _) = SORT_OPTIONS[self.sort_index];
        QueryDescriptor::new(self.page_no, PAGE_SIZE)
            .expect("list page bounds stay valid")
            .search(&self.search)
            .filter(
                "status",
                self.status_filter.map(|s| s.as_str()).unwrap_or(""),
            )
            .filter(
                "clientId",
                self.client_filter
                    .as_ref()
                    .map(|(id, _)| id.as_str())
                    .unwrap_or(""),
            )
            .sort(field, direction)
    }

    pub fn client_id(&self) -> Option<String> {
        self.client_filter.as_ref().map(|(id, _)| id.clone())
    }

    pub fn set_page(&mut self, page: Page<Project>) {
        self.load_error = None;
        let selected = self.list_state.selected().unwrap_or(0);
        if page.items.is_empty() {
            self.list_state.select(None);
        } else {
            self.list_state
                .select(Some(selected.min(page.items.len() - 1)));
        }
        self.page = page;
    }

    pub fn set_load_error(&mut self, message: String) {
        self.load_error = Some(message);
    }

    pub fn next(&mut self) {
        if self.page.items.is_empty() {
            return;
        }

        let i = match self.list_state.selected() {
            Some(i) => {
                if i >= self.page.items.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.page.items.is_empty() {
            return;
        }

        let i = match self.list_state.selected() {
            Some(i) => {
                if i == 0 {
                    self.page.items.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn toggle_delete_confirmation(&mut self) {
        self.show_delete_confirmation = !self.show_delete_confirmation;
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.list_state
            .selected()
            .and_then(|i| self.page.items.get(i))
    }

    pub fn selected_project_id(&self) -> Option<String> {
        self.selected_project().map(|p| p.id.clone())
    }

    pub fn cycle_status_filter(&mut self) {
        self.status_filter = match self.status_filter {
            None => Some(ProjectStatus::Pending),
            Some(ProjectStatus::Pending) => Some(ProjectStatus::InProgress),
            Some(ProjectStatus::InProgress) => Some(ProjectStatus::Completed),
            Some(ProjectStatus::Completed) => None,
        };
        self.page_no = 1;
    }

    pub fn cycle_sort(&mut self) {
        self.sort_index = (self.sort_index + 1) % SORT_OPTIONS.len();
        self.page_no = 1;
    }

    fn next_page(&mut self) -> bool {
        if self.page_no < self.page.pages {
            self.page_no += 1;
            true
        } else {
            false
        }
    }

    fn previous_page(&mut self) -> bool {
        if self.page_no > 1 {
            self.page_no -= 1;
            true
        } else {
            false
        }
    }
}

pub enum ProjectAction {
    Back,
    Reload,
    NewProject,
    EditProject(String),
    DeleteProject(String),
}

pub fn render_projects<B: Backend>(frame: &mut Frame<B>, state: &mut ProjectsState) {
    let size = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ].as_ref())
        .split(size);

    let status_label = state
        .status_filter
        .map(|s| s.label())
        .unwrap_or("All");
    let (_, _, sort_label) = SORT_OPTIONS[state.sort_index];
    let search_display = if state.searching {
        format!("{}|", state.search)
    } else {
        state.search.clone()
    };
    let bar = Paragraph::new(format!(
        "Search: {search_display}   Status: {status_label}   Sort: {sort_label}"
    ))
    .style(if state.searching {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    })
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(bar, chunks[0]);

    let items: Vec<ListItem> = state
        .page
        .items
        .iter()
        .map(|project| {
            let status_style = match project.status {
                ProjectStatus::Pending => Style::default().fg(Color::Yellow),
                ProjectStatus::InProgress => Style::default().fg(Color::Blue),
                ProjectStatus::Completed => Style::default().fg(Color::Green),
            };
            ListItem::new(Spans::from(vec![
                Span::raw(format!(
                    "{:<28} {:<12} {:>12} ",
                    project.title,
                    project.start_date.format("%Y-%m-%d"),
                    format!("${:.2}", project.budget),
                )),
                Span::styled(project.status.label(), status_style),
            ]))
        })
        .collect();

    let scope = match &state.client_filter {
        Some((_, name)) => format!("Projects for {name}"),
        None => "Projects".to_string(),
    };
    let title = format!(
        "{scope} ({} total, page {}/{})",
        state.page.total,
        state.page_no,
        state.page.pages.max(1)
    );
    let projects_list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_stateful_widget(projects_list, chunks[1], &mut state.list_state);

    let footer = if let Some(message) = &state.load_error {
        Paragraph::new(format!("{message} <R> Retry"))
            .style(Style::default().fg(Color::Red))
            .block(Block::default().borders(Borders::TOP))
    } else {
        let text = if state.selected_project().is_some() {
            "</> Search | <F> Filter | <O> Sort | <Left/Right> Page | <N> New | <E> Edit | <D> Delete | <Esc> Back"
        } else {
            "</> Search | <F> Filter | <O> Sort | <N> New | <Esc> Back"
        };
        Paragraph::new(text)
            .style(Style::default().fg(Color::White))
            .block(Block::default().borders(Borders::TOP))
    };
    frame.render_widget(footer, chunks[2]);

    if state.show_delete_confirmation {
        render_delete_confirmation(frame, size);
    }
}

fn render_delete_confirmation<B: Backend>(frame: &mut Frame<B>, size: Rect) {
    let popup_area = centered_rect(50, 20, size);

    let popup = Paragraph::new(vec![
        Spans::from(""),
        Spans::from("Are you sure you want to delete this project?"),
        Spans::from(""),
        Spans::from("<Y> Yes  <N> No"),
    ])
    .block(Block::default().title("Confirm Delete").borders(Borders::ALL))
    .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(popup, popup_area);
}

// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub fn handle_input(state: &mut ProjectsState) -> Result<Option<ProjectAction>> {
    if let Event::Key(key) = event::read()? {
        if state.searching {
            match key.code {
                KeyCode::Enter | KeyCode::Esc => {
                    state.searching = false;
                    state.page_no = 1;
                    return Ok(Some(ProjectAction::Reload));
                }
                KeyCode::Char(c) => {
                    state.search.push(c);
                }
                KeyCode::Backspace => {
                    state.search.pop();
                }
                _ => {}
            }
            return Ok(None);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                if state.show_delete_confirmation {
                    state.toggle_delete_confirmation();
                } else {
                    return Ok(Some(ProjectAction::Back));
                }
            }
            KeyCode::Char('/') => {
                if !state.show_delete_confirmation {
                    state.searching = true;
                }
            }
            KeyCode::Char('f') => {
                if !state.show_delete_confirmation {
                    state.cycle_status_filter();
                    return Ok(Some(ProjectAction::Reload));
                }
            }
            KeyCode::Char('o') => {
                if !state.show_delete_confirmation {
                    state.cycle_sort();
                    return Ok(Some(ProjectAction::Reload));
                }
            }
            KeyCode::Char('r') => {
                if !state.show_delete_confirmation {
                    return Ok(Some(ProjectAction::Reload));
                }
            }
            KeyCode::Char('n') => {
                if !state.show_delete_confirmation {
                    return Ok(Some(ProjectAction::NewProject));
                }
            }
            KeyCode::Char('e') => {
                if !state.show_delete_confirmation {
                    if let Some(id) = state.selected_project_id() {
                        return Ok(Some(ProjectAction::EditProject(id)));
                    }
                }
            }
            KeyCode::Char('d') => {
                if !state.show_delete_confirmation && state.selected_project().is_some() {
                    state.toggle_delete_confirmation();
                }
            }
            KeyCode::Char('y') => {
                if state.show_delete_confirmation {
                    if let Some(id) = state.selected_project_id() {
                        state.toggle_delete_confirmation();
                        return Ok(Some(ProjectAction::DeleteProject(id)));
                    }
                }
            }
            KeyCode::Left => {
                if !state.show_delete_confirmation && state.previous_page() {
                    return Ok(Some(ProjectAction::Reload));
                }
            }
            KeyCode::Right => {
                if !state.show_delete_confirmation && state.next_page() {
                    return Ok(Some(ProjectAction::Reload));
                }
            }
            KeyCode::Down => {
                if !state.show_delete_confirmation {
                    state.next();
                }
            }
            KeyCode::Up => {
                if !state.show_delete_confirmation {
                    state.previous();
                }
            }
            _ => {}
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query;
    use crate::store::fixtures;

    fn state(client: Option<(String, String)>) -> ProjectsState {
        let projects = fixtures::projects();
        let descriptor = QueryDescriptor::new(1, PAGE_SIZE).unwrap();
        ProjectsState::new(query::execute(&projects, &descriptor), client)
    }

    #[test]
    fn descriptor_carries_the_client_scope() {
        let s = state(Some(("1".to_string(), "John Smith".to_string())));
        let descriptor = s.descriptor();
        assert_eq!(descriptor.filters.get("clientId").unwrap(), "1");
    }

    #[test]
    fn status_cycle_walks_all_three_states() {
        let mut s = state(None);
        s.cycle_status_filter();
        assert_eq!(s.descriptor().filters.get("status").unwrap(), "pending");
        s.cycle_status_filter();
        assert_eq!(s.descriptor().filters.get("status").unwrap(), "in-progress");
        s.cycle_status_filter();
        assert_eq!(s.descriptor().filters.get("status").unwrap(), "completed");
        s.cycle_status_filter();
        assert!(s.descriptor().filters.get("status").is_none());
    }
}
