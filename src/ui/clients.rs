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

use crate::models::{Client, ClientStatus};
use crate::query::{Page, QueryDescriptor, SortDirection};

pub const PAGE_SIZE: usize = 10;

const SORT_OPTIONS: [(&str, SortDirection, &str); 4] = [
    ("createdAt", SortDirection::Desc, "Newest First"),
    ("createdAt", SortDirection::Asc, "Oldest First"),
    ("name", SortDirection::Asc, "Name (A-Z)"),
    ("name", SortDirection::Desc, "Name (Z-A)"),
];

// Represents the state of the client list screen
pub struct ClientsState {
    page: Page<Client>,
    list_state: ListState,
    search: String,
    searching: bool,
    status_filter: Option<ClientStatus>,
    sort_index: usize,
    page_no: usize,
    show_delete_confirmation: bool,
    show_detail: bool,
    load_error: Option<String>,
}

impl ClientsState {
    pub fn new(page: Page<Client>) -> Self {
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
            sort_index: 0,
            page_no: 1,
            show_delete_confirmation: false,
            show_detail: false,
            load_error: None,
        }
    }

    /// Current UI state as a normalized request, for either mode.
    pub fn descriptor(&self) -> QueryDescriptor {
        let (field, direction, _) = SORT_OPTIONS[self.sort_index];
        QueryDescriptor::new(self.page_no, PAGE_SIZE)
            .expect("list page bounds stay valid")
            .search(&self.search)
            .filter(
                "status",
                self.status_filter.map(|s| s.as_str()).unwrap_or(""),
            )
            .sort(field, direction)
    }

    pub fn set_page(&mut self, page: Page<Client>) {
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

    pub fn selected_client(&self) -> Option<&Client> {
        self.list_state
            .selected()
            .and_then(|i| self.page.items.get(i))
    }

    pub fn selected_client_id(&self) -> Option<String> {
        self.selected_client().map(|c| c.id.clone())
    }

    pub fn cycle_status_filter(&mut self) {
        self.status_filter = match self.status_filter {
            None => Some(ClientStatus::Active),
            Some(ClientStatus::Active) => Some(ClientStatus::Inactive),
            Some(ClientStatus::Inactive) => None,
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

pub enum ClientAction {
    Back,
    Reload,
    NewClient,
    EditClient(String),
    DeleteClient(String),
    ViewProjects(String),
}

pub fn render_clients<B: Backend>(frame: &mut Frame<B>, state: &mut ClientsState) {
    let size = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ].as_ref())
        .split(size);

    // Search and filter bar
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

    // Client rows
    let items: Vec<ListItem> = state
        .page
        .items
        .iter()
        .map(|client| {
            let status_style = match client.status {
                ClientStatus::Active => Style::default().fg(Color::Green),
                ClientStatus::Inactive => Style::default().fg(Color::Gray),
            };
            ListItem::new(Spans::from(vec![
                Span::raw(format!(
                    "{:<22} {:<20} {:<28} ",
                    client.name, client.company, client.email
                )),
                Span::styled(client.status.label(), status_style),
            ]))
        })
        .collect();

    let title = format!(
        "Clients ({} total, page {}/{})",
        state.page.total,
        state.page_no,
        state.page.pages.max(1)
    );
    let clients_list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_stateful_widget(clients_list, chunks[1], &mut state.list_state);

    // Footer: load failure takes priority over the key help
    let footer = if let Some(message) = &state.load_error {
        Paragraph::new(format!("{message} <R> Retry"))
            .style(Style::default().fg(Color::Red))
            .block(Block::default().borders(Borders::TOP))
    } else {
        let text = if state.selected_client().is_some() {
            "</> Search | <F> Filter | <O> Sort | <Left/Right> Page | <V> Details | <N> New | <E> Edit | <D> Delete | <Enter> Projects | <Esc> Back"
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
    } else if state.show_detail {
        if let Some(client) = state.selected_client() {
            render_client_detail(frame, client, size);
        }
    }
}

// Full record for the selected row, the fields the list columns leave out
// included.
fn render_client_detail<B: Backend>(frame: &mut Frame<B>, client: &Client, size: Rect) {
    let popup_area = centered_rect(60, 50, size);

    let status_style = match client.status {
        ClientStatus::Active => Style::default().fg(Color::Green),
        ClientStatus::Inactive => Style::default().fg(Color::Gray),
    };
    let detail = Paragraph::new(vec![
        Spans::from(""),
        Spans::from(format!("  Name:    {}", client.name)),
        Spans::from(format!("  Company: {}", client.company)),
        Spans::from(format!("  Email:   {}", client.email)),
        Spans::from(format!("  Phone:   {}", client.phone)),
        Spans::from(format!(
            "  Address: {}",
            client.address.as_deref().unwrap_or("-")
        )),
        Spans::from(vec![
            Span::raw("  Status:  "),
            Span::styled(client.status.label(), status_style),
        ]),
        Spans::from(format!("  Created: {}", client.created_at)),
        Spans::from(""),
        Spans::from("  <Enter> Projects  <Esc> Close"),
    ])
    .block(Block::default().title("Client Details").borders(Borders::ALL))
    .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(detail, popup_area);
}

fn render_delete_confirmation<B: Backend>(frame: &mut Frame<B>, size: Rect) {
    let popup_area = centered_rect(50, 20, size);

    let popup = Paragraph::new(vec![
        Spans::from(""),
        Spans::from("Are you sure you want to delete this client?"),
        Spans::from(""),
        Spans::from("This action cannot be undone."),
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

pub fn handle_input(state: &mut ClientsState) -> Result<Option<ClientAction>> {
    if let Event::Key(key) = event::read()? {
        if state.searching {
            match key.code {
                KeyCode::Enter | KeyCode::Esc => {
                    state.searching = false;
                    state.page_no = 1;
                    return Ok(Some(ClientAction::Reload));
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

        // The detail popup swallows everything except close and the jump to
        // the client's projects.
        if state.show_detail {
            match key.code {
                KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('v') => {
                    state.show_detail = false;
                }
                KeyCode::Enter => {
                    state.show_detail = false;
                    if let Some(id) = state.selected_client_id() {
                        return Ok(Some(ClientAction::ViewProjects(id)));
                    }
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
                    return Ok(Some(ClientAction::Back));
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
                    return Ok(Some(ClientAction::Reload));
                }
            }
            KeyCode::Char('o') => {
                if !state.show_delete_confirmation {
                    state.cycle_sort();
                    return Ok(Some(ClientAction::Reload));
                }
            }
            KeyCode::Char('r') => {
                if !state.show_delete_confirmation {
                    return Ok(Some(ClientAction::Reload));
                }
            }
            KeyCode::Char('n') => {
                if !state.show_delete_confirmation {
                    return Ok(Some(ClientAction::NewClient));
                }
            }
            KeyCode::Char('e') => {
                if !state.show_delete_confirmation {
                    if let Some(id) = state.selected_client_id() {
                        return Ok(Some(ClientAction::EditClient(id)));
                    }
                }
            }
            KeyCode::Char('v') => {
                if !state.show_delete_confirmation && state.selected_client().is_some() {
                    state.show_detail = true;
                }
            }
            KeyCode::Char('d') => {
                if !state.show_delete_confirmation && state.selected_client().is_some() {
                    state.toggle_delete_confirmation();
                }
            }
            KeyCode::Char('y') => {
                if state.show_delete_confirmation {
                    if let Some(id) = state.selected_client_id() {
                        state.toggle_delete_confirmation();
                        return Ok(Some(ClientAction::DeleteClient(id)));
                    }
                }
            }
            KeyCode::Left => {
                if !state.show_delete_confirmation && state.previous_page() {
                    return Ok(Some(ClientAction::Reload));
                }
            }
            KeyCode::Right => {
                if !state.show_delete_confirmation && state.next_page() {
                    return Ok(Some(ClientAction::Reload));
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
            KeyCode::Enter => {
                if !state.show_delete_confirmation {
                    if let Some(id) = state.selected_client_id() {
                        return Ok(Some(ClientAction::ViewProjects(id)));
                    }
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

    fn state() -> ClientsState {
        let clients = fixtures::clients();
        let descriptor = QueryDescriptor::new(1, PAGE_SIZE).unwrap();
        ClientsState::new(query::execute(&clients, &descriptor))
    }

    #[test]
    fn descriptor_reflects_search_filter_and_sort() {
        let mut s = state();
        s.search = "tech".to_string();
        s.cycle_status_filter();
        s.cycle_sort();

        let descriptor = s.descriptor();
        assert_eq!(descriptor.search.as_deref(), Some("tech"));
        assert_eq!(descriptor.filters.get("status").unwrap(), "active");
        assert_eq!(descriptor.sort_field.as_deref(), Some("createdAt"));
        assert_eq!(descriptor.sort_direction, SortDirection::Asc);
        assert_eq!(descriptor.page, 1);
    }

    #[test]
    fn filter_cycle_returns_to_all() {
        let mut s = state();
        s.cycle_status_filter();
        s.cycle_status_filter();
        s.cycle_status_filter();
        assert!(s.descriptor().filters.is_empty());
    }

    #[test]
    fn set_page_clamps_the_selection() {
        let mut s = state();
        s.list_state.select(Some(2));
        let clients = fixtures::clients();
        let one = query::execute(&clients, &QueryDescriptor::new(2, 2).unwrap());
        s.set_page(one);
        assert_eq!(s.list_state.selected(), Some(0));
    }

    #[test]
    fn detail_view_exposes_the_full_selected_record() {
        let mut s = state();
        s.next();
        s.show_detail = true;

        // The popup renders whatever row is selected, fields the list
        // columns omit included.
        let client = s.selected_client().unwrap();
        assert_eq!(client.id, "2");
        assert_eq!(client.phone, "+1-555-0456");
        assert_eq!(client.address.as_deref(), Some("456 Creative St, LA"));
    }

    #[test]
    fn paging_stops_at_the_bounds() {
        let mut s = state();
        assert!(!s.previous_page());
        // Fixture set fits on one page, so there is no next page either.
        assert!(!s.next_page());
    }
}
