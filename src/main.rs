use std::fs::File;
use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use simplelog::{LevelFilter, WriteLogger};
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use client_manager::api::{Api, ApiError};
use client_manager::config;
use client_manager::query::{Page, QueryDescriptor};
use client_manager::session::Session;
use client_manager::source::{DashboardStats, DataSource};
use client_manager::store::LocalStore;
use client_manager::ui::{
    client_wizard::{
        handle_input as handle_client_wizard_input, render_client_wizard, ClientWizardAction,
        ClientWizardState,
    },
    clients::{
        self, handle_input as handle_clients_input, render_clients, ClientAction, ClientsState,
    },
    dashboard::{
        handle_input as handle_dashboard_input, render_dashboard, DashboardAction, DashboardState,
    },
    login::{handle_input as handle_login_input, render_login, LoginAction, LoginState},
    project_wizard::{
        handle_input as handle_project_wizard_input, render_project_wizard, ProjectWizardAction,
        ProjectWizardState,
    },
    projects::{
        self, handle_input as handle_projects_input, render_projects, ProjectAction, ProjectsState,
    },
    signup::{handle_input as handle_signup_input, render_signup, SignupAction, SignupState},
};

/// Terminal dashboard for administering clients and projects
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Run against the seeded in-memory store instead of the API
    #[arg(long)]
    local: bool,
    /// Base URL of the administration API (overrides the environment)
    #[arg(long)]
    api_url: Option<String>,
    /// File receiving the application log
    #[arg(long, default_value = "client-manager.log")]
    log_file: PathBuf,
}

// Represents the current screen in the app
enum AppScreen {
    Login,
    Signup,
    Dashboard,
    Clients,
    ClientWizard,
    Projects,
    ProjectWizard,
}

// Main application state
struct AppState {
    source: DataSource,
    session: Session,
    screen: AppScreen,
    login_state: Option<LoginState>,
    signup_state: Option<SignupState>,
    dashboard_state: Option<DashboardState>,
    clients_state: Option<ClientsState>,
    client_wizard_state: Option<ClientWizardState>,
    projects_state: Option<ProjectsState>,
    project_wizard_state: Option<ProjectWizardState>,
}

impl AppState {
    fn new(source: DataSource, session: Session) -> Self {
        Self {
            source,
            session,
            screen: AppScreen::Login,
            login_state: Some(LoginState::new()),
            signup_state: None,
            dashboard_state: None,
            clients_state: None,
            client_wizard_state: None,
            projects_state: None,
            project_wizard_state: None,
        }
    }

    fn user_name(&self) -> String {
        self.session
            .user()
            .map(|user| user.name.clone())
            .unwrap_or_default()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    WriteLogger::init(
        LevelFilter::Info,
        simplelog::Config::default(),
        File::create(&cli.log_file)?,
    )?;

    // Load configuration
    let config = config::init()?;
    let mut session = Session::open(config.session_dir.clone())?;

    let source = if cli.local {
        log::info!("running in local mode against the seeded store");
        DataSource::Local(LocalStore::seeded())
    } else {
        let base_url = cli.api_url.unwrap_or_else(|| config.api_url.clone());
        log::info!("running against {base_url}");
        let mut api = Api::new(&base_url)?;
        api.set_token(session.token().map(str::to_string));
        DataSource::Remote(api)
    };

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let restore_session = session.is_authenticated();
    let mut app_state = AppState::new(source, session);

    // A saved session skips the login screen
    if restore_session {
        load_dashboard_screen(&mut app_state).await?;
    }

    // Run the main app loop
    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Show any error message
    if let Err(err) = result {
        println!("Error: {}", err);
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        // Render current screen
        terminal.draw(|f| match app_state.screen {
            AppScreen::Login => {
                if let Some(state) = &mut app_state.login_state {
                    render_login(f, state);
                }
            }
            AppScreen::Signup => {
                if let Some(state) = &mut app_state.signup_state {
                    render_signup(f, state);
                }
            }
            AppScreen::Dashboard => {
                if let Some(state) = &mut app_state.dashboard_state {
                    render_dashboard(f, state);
                }
            }
            AppScreen::Clients => {
                if let Some(state) = &mut app_state.clients_state {
                    render_clients(f, state);
                }
            }
            AppScreen::ClientWizard => {
                if let Some(state) = &mut app_state.client_wizard_state {
                    render_client_wizard(f, state);
                }
            }
            AppScreen::Projects => {
                if let Some(state) = &mut app_state.projects_state {
                    render_projects(f, state);
                }
            }
            AppScreen::ProjectWizard => {
                if let Some(state) = &mut app_state.project_wizard_state {
                    render_project_wizard(f, state);
                }
            }
        })?;

        // Handle input for current screen
        let should_quit = match app_state.screen {
            AppScreen::Login => handle_login_screen(app_state).await?,
            AppScreen::Signup => handle_signup_screen(app_state).await?,
            AppScreen::Dashboard => handle_dashboard_screen(app_state).await?,
            AppScreen::Clients => handle_clients_screen(app_state).await?,
            AppScreen::ClientWizard => handle_client_wizard_screen(app_state).await?,
            AppScreen::Projects => handle_projects_screen(app_state).await?,
            AppScreen::ProjectWizard => handle_project_wizard_screen(app_state).await?,
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

/// Drop the rejected session and return to the login screen.
fn expire_session(app_state: &mut AppState) -> Result<()> {
    log::warn!("session rejected by the server, logging out");
    app_state.session.clear()?;
    app_state.source.logout();
    app_state.login_state = Some(LoginState::with_notice(
        "Session expired. Please login again.".to_string(),
    ));
    app_state.screen = AppScreen::Login;
    Ok(())
}

async fn load_dashboard_screen(app_state: &mut AppState) -> Result<()> {
    let stats = match app_state.source.stats().await {
        Ok(stats) => stats,
        Err(ApiError::Authorization) => return expire_session(app_state),
        Err(err) => {
            log::warn!("loading dashboard stats failed: {err}");
            DashboardStats::default()
        }
    };

    let user_name = app_state.user_name();
    app_state.dashboard_state = Some(DashboardState::new(stats, user_name));
    app_state.screen = AppScreen::Dashboard;
    Ok(())
}

async fn load_clients_screen(app_state: &mut AppState) -> Result<()> {
    if app_state.clients_state.is_none() {
        app_state.clients_state = Some(ClientsState::new(Page::empty(1, clients::PAGE_SIZE)));
    }
    let Some(descriptor) = app_state.clients_state.as_ref().map(|s| s.descriptor()) else {
        return Ok(());
    };

    match app_state.source.list_clients(&descriptor).await {
        Ok(page) => {
            if let Some(state) = &mut app_state.clients_state {
                state.set_page(page);
            }
        }
        Err(ApiError::Authorization) => return expire_session(app_state),
        Err(err) => {
            log::warn!("loading clients failed: {err}");
            if let Some(state) = &mut app_state.clients_state {
                state.set_load_error(err.user_message());
            }
        }
    }

    app_state.screen = AppScreen::Clients;
    Ok(())
}

async fn open_projects_screen(
    app_state: &mut AppState,
    client_filter: Option<(String, String)>,
) -> Result<()> {
    app_state.projects_state = Some(ProjectsState::new(
        Page::empty(1, projects::PAGE_SIZE),
        client_filter,
    ));
    reload_projects_screen(app_state).await
}

async fn reload_projects_screen(app_state: &mut AppState) -> Result<()> {
    let Some(descriptor) = app_state.projects_state.as_ref().map(|s| s.descriptor()) else {
        return Ok(());
    };

    match app_state.source.list_projects(&descriptor).await {
        Ok(page) => {
            if let Some(state) = &mut app_state.projects_state {
                state.set_page(page);
            }
        }
        Err(ApiError::Authorization) => return expire_session(app_state),
        Err(err) => {
            log::warn!("loading projects failed: {err}");
            if let Some(state) = &mut app_state.projects_state {
                state.set_load_error(err.user_message());
            }
        }
    }

    app_state.screen = AppScreen::Projects;
    Ok(())
}

/// Client choices offered by the project wizard.
async fn client_choices(source: &DataSource) -> Result<Vec<(String, String)>, ApiError> {
    let query = QueryDescriptor::new(1, 100).expect("static page bounds");
    let page = source.list_clients(&query).await?;
    Ok(page
        .items
        .into_iter()
        .map(|client| (client.id, client.name))
        .collect())
}

async fn handle_login_screen(app_state: &mut AppState) -> Result<bool> {
    let Some(state) = &mut app_state.login_state else {
        return Ok(false);
    };

    match handle_login_input(state)? {
        Some(LoginAction::Exit) => return Ok(true),
        Some(LoginAction::GotoSignup) => {
            app_state.signup_state = Some(SignupState::new());
            app_state.screen = AppScreen::Signup;
        }
        Some(LoginAction::Submit { email, password }) => {
            match app_state.source.login(&email, &password).await {
                Ok((token, user)) => {
                    app_state.session.store(token, user)?;
                    load_dashboard_screen(app_state).await?;
                }
                Err(err) => {
                    // A 401 on the login call itself means bad credentials,
                    // not an expired session.
                    let notice = match err {
                        ApiError::Authorization => "Invalid email or password.".to_string(),
                        other => other.user_message(),
                    };
                    if let Some(state) = &mut app_state.login_state {
                        state.finish_submit(Some(notice));
                    }
                }
            }
        }
        None => {}
    }

    Ok(false)
}

async fn handle_signup_screen(app_state: &mut AppState) -> Result<bool> {
    let Some(state) = &mut app_state.signup_state else {
        return Ok(false);
    };

    match handle_signup_input(state)? {
        Some(SignupAction::GotoLogin) => {
            app_state.login_state = Some(LoginState::new());
            app_state.screen = AppScreen::Login;
        }
        Some(SignupAction::Submit {
            name,
            email,
            password,
        }) => match app_state.source.signup(&name, &email, &password).await {
            Ok((token, user)) => {
                app_state.session.store(token, user)?;
                load_dashboard_screen(app_state).await?;
            }
            Err(ApiError::Validation(errors)) => {
                // Server-side field rejections land on the same inline slots
                // as the local validators.
                if let Some(state) = &mut app_state.signup_state {
                    state.errors = errors.into();
                    state.finish_submit(None);
                }
            }
            Err(err) => {
                if let Some(state) = &mut app_state.signup_state {
                    state.finish_submit(Some(err.user_message()));
                }
            }
        },
        None => {}
    }

    Ok(false)
}

async fn handle_dashboard_screen(app_state: &mut AppState) -> Result<bool> {
    let Some(state) = &mut app_state.dashboard_state else {
        return Ok(false);
    };

    match handle_dashboard_input(state)? {
        Some(DashboardAction::Exit) => return Ok(true),
        Some(DashboardAction::OpenClients) => {
            app_state.clients_state = None;
            load_clients_screen(app_state).await?;
        }
        Some(DashboardAction::OpenProjects) => {
            open_projects_screen(app_state, None).await?;
        }
        Some(DashboardAction::Logout) => {
            app_state.session.clear()?;
            app_state.source.logout();
            app_state.login_state = Some(LoginState::new());
            app_state.screen = AppScreen::Login;
        }
        None => {}
    }

    Ok(false)
}

async fn handle_clients_screen(app_state: &mut AppState) -> Result<bool> {
    let Some(state) = &mut app_state.clients_state else {
        return Ok(false);
    };

    match handle_clients_input(state)? {
        Some(ClientAction::Back) => {
            load_dashboard_screen(app_state).await?;
        }
        Some(ClientAction::Reload) => {
            load_clients_screen(app_state).await?;
        }
        Some(ClientAction::NewClient) => {
            app_state.client_wizard_state = Some(ClientWizardState::new());
            app_state.screen = AppScreen::ClientWizard;
        }
        Some(ClientAction::EditClient(id)) => match app_state.source.get_client(&id).await {
            Ok(client) => {
                app_state.client_wizard_state = Some(ClientWizardState::from_existing(&client));
                app_state.screen = AppScreen::ClientWizard;
            }
            Err(ApiError::Authorization) => expire_session(app_state)?,
            Err(err) => {
                if let Some(state) = &mut app_state.clients_state {
                    state.set_load_error(err.user_message());
                }
            }
        },
        Some(ClientAction::DeleteClient(id)) => {
            match app_state.source.delete_client(&id).await {
                Ok(()) => load_clients_screen(app_state).await?,
                Err(ApiError::Authorization) => expire_session(app_state)?,
                Err(err) => {
                    if let Some(state) = &mut app_state.clients_state {
                        state.set_load_error(err.user_message());
                    }
                }
            }
        }
        Some(ClientAction::ViewProjects(id)) => {
            let name = app_state
                .clients_state
                .as_ref()
                .and_then(|s| s.selected_client())
                .map(|c| c.name.clone())
                .unwrap_or_default();
            open_projects_screen(app_state, Some((id, name))).await?;
        }
        None => {}
    }

    Ok(false)
}

async fn handle_client_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    let Some(state) = &mut app_state.client_wizard_state else {
        return Ok(false);
    };

    match handle_client_wizard_input(state)? {
        Some(ClientWizardAction::Cancel) => {
            load_clients_screen(app_state).await?;
        }
        Some(ClientWizardAction::Save { id, draft }) => {
            let result = match &id {
                Some(id) => app_state.source.update_client(id, draft).await,
                None => app_state.source.create_client(draft).await,
            };
            match result {
                Ok(_) => load_clients_screen(app_state).await?,
                Err(ApiError::Authorization) => expire_session(app_state)?,
                Err(ApiError::Validation(errors)) => {
                    if let Some(state) = &mut app_state.client_wizard_state {
                        state.errors = errors.into();
                    }
                }
                Err(err) => {
                    if let Some(state) = &mut app_state.client_wizard_state {
                        state.notice = Some(err.user_message());
                    }
                }
            }
        }
        None => {}
    }

    Ok(false)
}

async fn handle_projects_screen(app_state: &mut AppState) -> Result<bool> {
    let Some(state) = &mut app_state.projects_state else {
        return Ok(false);
    };

    match handle_projects_input(state)? {
        Some(ProjectAction::Back) => {
            // A client-scoped list returns to the clients screen; the global
            // list returns to the dashboard.
            if app_state
                .projects_state
                .as_ref()
                .is_some_and(|s| s.client_id().is_some())
            {
                load_clients_screen(app_state).await?;
            } else {
                load_dashboard_screen(app_state).await?;
            }
        }
        Some(ProjectAction::Reload) => {
            reload_projects_screen(app_state).await?;
        }
        Some(ProjectAction::NewProject) => {
            let preselect = app_state
                .projects_state
                .as_ref()
                .and_then(|s| s.client_id());
            match client_choices(&app_state.source).await {
                Ok(choices) => {
                    app_state.project_wizard_state =
                        Some(ProjectWizardState::new(choices, preselect));
                    app_state.screen = AppScreen::ProjectWizard;
                }
                Err(ApiError::Authorization) => expire_session(app_state)?,
                Err(err) => {
                    if let Some(state) = &mut app_state.projects_state {
                        state.set_load_error(err.user_message());
                    }
                }
            }
        }
        Some(ProjectAction::EditProject(id)) => {
            let loaded = match app_state.source.get_project(&id).await {
                Ok(project) => match client_choices(&app_state.source).await {
                    Ok(choices) => Ok((project, choices)),
                    Err(err) => Err(err),
                },
                Err(err) => Err(err),
            };
            match loaded {
                Ok((project, choices)) => {
                    app_state.project_wizard_state =
                        Some(ProjectWizardState::from_existing(&project, choices));
                    app_state.screen = AppScreen::ProjectWizard;
                }
                Err(ApiError::Authorization) => expire_session(app_state)?,
                Err(err) => {
                    if let Some(state) = &mut app_state.projects_state {
                        state.set_load_error(err.user_message());
                    }
                }
            }
        }
        Some(ProjectAction::DeleteProject(id)) => {
            match app_state.source.delete_project(&id).await {
                Ok(()) => reload_projects_screen(app_state).await?,
                Err(ApiError::Authorization) => expire_session(app_state)?,
                Err(err) => {
                    if let Some(state) = &mut app_state.projects_state {
                        state.set_load_error(err.user_message());
                    }
                }
            }
        }
        None => {}
    }

    Ok(false)
}

async fn handle_project_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    let Some(state) = &mut app_state.project_wizard_state else {
        return Ok(false);
    };

    match handle_project_wizard_input(state)? {
        Some(ProjectWizardAction::Cancel) => {
            reload_projects_screen(app_state).await?;
        }
        Some(ProjectWizardAction::Save { id, draft }) => {
            let result = match &id {
                Some(id) => app_state.source.update_project(id, draft).await,
                None => app_state.source.create_project(draft).await,
            };
            match result {
                Ok(_) => reload_projects_screen(app_state).await?,
                Err(ApiError::Authorization) => expire_session(app_state)?,
                Err(ApiError::Validation(errors)) => {
                    if let Some(state) = &mut app_state.project_wizard_state {
                        state.errors = errors.into();
                    }
                }
                Err(err) => {
                    if let Some(state) = &mut app_state.project_wizard_state {
                        state.notice = Some(err.user_message());
                    }
                }
            }
        }
        None => {}
    }

    Ok(false)
}
