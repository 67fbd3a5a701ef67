//! Thin REST client for the administration API. Every endpoint returns a
//! `{success, message, data}` envelope (list endpoints add a `pagination`
//! block); transport and status failures are normalized into `ApiError`
//! here so no raw protocol detail reaches the screens.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Method, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::{Client, ClientDraft, Project, ProjectDraft, User};
use crate::query::{Page, QueryDescriptor};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(BTreeMap<String, String>),
    #[error("resource not found")]
    NotFound,
    #[error("session expired")]
    Authorization,
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("server error: {0}")]
    Server(String),
}

impl ApiError {
    /// The fixed message shown to the operator for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation(errors) => errors
                .values()
                .next()
                .cloned()
                .unwrap_or_else(|| "Validation error occurred.".to_string()),
            ApiError::NotFound => "Resource not found.".to_string(),
            ApiError::Authorization => "Session expired. Please login again.".to_string(),
            ApiError::Network(_) => "Network error. Please check your connection.".to_string(),
            ApiError::Server(message) if !message.is_empty() => message.clone(),
            ApiError::Server(_) => "An unexpected error occurred.".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct PageInfo {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub pages: usize,
}

#[derive(Debug, Deserialize)]
pub struct Paginated<T> {
    pub success: bool,
    pub message: String,
    pub data: Vec<T>,
    pub pagination: PageInfo,
}

impl<T> From<Paginated<T>> for Page<T> {
    fn from(body: Paginated<T>) -> Self {
        Page {
            items: body.data,
            total: body.pagination.total,
            page: body.pagination.page,
            limit: body.pagination.limit,
            pages: body.pagination.pages,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    errors: Option<BTreeMap<String, String>>,
}

#[derive(Debug, serde::Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, serde::Serialize)]
struct SignupPayload<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

pub struct Api {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl Api {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("{} {}", method, url);
        let mut builder = self.http.request(method, url);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }
        Err(Self::error_for(status, response).await)
    }

    async fn expect_success(response: Response) -> Result<(), ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(Self::error_for(status, response).await)
    }

    async fn error_for(status: StatusCode, response: Response) -> ApiError {
        let body: Option<ErrorBody> = response.json().await.ok();
        let message = body.as_ref().and_then(|b| b.message.clone());
        match status.as_u16() {
            401 => ApiError::Authorization,
            404 => ApiError::NotFound,
            422 => ApiError::Validation(body.and_then(|b| b.errors).unwrap_or_default()),
            _ => ApiError::Server(
                message.unwrap_or_else(|| format!("request failed with status {status}")),
            ),
        }
    }

    // Auth operations

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let response = self
            .request(Method::POST, "/auth/login")
            .json(&Credentials { email, password })
            .send()
            .await?;
        Self::parse(response).await
    }

    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let response = self
            .request(Method::POST, "/auth/signup")
            .json(&SignupPayload {
                name,
                email,
                password,
            })
            .send()
            .await?;
        Self::parse(response).await
    }

    pub async fn profile(&self) -> Result<User, ApiError> {
        let response = self.request(Method::GET, "/auth/profile").send().await?;
        let envelope: Envelope<User> = Self::parse(response).await?;
        Ok(envelope.data)
    }

    // Client operations

    pub async fn list_clients(&self, query: &QueryDescriptor) -> Result<Page<Client>, ApiError> {
        let response = self
            .request(Method::GET, "/clients")
            .query(&query.to_query_pairs())
            .send()
            .await?;
        let body: Paginated<Client> = Self::parse(response).await?;
        Ok(body.into())
    }

    pub async fn get_client(&self, id: &str) -> Result<Client, ApiError> {
        let response = self
            .request(Method::GET, &format!("/clients/{id}"))
            .send()
            .await?;
        let envelope: Envelope<Client> = Self::parse(response).await?;
        Ok(envelope.data)
    }

    pub async fn create_client(&self, draft: &ClientDraft) -> Result<Client, ApiError> {
        let response = self
            .request(Method::POST, "/clients")
            .json(draft)
            .send()
            .await?;
        let envelope: Envelope<Client> = Self::parse(response).await?;
        Ok(envelope.data)
    }

    pub async fn update_client(&self, id: &str, draft: &ClientDraft) -> Result<Client, ApiError> {
        let response = self
            .request(Method::PUT, &format!("/clients/{id}"))
            .json(draft)
            .send()
            .await?;
        let envelope: Envelope<Client> = Self::parse(response).await?;
        Ok(envelope.data)
    }

    pub async fn delete_client(&self, id: &str) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, &format!("/clients/{id}"))
            .send()
            .await?;
        Self::expect_success(response).await
    }

    // Project operations

    pub async fn list_projects(&self, query: &QueryDescriptor) -> Result<Page<Project>, ApiError> {
        let response = self
            .request(Method::GET, "/projects")
            .query(&query.to_query_pairs())
            .send()
            .await?;
        let body: Paginated<Project> = Self::parse(response).await?;
        Ok(body.into())
    }

    pub async fn get_project(&self, id: &str) -> Result<Project, ApiError> {
        let response = self
            .request(Method::GET, &format!("/projects/{id}"))
            .send()
            .await?;
        let envelope: Envelope<Project> = Self::parse(response).await?;
        Ok(envelope.data)
    }

    pub async fn create_project(&self, draft: &ProjectDraft) -> Result<Project, ApiError> {
        let response = self
            .request(Method::POST, "/projects")
            .json(draft)
            .send()
            .await?;
        let envelope: Envelope<Project> = Self::parse(response).await?;
        Ok(envelope.data)
    }

    pub async fn update_project(
        &self,
        id: &str,
        draft: &ProjectDraft,
    ) -> Result<Project, ApiError> {
        let response = self
            .request(Method::PUT, &format!("/projects/{id}"))
            .json(draft)
            .send()
            .await?;
        let envelope: Envelope<Project> = Self::parse(response).await?;
        Ok(envelope.data)
    }

    pub async fn delete_project(&self, id: &str) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, &format!("/projects/{id}"))
            .send()
            .await?;
        Self::expect_success(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_are_fixed_strings() {
        assert_eq!(
            ApiError::Authorization.user_message(),
            "Session expired. Please login again."
        );
        assert_eq!(ApiError::NotFound.user_message(), "Resource not found.");
        assert_eq!(
            ApiError::Validation(BTreeMap::new()).user_message(),
            "Validation error occurred."
        );
    }

    #[test]
    fn server_errors_surface_the_server_message() {
        let err = ApiError::Server("Internal server error. Please try again later.".to_string());
        assert_eq!(
            err.user_message(),
            "Internal server error. Please try again later."
        );
    }
}
