use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::query::Queryable;
use crate::store::Identified;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    Pending,
    InProgress,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Pending => "pending",
            ProjectStatus::InProgress => "in-progress",
            ProjectStatus::Completed => "completed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProjectStatus::Pending => "Pending",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    pub client_id: String,
    pub status: ProjectStatus,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub budget: f64,
    pub created_at: NaiveDate,
}

/// Request payload for creating or updating a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDraft {
    pub title: String,
    pub description: String,
    pub client_id: String,
    pub status: ProjectStatus,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub budget: f64,
}

impl ProjectDraft {
    pub fn into_project(self, id: String, created_at: NaiveDate) -> Project {
        Project {
            id,
            title: self.title,
            description: self.description,
            client_id: self.client_id,
            status: self.status,
            start_date: self.start_date,
            end_date: self.end_date,
            budget: self.budget,
            created_at,
        }
    }
}

impl From<&Project> for ProjectDraft {
    fn from(project: &Project) -> Self {
        Self {
            title: project.title.clone(),
            description: project.description.clone(),
            client_id: project.client_id.clone(),
            status: project.status,
            start_date: project.start_date,
            end_date: project.end_date,
            budget: project.budget,
        }
    }
}

impl Identified for Project {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Queryable for Project {
    fn search_text(&self) -> Vec<&str> {
        vec![&self.title, &self.description]
    }

    fn field(&self, key: &str) -> Option<String> {
        match key {
            "id" => Some(self.id.clone()),
            "title" => Some(self.title.clone()),
            "clientId" => Some(self.client_id.clone()),
            "status" => Some(self.status.as_str().to_string()),
            "startDate" => Some(self.start_date.to_string()),
            "createdAt" => Some(self.created_at.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_kebab_case_wire_strings() {
        let json = serde_json::to_string(&ProjectStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        let status: ProjectStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(status, ProjectStatus::Completed);
    }
}
