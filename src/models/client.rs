use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::query::Queryable;
use crate::store::Identified;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Active,
    Inactive,
}

impl ClientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::Active => "active",
            ClientStatus::Inactive => "inactive",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ClientStatus::Active => "Active",
            ClientStatus::Inactive => "Inactive",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub status: ClientStatus,
    pub created_at: NaiveDate,
}

/// Request payload for creating or updating a client. The identity and
/// creation date are assigned by whichever side owns the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub status: ClientStatus,
}

impl ClientDraft {
    /// Materialize a full record from this draft, used in local mode where
    /// no server assigns identity.
    pub fn into_client(self, id: String, created_at: NaiveDate) -> Client {
        Client {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            company: self.company,
            address: self.address,
            status: self.status,
            created_at,
        }
    }
}

impl From<&Client> for ClientDraft {
    fn from(client: &Client) -> Self {
        Self {
            name: client.name.clone(),
            email: client.email.clone(),
            phone: client.phone.clone(),
            company: client.company.clone(),
            address: client.address.clone(),
            status: client.status,
        }
    }
}

impl Identified for Client {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Queryable for Client {
    fn search_text(&self) -> Vec<&str> {
        vec![&self.name, &self.email, &self.company]
    }

    fn field(&self, key: &str) -> Option<String> {
        match key {
            "id" => Some(self.id.clone()),
            "name" => Some(self.name.clone()),
            "email" => Some(self.email.clone()),
            "company" => Some(self.company.clone()),
            "status" => Some(self.status.as_str().to_string()),
            "createdAt" => Some(self.created_at.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_wire_strings() {
        let json = serde_json::to_string(&ClientStatus::Inactive).unwrap();
        assert_eq!(json, "\"inactive\"");
        let status: ClientStatus = serde_json::from_str("\"active\"").unwrap();
        assert_eq!(status, ClientStatus::Active);
    }

    #[test]
    fn client_deserializes_camel_case_payload() {
        let json = r#"{
            "id": "1",
            "name": "John Smith",
            "email": "john@techcorp.com",
            "phone": "+1-555-0123",
            "company": "TechCorp Inc.",
            "status": "active",
            "createdAt": "2024-01-15"
        }"#;
        let client: Client = serde_json::from_str(json).unwrap();
        assert_eq!(client.company, "TechCorp Inc.");
        assert_eq!(client.address, None);
        assert_eq!(client.created_at.to_string(), "2024-01-15");
    }
}
