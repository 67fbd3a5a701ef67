//! Fixture records seeding local mode.

use chrono::NaiveDate;

use crate::models::{Client, ClientStatus, Project, ProjectStatus};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid fixture date")
}

pub fn clients() -> Vec<Client> {
    vec![
        Client {
            id: "1".to_string(),
            name: "John Smith".to_string(),
            email: "john@techcorp.com".to_string(),
            phone: "+1-555-0123".to_string(),
            company: "TechCorp Inc.".to_string(),
            address: Some("123 Business Ave, NYC".to_string()),
            status: ClientStatus::Active,
            created_at: date(2024, 1, 15),
        },
        Client {
            id: "2".to_string(),
            name: "Sarah Johnson".to_string(),
            email: "sarah@designco.com".to_string(),
            phone: "+1-555-0456".to_string(),
            company: "DesignCo".to_string(),
            address: Some("456 Creative St, LA".to_string()),
            status: ClientStatus::Active,
            created_at: date(2024, 2, 20),
        },
        Client {
            id: "3".to_string(),
            name: "Mike Wilson".to_string(),
            email: "mike@startupx.com".to_string(),
            phone: "+1-555-0789".to_string(),
            company: "StartupX".to_string(),
            address: None,
            status: ClientStatus::Inactive,
            created_at: date(2024, 3, 10),
        },
    ]
}

pub fn projects() -> Vec<Project> {
    vec![
        Project {
            id: "1".to_string(),
            title: "Website Redesign".to_string(),
            description: "Complete overhaul of the corporate website".to_string(),
            client_id: "1".to_string(),
            status: ProjectStatus::InProgress,
            start_date: date(2024, 2, 1),
            end_date: Some(date(2024, 6, 30)),
            budget: 25000.0,
            created_at: date(2024, 1, 20),
        },
        Project {
            id: "2".to_string(),
            title: "Mobile App MVP".to_string(),
            description: "First release of the customer-facing mobile app".to_string(),
            client_id: "1".to_string(),
            status: ProjectStatus::Pending,
            start_date: date(2024, 7, 1),
            end_date: None,
            budget: 48000.0,
            created_at: date(2024, 3, 5),
        },
        Project {
            id: "3".to_string(),
            title: "Brand Guidelines".to_string(),
            description: "Logo refresh and brand style guide".to_string(),
            client_id: "2".to_string(),
            status: ProjectStatus::Completed,
            start_date: date(2024, 3, 1),
            end_date: Some(date(2024, 4, 15)),
            budget: 8000.0,
            created_at: date(2024, 2, 25),
        },
        Project {
            id: "4".to_string(),
            title: "Landing Page".to_string(),
            description: "Marketing landing page for the product launch".to_string(),
            client_id: "3".to_string(),
            status: ProjectStatus::Pending,
            start_date: date(2024, 5, 1),
            end_date: None,
            budget: 3500.0,
            created_at: date(2024, 3, 12),
        },
    ]
}
