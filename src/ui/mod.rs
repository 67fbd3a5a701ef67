pub mod components;

pub mod client_wizard;
pub mod clients;
pub mod dashboard;
pub mod login;
pub mod project_wizard;
pub mod projects;
pub mod signup;
