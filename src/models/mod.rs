mod client;
mod project;
mod user;

pub use client::{Client, ClientDraft, ClientStatus};
pub use project::{Project, ProjectDraft, ProjectStatus};
pub use user::{Role, User};
