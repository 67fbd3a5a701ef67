//! Terminal dashboard for administering clients and their projects, backed
//! by either a remote REST API or an in-memory fixture store.

pub mod api;
pub mod config;
pub mod models;
pub mod query;
pub mod session;
pub mod source;
pub mod store;
pub mod ui;
pub mod validate;
