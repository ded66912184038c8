#![doc = "The `todo_api` library crate."]
#![doc = ""]
#![doc = "Multi-user todo list service: JWT sessions, bcrypt credentials and"]
#![doc = "owner-scoped task storage behind an Actix Web HTTP API. The binary"]
#![doc = "(`main.rs`) loads the configuration, connects the store and serves"]
#![doc = "`routes::config`."]

pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod tasks;

pub use crate::config::Config;
pub use crate::error::AppError;
pub use crate::state::AppState;
