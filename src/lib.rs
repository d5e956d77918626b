pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod secrets;
pub mod server;

pub use api::{ProxyRequest, ProxyResponse};
pub use error::ApiError;
pub use handlers::HandlerContext;
