pub mod auth;
pub mod error;
pub mod extract;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use extract::JsonBody;
pub use server::{create_router, start_server, AppState, AuthRedirects};
