pub mod config;
pub mod cookie;
pub mod error;
pub mod form;
pub mod logging;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod template;

pub use config::Config;
pub use routes::AppState;
pub use server::app;
