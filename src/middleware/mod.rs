pub mod cache;
pub mod session;

pub use cache::cache_control_middleware;
pub use session::{Session, session_middleware};
