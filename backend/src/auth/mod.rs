pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use middleware::Caller;
