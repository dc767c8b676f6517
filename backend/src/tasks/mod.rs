pub mod guard;
pub mod handlers;
pub mod query;
