//! REST interface for the warning service

pub mod handlers;
pub mod models;
pub mod routes;

pub use routes::create_router;
