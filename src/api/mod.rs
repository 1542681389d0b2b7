pub mod agents;
pub mod enhance;
pub mod error;
pub mod handler_utils;
pub mod insights;
pub mod routes;
pub mod server;
pub mod styles;
