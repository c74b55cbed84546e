pub mod app;
pub mod authz;
pub mod config;
pub mod db;
pub mod errors;
pub mod ident;
pub mod jwt;
pub mod models;
pub mod patch;
pub mod routes;
pub mod session;
pub mod store;

// Re-export commonly used items for tests
pub use app::create_app;
pub use config::HttpConfig;
