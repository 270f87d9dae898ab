pub mod auth;
pub mod db;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod models;
pub mod notify;

pub use db::create_pool;
pub use error::AppError;
