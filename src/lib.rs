pub mod annotation;
pub mod config;
pub mod error;
pub mod filters;
pub mod handlers;
pub mod identifier;
pub mod models;
pub mod pipeline;
pub mod projection;
pub mod so_terms;
pub mod storage;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
