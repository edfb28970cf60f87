pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod records;
pub mod storage;

pub use error::{AppError, Result};
