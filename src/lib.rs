pub mod catalog;
pub mod config;
pub mod error;
pub mod models;

pub use error::{Result, VoicelibError};
