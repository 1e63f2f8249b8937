pub mod aws;
pub mod cli;
pub mod commands;
pub mod constants;
pub mod error;
pub mod export;

pub use error::FetchSecretError;
