pub mod completions;
pub mod fetch;

pub use fetch::FetchCommand;
