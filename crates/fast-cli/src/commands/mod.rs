//! CLI subcommand implementations.

pub mod correct;
pub mod delete;
pub mod history;
pub mod start;
pub mod status;
pub mod stop;
pub mod timeline;
