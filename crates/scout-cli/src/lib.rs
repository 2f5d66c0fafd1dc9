//! Terminal front end for a Scout server

pub mod commands;
pub mod config;
pub mod session;

pub use commands::Command;
pub use config::CliConfig;
pub use session::Session;
