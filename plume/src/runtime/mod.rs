pub mod commands;
pub mod executor;
pub mod scripts;

pub use executor::{ScriptReply, execute_command};
