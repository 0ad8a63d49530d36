pub mod adherence_commands;
pub mod command_handler;
pub mod handlers;
