pub mod commands;
pub mod config;
pub mod dtos;
pub mod event_handlers;
pub mod queries;
pub mod services;
