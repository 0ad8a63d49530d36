pub mod bootstrap;
pub mod ipc;
pub mod state;
