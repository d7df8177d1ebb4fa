pub mod policy;
pub mod service;
pub mod state_machine;
