// Shared type definitions
// Each submodule defines types used across the registry.

pub mod command;
pub mod context;
pub mod errors;
pub mod history;
pub mod settings;
pub mod tab;
pub mod window;
