// Registry services
// Services run operations across managers: command processing, background queries, settings.

pub mod command_processor;
pub mod query_tracker;
pub mod settings_engine;
