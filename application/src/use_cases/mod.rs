//! Use cases (application services)

pub mod conversation_controller;
pub mod hydrate_history;
