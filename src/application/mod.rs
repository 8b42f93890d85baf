//! Application layer - orchestration, user intents, presentation

pub mod commands;
pub mod export;
pub mod monitor;
pub mod sink;
