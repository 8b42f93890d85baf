//! Tickmon - Gate.io ticker & funding-rate anomaly monitor
//! Built with Domain-Driven Design principles

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

// Re-export main types for convenience
pub use application::commands::{MonitorCommand, MonitorHandle};
pub use application::monitor::{MarketMonitor, MonitorState};
pub use domain::{AlertLabel, AnomalyLog, HistoryBook, SignalEngine};
pub use shared::types::{MonitorConfig, Sample, SourceKind, Trend};
