//! Domain layer - core business logic and entities

mod anomaly;
mod contracts;
mod history;
mod signal;

pub use anomaly::{AnomalyLog, AnomalyRecord};
pub use contracts::{verify as verify_contract, ContractVerdict};
pub use history::{HistoryBook, HistoryEntry};
pub use signal::{AlertLabel, SignalEngine};
