//! Typed user intents consumed by the monitor loop
//!
//! The presentation side is a pure translator: whatever UI events it
//! receives become `MonitorCommand`s on the channel, and only the
//! monitor loop mutates state.

use tokio::sync::{mpsc, oneshot};

use crate::domain::ContractVerdict;
use crate::shared::errors::ValidationError;
use crate::shared::types::ThresholdKind;

/// Shortest accepted polling interval
pub const MIN_INTERVAL_SECS: u64 = 5;

#[derive(Debug)]
pub enum MonitorCommand {
    /// Track a new instrument (validated, set semantics)
    AddInstrument(String),
    /// Stop tracking an instrument and drop its history
    RemoveInstrument(String),
    /// Nudge a funding threshold by a signed delta
    AdjustThreshold { which: ThresholdKind, delta: f64 },
    /// Change the polling interval; takes effect on the next tick
    SetInterval(u64),
    /// Run a cycle now and reset the timer
    Refresh,
    /// Produce the delimited-text history snapshot
    ExportSnapshot { reply: oneshot::Sender<String> },
    /// Check a contract address against the allow-list
    VerifyContract {
        network: String,
        address: String,
        reply: oneshot::Sender<ContractVerdict>,
    },
    /// Stop the monitor loop
    Shutdown,
}

/// Validate and normalize an instrument id to the `BASE_QUOTE` shape
pub fn validate_instrument(raw: &str) -> Result<String, ValidationError> {
    let id = raw.trim().to_uppercase();
    let mut parts = id.split('_');
    let well_formed = matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(base), Some(quote), None)
            if !base.is_empty()
                && !quote.is_empty()
                && base.chars().all(|c| c.is_ascii_alphanumeric())
                && quote.chars().all(|c| c.is_ascii_alphanumeric())
    );

    if well_formed {
        Ok(id)
    } else {
        Err(ValidationError::BadInstrumentFormat(raw.to_string()))
    }
}

pub fn validate_interval(secs: u64) -> Result<u64, ValidationError> {
    if secs >= MIN_INTERVAL_SECS {
        Ok(secs)
    } else {
        Err(ValidationError::BadInterval(secs))
    }
}

/// Cloneable sender handed to collaborators (UI adapters, signal
/// handlers). Send failures mean the monitor is already gone and are
/// ignored.
#[derive(Clone)]
pub struct MonitorHandle {
    tx: mpsc::Sender<MonitorCommand>,
}

impl MonitorHandle {
    pub fn new(tx: mpsc::Sender<MonitorCommand>) -> Self {
        Self { tx }
    }

    pub async fn send(&self, command: MonitorCommand) {
        let _ = self.tx.send(command).await;
    }

    pub async fn refresh(&self) {
        self.send(MonitorCommand::Refresh).await;
    }

    pub async fn shutdown(&self) {
        self.send(MonitorCommand::Shutdown).await;
    }

    /// Request the export snapshot and wait for the reply
    pub async fn export_snapshot(&self) -> Option<String> {
        let (reply, rx) = oneshot::channel();
        self.send(MonitorCommand::ExportSnapshot { reply }).await;
        rx.await.ok()
    }

    pub async fn verify_contract(&self, network: &str, address: &str) -> Option<ContractVerdict> {
        let (reply, rx) = oneshot::channel();
        self.send(MonitorCommand::VerifyContract {
            network: network.to_string(),
            address: address.to_string(),
            reply,
        })
        .await;
        rx.await.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_instrument_accepts_pair_shape() {
        assert_eq!(validate_instrument("BTC_USDT").unwrap(), "BTC_USDT");
        assert_eq!(validate_instrument(" pepe_usdt ").unwrap(), "PEPE_USDT");
        assert_eq!(validate_instrument("1INCH_USDT").unwrap(), "1INCH_USDT");
    }

    #[test]
    fn test_validate_instrument_rejects_malformed() {
        assert!(validate_instrument("BTCUSDT").is_err());
        assert!(validate_instrument("BTC_USDT_PERP").is_err());
        assert!(validate_instrument("_USDT").is_err());
        assert!(validate_instrument("BTC_").is_err());
        assert!(validate_instrument("BTC-USDT").is_err());
        assert!(validate_instrument("").is_err());
    }

    #[test]
    fn test_validate_interval() {
        assert_eq!(validate_interval(60).unwrap(), 60);
        assert!(validate_interval(0).is_err());
        assert!(validate_interval(4).is_err());
    }
}
