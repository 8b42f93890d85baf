//! Common types used across the application

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::utils::round_to;

/// Which public endpoint family a deployment polls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Spot tickers: last price, 24h change, base volume
    Spot,
    /// USDT perpetual contracts: funding rate only
    Futures,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Spot => "spot",
            SourceKind::Futures => "futures",
        }
    }
}

/// One polled observation for one instrument. Immutable once created.
///
/// `value` is the last price for spot sources and the funding rate for
/// futures sources. Fields the endpoint does not supply stay `None`;
/// fields that fail numeric parsing come through as NaN.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    pub instrument: String,
    pub value: f64,
    pub change_24h: Option<f64>,
    pub volume: Option<f64>,
    pub time: DateTime<Utc>,
}

impl Sample {
    pub fn new(instrument: impl Into<String>, value: f64) -> Self {
        Self {
            instrument: instrument.into(),
            value,
            change_24h: None,
            volume: None,
            time: Utc::now(),
        }
    }

    pub fn with_change(mut self, change_24h: f64) -> Self {
        self.change_24h = Some(change_24h);
        self
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }
}

/// Two-step monotonicity trend over the last three history entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Rising,
    Falling,
    Flat,
    InsufficientData,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Rising => "rising",
            Trend::Falling => "falling",
            Trend::Flat => "flat",
            Trend::InsufficientData => "insufficient data",
        }
    }
}

/// Which funding threshold a user adjustment targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdKind {
    Long,
    Short,
}

/// Fixed step a single threshold adjustment applies
pub const THRESHOLD_STEP: f64 = 0.0005;

/// Decimal places thresholds are rounded to after each adjustment
pub const THRESHOLD_PRECISION: u32 = 6;

/// User-tunable monitor state, persisted across restarts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Tracked instrument ids; no duplicates, insertion order preserved
    pub instruments: Vec<String>,
    /// Polling interval in seconds
    pub interval_secs: u64,
    /// Funding rate at or below this flags strong long risk (negative)
    pub long_threshold: f64,
    /// Funding rate at or above this flags strong short risk (positive)
    pub short_threshold: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            instruments: vec![
                "BTC_USDT".to_string(),
                "ETH_USDT".to_string(),
                "SOL_USDT".to_string(),
            ],
            interval_secs: 90,
            long_threshold: -0.001,
            short_threshold: 0.001,
        }
    }
}

impl MonitorConfig {
    pub fn is_tracked(&self, instrument: &str) -> bool {
        self.instruments.iter().any(|i| i == instrument)
    }

    /// Add an instrument, keeping set semantics. Returns false on duplicate.
    pub fn add_instrument(&mut self, instrument: String) -> bool {
        if self.is_tracked(&instrument) {
            return false;
        }
        self.instruments.push(instrument);
        true
    }

    /// Remove an instrument. Returns false when it was not tracked.
    pub fn remove_instrument(&mut self, instrument: &str) -> bool {
        let before = self.instruments.len();
        self.instruments.retain(|i| i != instrument);
        self.instruments.len() != before
    }

    /// Apply a threshold delta and round away accumulated float noise
    pub fn adjust_threshold(&mut self, which: ThresholdKind, delta: f64) {
        let slot = match which {
            ThresholdKind::Long => &mut self.long_threshold,
            ThresholdKind::Short => &mut self.short_threshold,
        };
        *slot = round_to(*slot + delta, THRESHOLD_PRECISION);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instrument_set_semantics() {
        let mut config = MonitorConfig::default();
        assert!(!config.add_instrument("BTC_USDT".to_string()));
        assert!(config.add_instrument("PEPE_USDT".to_string()));
        assert_eq!(
            config.instruments,
            vec!["BTC_USDT", "ETH_USDT", "SOL_USDT", "PEPE_USDT"]
        );

        assert!(config.remove_instrument("ETH_USDT"));
        assert!(!config.remove_instrument("ETH_USDT"));
        assert_eq!(config.instruments, vec!["BTC_USDT", "SOL_USDT", "PEPE_USDT"]);
    }

    #[test]
    fn test_threshold_adjustment_rounds() {
        let mut config = MonitorConfig::default();
        for _ in 0..7 {
            config.adjust_threshold(ThresholdKind::Short, THRESHOLD_STEP);
        }
        // 0.001 + 7 * 0.0005 with no float drift
        assert_eq!(config.short_threshold, 0.0045);

        config.adjust_threshold(ThresholdKind::Long, -THRESHOLD_STEP);
        assert_eq!(config.long_threshold, -0.0015);
    }
}
