//! Anomaly and funding-rate classification rules

use serde::{Deserialize, Serialize};

use crate::shared::types::{MonitorConfig, Sample, SourceKind};
use crate::shared::utils::percent_change;

/// 24h change above which a move is flagged as a pump/dump (strict)
pub const PUMP_DUMP_THRESHOLD: f64 = 15.0;

/// Tick-to-tick delta that counts as an abnormal intraday move
pub const DIVERGENCE_DELTA_THRESHOLD: f64 = 10.0;

/// 24h change below which an abnormal intraday move is a divergence
pub const DIVERGENCE_CHANGE_CEILING: f64 = 5.0;

/// 24h change above which thin volume is suspicious
pub const WEAK_PUMP_CHANGE_THRESHOLD: f64 = 10.0;

/// Base-volume floor for the weak-pump heuristic
pub const WEAK_PUMP_VOLUME_FLOOR: f64 = 100_000.0;

/// One classification or alert produced for an instrument in one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertLabel {
    /// 24h change above +15%
    Pump,
    /// 24h change below -15%
    Dump,
    /// Tick-to-tick move disagrees with the reported 24h change
    Divergence,
    /// Strong 24h growth on thin base volume
    WeakPump,
    /// Funding rate at or below the long threshold
    StrongLongRisk,
    /// Negative funding rate above the long threshold
    WeakLong,
    /// Funding rate at or above the short threshold
    StrongShortRisk,
    /// Positive funding rate below the short threshold
    WeakShort,
    /// Funding rate exactly zero
    Neutral,
}

impl AlertLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLabel::Pump => "pump >15%: possible run-up",
            AlertLabel::Dump => "dump >15%: liquidation cascade?",
            AlertLabel::Divergence => "abnormal move: disagrees with 24h change",
            AlertLabel::WeakPump => "low volume on growth: weak pump",
            AlertLabel::StrongLongRisk => "strong long risk",
            AlertLabel::WeakLong => "weak long",
            AlertLabel::StrongShortRisk => "strong short risk",
            AlertLabel::WeakShort => "weak short",
            AlertLabel::Neutral => "neutral",
        }
    }

    /// Display color hint for the presentation sink
    pub fn color(&self) -> &'static str {
        match self {
            AlertLabel::Pump
            | AlertLabel::Dump
            | AlertLabel::StrongLongRisk
            | AlertLabel::StrongShortRisk => "red",
            AlertLabel::Divergence | AlertLabel::WeakPump => "yellow",
            AlertLabel::WeakLong | AlertLabel::WeakShort => "orange",
            AlertLabel::Neutral => "gray",
        }
    }

    /// Display emoji hint for the presentation sink
    pub fn emoji(&self) -> &'static str {
        match self {
            AlertLabel::Pump
            | AlertLabel::Dump
            | AlertLabel::StrongLongRisk
            | AlertLabel::StrongShortRisk => "🟥",
            AlertLabel::Divergence | AlertLabel::WeakPump => "🟨",
            AlertLabel::WeakLong | AlertLabel::WeakShort => "🟧",
            AlertLabel::Neutral => "⬜",
        }
    }

    /// True for the price/volume anomaly family; those alerts feed the
    /// anomaly log. Funding buckets are classifications, not anomalies.
    pub fn is_anomaly(&self) -> bool {
        matches!(
            self,
            AlertLabel::Pump | AlertLabel::Dump | AlertLabel::Divergence | AlertLabel::WeakPump
        )
    }
}

impl std::fmt::Display for AlertLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Applies threshold and trend rules to the latest sample
pub struct SignalEngine;

impl SignalEngine {
    /// Classify one sample, dispatching on the deployment's source kind.
    /// Returns the matched labels in rule-declaration order.
    pub fn classify(
        source: SourceKind,
        sample: &Sample,
        prior_value: Option<f64>,
        config: &MonitorConfig,
    ) -> Vec<AlertLabel> {
        match source {
            SourceKind::Spot => Self::anomaly_alerts(sample, prior_value),
            SourceKind::Futures => vec![Self::funding_bucket(
                sample.value,
                config.long_threshold,
                config.short_threshold,
            )],
        }
    }

    /// Price/volume anomaly rules. Independent; every matching rule
    /// fires in the same cycle. NaN in a participating field makes its
    /// comparison false, so the rule is simply suppressed.
    pub fn anomaly_alerts(sample: &Sample, prior_value: Option<f64>) -> Vec<AlertLabel> {
        let mut alerts = Vec::new();
        let change = sample.change_24h.unwrap_or(f64::NAN);

        if change > PUMP_DUMP_THRESHOLD {
            alerts.push(AlertLabel::Pump);
        } else if change < -PUMP_DUMP_THRESHOLD {
            alerts.push(AlertLabel::Dump);
        }

        if let Some(prior) = prior_value {
            let diff = percent_change(prior, sample.value);
            if diff.abs() > DIVERGENCE_DELTA_THRESHOLD && change.abs() < DIVERGENCE_CHANGE_CEILING
            {
                alerts.push(AlertLabel::Divergence);
            }
        }

        if change > WEAK_PUMP_CHANGE_THRESHOLD
            && sample.volume.unwrap_or(f64::NAN) < WEAK_PUMP_VOLUME_FLOOR
        {
            alerts.push(AlertLabel::WeakPump);
        }

        alerts
    }

    /// Funding-rate bucketing: exactly one of five labels.
    ///
    /// Thresholds are deliberately not validated against each other;
    /// with a long threshold above the short one the declaration order
    /// below decides the overlap.
    pub fn funding_bucket(rate: f64, long_threshold: f64, short_threshold: f64) -> AlertLabel {
        if rate <= long_threshold {
            AlertLabel::StrongLongRisk
        } else if rate < 0.0 {
            AlertLabel::WeakLong
        } else if rate >= short_threshold {
            AlertLabel::StrongShortRisk
        } else if rate > 0.0 {
            AlertLabel::WeakShort
        } else {
            AlertLabel::Neutral
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spot_sample(value: f64, change: f64, volume: f64) -> Sample {
        Sample::new("PEPE_USDT", value)
            .with_change(change)
            .with_volume(volume)
    }

    #[test]
    fn test_pump_boundary_is_strict() {
        let fired = SignalEngine::anomaly_alerts(&spot_sample(1.0, 16.0, 500_000.0), None);
        assert!(fired.contains(&AlertLabel::Pump));

        let not_fired = SignalEngine::anomaly_alerts(&spot_sample(1.0, 15.0, 500_000.0), None);
        assert!(!not_fired.contains(&AlertLabel::Pump));
    }

    #[test]
    fn test_dump_fires_below_minus_fifteen() {
        let alerts = SignalEngine::anomaly_alerts(&spot_sample(1.0, -16.5, 500_000.0), None);
        assert_eq!(alerts, vec![AlertLabel::Dump]);
    }

    #[test]
    fn test_divergence_rule() {
        // 100 -> 111 is an 11% move against a reported 2% 24h change
        let fired =
            SignalEngine::anomaly_alerts(&spot_sample(111.0, 2.0, 500_000.0), Some(100.0));
        assert_eq!(fired, vec![AlertLabel::Divergence]);

        // 100 -> 105 is only 5%, below the divergence delta
        let not_fired =
            SignalEngine::anomaly_alerts(&spot_sample(105.0, 2.0, 500_000.0), Some(100.0));
        assert!(not_fired.is_empty());
    }

    #[test]
    fn test_weak_pump_on_thin_volume() {
        let fired = SignalEngine::anomaly_alerts(&spot_sample(1.0, 12.0, 50_000.0), None);
        assert_eq!(fired, vec![AlertLabel::WeakPump]);

        let not_fired = SignalEngine::anomaly_alerts(&spot_sample(1.0, 12.0, 200_000.0), None);
        assert!(not_fired.is_empty());
    }

    #[test]
    fn test_multiple_rules_fire_together() {
        // Pump (>15) and weak pump (>10 with thin volume) can coexist,
        // plus a divergence needs |change| < 5 so it stays out here.
        let alerts = SignalEngine::anomaly_alerts(&spot_sample(1.0, 20.0, 50_000.0), None);
        assert_eq!(alerts, vec![AlertLabel::Pump, AlertLabel::WeakPump]);
    }

    #[test]
    fn test_nan_change_suppresses_rules() {
        let sample = Sample::new("PEPE_USDT", 1.0)
            .with_change(f64::NAN)
            .with_volume(50_000.0);
        assert!(SignalEngine::anomaly_alerts(&sample, Some(0.5)).is_empty());
    }

    #[test]
    fn test_missing_change_suppresses_rules() {
        let sample = Sample::new("PEPE_USDT", 1.0);
        assert!(SignalEngine::anomaly_alerts(&sample, None).is_empty());
    }

    #[test]
    fn test_funding_buckets_partition() {
        let long = -0.001;
        let short = 0.001;

        assert_eq!(
            SignalEngine::funding_bucket(-0.002, long, short),
            AlertLabel::StrongLongRisk
        );
        assert_eq!(
            SignalEngine::funding_bucket(-0.001, long, short),
            AlertLabel::StrongLongRisk
        );
        assert_eq!(
            SignalEngine::funding_bucket(-0.0004, long, short),
            AlertLabel::WeakLong
        );
        assert_eq!(
            SignalEngine::funding_bucket(0.0, long, short),
            AlertLabel::Neutral
        );
        assert_eq!(
            SignalEngine::funding_bucket(0.0004, long, short),
            AlertLabel::WeakShort
        );
        assert_eq!(
            SignalEngine::funding_bucket(0.001, long, short),
            AlertLabel::StrongShortRisk
        );
        assert_eq!(
            SignalEngine::funding_bucket(0.01, long, short),
            AlertLabel::StrongShortRisk
        );
    }

    #[test]
    fn test_funding_bucket_is_total_over_sampled_reals() {
        // With long < 0 < short every rate maps to exactly one bucket.
        let long = -0.001;
        let short = 0.001;
        let mut rate = -0.01;
        while rate <= 0.01 {
            let label = SignalEngine::funding_bucket(rate, long, short);
            assert!(matches!(
                label,
                AlertLabel::StrongLongRisk
                    | AlertLabel::WeakLong
                    | AlertLabel::Neutral
                    | AlertLabel::WeakShort
                    | AlertLabel::StrongShortRisk
            ));
            rate += 0.000137;
        }
    }

    #[test]
    fn test_classify_dispatches_on_source() {
        let config = MonitorConfig::default();

        let funding = Sample::new("BTC_USDT", -0.002);
        let labels = SignalEngine::classify(SourceKind::Futures, &funding, None, &config);
        assert_eq!(labels, vec![AlertLabel::StrongLongRisk]);
        assert_eq!(labels[0].color(), "red");

        let spot = spot_sample(1.0, 16.0, 500_000.0);
        let labels = SignalEngine::classify(SourceKind::Spot, &spot, None, &config);
        assert_eq!(labels, vec![AlertLabel::Pump]);
    }
}
