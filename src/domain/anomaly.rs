//! Bounded log of anomaly detection events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::signal::AlertLabel;
use crate::shared::types::Sample;

/// One detection event: the triggering observation plus every
/// anomaly-family label that fired in that cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub id: String,
    pub instrument: String,
    pub time: DateTime<Utc>,
    pub value: f64,
    pub change_24h: Option<f64>,
    pub alerts: Vec<String>,
}

impl AnomalyRecord {
    pub fn from_sample(sample: &Sample, alerts: &[AlertLabel]) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            instrument: sample.instrument.clone(),
            time: sample.time,
            value: sample.value,
            change_24h: sample.change_24h,
            alerts: alerts.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Newest-first anomaly log, bounded by `cap`
#[derive(Debug, Clone)]
pub struct AnomalyLog {
    records: Vec<AnomalyRecord>,
    cap: usize,
}

impl AnomalyLog {
    pub fn new(cap: usize) -> Self {
        Self {
            records: Vec::new(),
            cap,
        }
    }

    pub fn from_persisted(mut records: Vec<AnomalyRecord>, cap: usize) -> Self {
        records.truncate(cap);
        Self { records, cap }
    }

    /// Prepend a record, dropping the oldest past the cap
    pub fn push(&mut self, record: AnomalyRecord) {
        self.records.insert(0, record);
        self.records.truncate(self.cap);
    }

    pub fn records(&self) -> &[AnomalyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(value: f64) -> AnomalyRecord {
        let sample = Sample::new("PEPE_USDT", value).with_change(20.0);
        AnomalyRecord::from_sample(&sample, &[AlertLabel::Pump])
    }

    #[test]
    fn test_log_is_newest_first_and_bounded() {
        let mut log = AnomalyLog::new(3);
        for i in 1..=5 {
            log.push(record(i as f64));
        }
        assert_eq!(log.len(), 3);
        let values: Vec<f64> = log.records().iter().map(|r| r.value).collect();
        assert_eq!(values, vec![5.0, 4.0, 3.0]);
    }

    #[test]
    fn test_record_captures_labels() {
        let sample = Sample::new("PEPE_USDT", 1.0).with_change(20.0);
        let rec = AnomalyRecord::from_sample(
            &sample,
            &[AlertLabel::Pump, AlertLabel::WeakPump],
        );
        assert_eq!(rec.alerts.len(), 2);
        assert_eq!(rec.alerts[0], "pump >15%: possible run-up");
    }

    #[test]
    fn test_from_persisted_truncates_to_cap() {
        let records: Vec<AnomalyRecord> = (0..30).map(|i| record(i as f64)).collect();
        let log = AnomalyLog::from_persisted(records, 20);
        assert_eq!(log.len(), 20);
    }
}
