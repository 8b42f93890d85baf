//! Presentation sink - render-ready cycle views
//!
//! The monitor core never touches a UI directly; it hands each cycle's
//! results to a `RenderSink`. The shipped implementation writes them to
//! the log.

use chrono::{DateTime, Utc};

use crate::domain::{AnomalyRecord, AlertLabel};
use crate::shared::types::Trend;
use tracing::info;

/// Per-instrument outcome of one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrumentStatus {
    /// Fresh sample applied
    Updated,
    /// Tracked but absent from the response this round
    Missing,
}

/// Render-ready view of one instrument after a cycle
#[derive(Debug, Clone)]
pub struct InstrumentView {
    pub instrument: String,
    pub status: InstrumentStatus,
    pub value: Option<f64>,
    pub trend: Trend,
    pub labels: Vec<AlertLabel>,
}

/// Everything a sink needs to draw one cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub time: DateTime<Utc>,
    pub instruments: Vec<InstrumentView>,
    /// Newest-first slice of the anomaly log
    pub anomalies: Vec<AnomalyRecord>,
}

/// External collaborator receiving cycle results and status lines
pub trait RenderSink: Send {
    fn render_cycle(&self, report: &CycleReport);
    fn render_status(&self, message: &str);
}

/// How many anomaly-log entries the log sink prints per cycle
const ANOMALY_DISPLAY_LIMIT: usize = 5;

/// Default sink: structured log output
pub struct LogSink;

impl RenderSink for LogSink {
    fn render_cycle(&self, report: &CycleReport) {
        info!("📊 Cycle at {}", report.time.to_rfc3339());
        for view in &report.instruments {
            match view.status {
                InstrumentStatus::Missing => {
                    info!("   {}: not found in response", view.instrument);
                }
                InstrumentStatus::Updated => {
                    let value = view.value.unwrap_or(f64::NAN);
                    if view.labels.is_empty() {
                        info!(
                            "   {}: last={} trend={}",
                            view.instrument,
                            value,
                            view.trend.as_str()
                        );
                    } else {
                        let labels = view
                            .labels
                            .iter()
                            .map(|l| format!("{} {} [{}]", l.emoji(), l.as_str(), l.color()))
                            .collect::<Vec<_>>()
                            .join("; ");
                        info!(
                            "   {}: last={} trend={} | {}",
                            view.instrument,
                            value,
                            view.trend.as_str(),
                            labels
                        );
                    }
                }
            }
        }

        for record in report.anomalies.iter().take(ANOMALY_DISPLAY_LIMIT) {
            info!(
                "   🚨 {} {}: {}",
                record.time.to_rfc3339(),
                record.instrument,
                record.alerts.join("; ")
            );
        }
    }

    fn render_status(&self, message: &str) {
        info!("⚠️  {}", message);
    }
}
