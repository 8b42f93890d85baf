//! Sampling loop: fixed-interval polling, classification, persistence
//!
//! One consumer task owns all mutable state. Timer ticks and user
//! commands arrive through the same `select!`, and each cycle is
//! awaited inline, so two fetches can never run concurrently and no
//! locking is needed.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::{self, Duration, Instant};
use tracing::{debug, info, warn};

use crate::application::commands::{
    validate_instrument, validate_interval, MonitorCommand, MonitorHandle,
};
use crate::application::export::export_snapshot;
use crate::application::sink::{
    CycleReport, InstrumentStatus, InstrumentView, RenderSink,
};
use crate::domain::{
    verify_contract, AnomalyLog, AnomalyRecord, HistoryBook, HistoryEntry, SignalEngine,
};
use crate::infrastructure::gateio::MarketDataSource;
use crate::infrastructure::store::{FileStore, ANOMALY_KEY, CONFIG_KEY, HISTORY_KEY};
use crate::shared::config::AppConfig;
use crate::shared::errors::AppError;
use crate::shared::types::{MonitorConfig, Sample, SourceKind};

/// Command channel depth; senders briefly block when the loop is busy
const COMMAND_BUFFER: usize = 16;

/// All mutable monitor state, owned by the loop
pub struct MonitorState {
    pub config: MonitorConfig,
    pub history: HistoryBook,
    pub anomalies: AnomalyLog,
    /// Previous cycle's value per instrument, for tick-to-tick deltas.
    /// Not persisted: a restart starts the delta rule fresh.
    pub last_values: HashMap<String, f64>,
}

impl MonitorState {
    /// Load persisted state, falling back to defaults where a key is
    /// missing or corrupt.
    pub fn init(app: &AppConfig, store: &FileStore) -> Self {
        let config: MonitorConfig = store.load(CONFIG_KEY).unwrap_or_default();
        let history = HistoryBook::from_persisted(
            store.load(HISTORY_KEY).unwrap_or_default(),
            app.history_cap,
        );
        let anomalies = AnomalyLog::from_persisted(
            store.load(ANOMALY_KEY).unwrap_or_default(),
            app.anomaly_cap,
        );

        Self {
            config,
            history,
            anomalies,
            last_values: HashMap::new(),
        }
    }
}

/// What the loop should do after handling a command
enum Flow {
    Continue,
    Rearm,
    Shutdown,
}

/// The sampler/scheduler plus its collaborator wiring
pub struct MarketMonitor {
    app: AppConfig,
    state: MonitorState,
    source: Box<dyn MarketDataSource>,
    store: FileStore,
    sink: Box<dyn RenderSink>,
    rx: mpsc::Receiver<MonitorCommand>,
}

impl MarketMonitor {
    pub fn new(
        app: AppConfig,
        source: Box<dyn MarketDataSource>,
        store: FileStore,
        sink: Box<dyn RenderSink>,
    ) -> (Self, MonitorHandle) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let state = MonitorState::init(&app, &store);
        let monitor = Self {
            app,
            state,
            source,
            store,
            sink,
            rx,
        };
        (monitor, MonitorHandle::new(tx))
    }

    /// Override persisted settings from the command line before the
    /// loop starts. Invalid entries are rejected, not partially applied.
    pub fn apply_overrides(
        &mut self,
        instruments: Option<Vec<String>>,
        interval_secs: Option<u64>,
    ) -> Result<(), AppError> {
        if let Some(raw_ids) = instruments {
            let mut validated: Vec<String> = Vec::new();
            for raw in raw_ids {
                let id = validate_instrument(&raw)?;
                if !validated.contains(&id) {
                    validated.push(id);
                }
            }
            let dropped: Vec<String> = self
                .state
                .config
                .instruments
                .iter()
                .filter(|i| !validated.contains(*i))
                .cloned()
                .collect();
            for id in dropped {
                self.state.history.remove(&id);
                self.state.last_values.remove(&id);
            }
            self.state.config.instruments = validated;
        }
        if let Some(secs) = interval_secs {
            self.state.config.interval_secs = validate_interval(secs)?;
        }
        self.persist_config()?;
        self.persist_history()?;
        Ok(())
    }

    /// Run until shutdown. The first cycle fires immediately; after
    /// that the timer drives the cadence.
    pub async fn run(mut self) -> Result<(), AppError> {
        info!(
            "🚀 Starting monitor: source={} instruments={:?} interval={}s",
            self.app.source.as_str(),
            self.state.config.instruments,
            self.state.config.interval_secs
        );

        self.run_cycle().await;
        let mut ticker = self.arm_timer();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
                command = self.rx.recv() => {
                    let command = match command {
                        Some(command) => command,
                        None => break,
                    };
                    match self.handle_command(command).await {
                        Flow::Continue => {}
                        Flow::Rearm => ticker = self.arm_timer(),
                        Flow::Shutdown => break,
                    }
                }
            }
        }

        info!("🛑 Monitor stopped");
        Ok(())
    }

    /// Interval timer whose first tick is one full period away, so
    /// re-arming never causes an immediate extra cycle.
    fn arm_timer(&self) -> time::Interval {
        let period = Duration::from_secs(self.state.config.interval_secs);
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        ticker
    }

    async fn handle_command(&mut self, command: MonitorCommand) -> Flow {
        match command {
            MonitorCommand::AddInstrument(raw) => {
                match validate_instrument(&raw) {
                    Ok(id) => {
                        if self.state.config.add_instrument(id.clone()) {
                            self.persist_config_logged();
                            self.sink.render_status(&format!("tracking {}", id));
                        } else {
                            debug!("Instrument {} already tracked", id);
                        }
                    }
                    Err(e) => {
                        warn!("Rejected instrument: {}", e);
                        self.sink.render_status(&e.to_string());
                    }
                }
                Flow::Continue
            }
            MonitorCommand::RemoveInstrument(raw) => {
                let id = raw.trim().to_uppercase();
                if self.state.config.remove_instrument(&id) {
                    self.state.history.remove(&id);
                    self.state.last_values.remove(&id);
                    self.persist_config_logged();
                    self.persist_history_logged();
                    self.sink.render_status(&format!("stopped tracking {}", id));
                }
                Flow::Continue
            }
            MonitorCommand::AdjustThreshold { which, delta } => {
                self.state.config.adjust_threshold(which, delta);
                self.persist_config_logged();
                info!(
                    "Thresholds now long={} short={}",
                    self.state.config.long_threshold, self.state.config.short_threshold
                );
                Flow::Continue
            }
            MonitorCommand::SetInterval(secs) => match validate_interval(secs) {
                Ok(secs) => {
                    self.state.config.interval_secs = secs;
                    self.persist_config_logged();
                    self.sink
                        .render_status(&format!("polling every {}s", secs));
                    Flow::Rearm
                }
                Err(e) => {
                    warn!("Rejected interval: {}", e);
                    self.sink.render_status(&e.to_string());
                    Flow::Continue
                }
            },
            MonitorCommand::Refresh => {
                self.run_cycle().await;
                Flow::Rearm
            }
            MonitorCommand::ExportSnapshot { reply } => {
                let snapshot = export_snapshot(&self.state.config, &self.state.history);
                let _ = reply.send(snapshot);
                Flow::Continue
            }
            MonitorCommand::VerifyContract {
                network,
                address,
                reply,
            } => {
                let _ = reply.send(verify_contract(&network, &address));
                Flow::Continue
            }
            MonitorCommand::Shutdown => Flow::Shutdown,
        }
    }

    /// One fetch-and-process round. Errors are reported and swallowed;
    /// the next tick is the retry.
    pub async fn run_cycle(&mut self) {
        debug!("Polling cycle started");
        let instruments = self.state.config.instruments.clone();

        match self.source.fetch(&instruments).await {
            Ok(samples) => self.process_samples(&instruments, samples),
            Err(e) => {
                warn!("Fetch cycle failed: {}", e);
                self.sink.render_status(&format!("fetch failed: {}", e));
            }
        }
    }

    fn process_samples(&mut self, instruments: &[String], samples: HashMap<String, Sample>) {
        let mut views = Vec::with_capacity(instruments.len());
        let mut anomaly_fired = false;

        for instrument in instruments {
            let sample = match samples.get(instrument) {
                Some(sample) => sample,
                None => {
                    warn!("Instrument {} not found in response", instrument);
                    views.push(InstrumentView {
                        instrument: instrument.clone(),
                        status: InstrumentStatus::Missing,
                        value: None,
                        trend: self.state.history.trend(instrument),
                        labels: Vec::new(),
                    });
                    continue;
                }
            };

            // A funding rate that failed to parse carries no signal;
            // the bucket function is only defined over real rates.
            let labels = if self.app.source == SourceKind::Futures && sample.value.is_nan() {
                Vec::new()
            } else {
                let prior = self.state.last_values.get(instrument).copied();
                SignalEngine::classify(self.app.source, sample, prior, &self.state.config)
            };

            let anomalies: Vec<_> = labels.iter().copied().filter(|l| l.is_anomaly()).collect();
            if !anomalies.is_empty() {
                self.state
                    .anomalies
                    .push(AnomalyRecord::from_sample(sample, &anomalies));
                anomaly_fired = true;
            }

            self.state
                .last_values
                .insert(instrument.clone(), sample.value);
            self.state.history.append(instrument, HistoryEntry::from(sample));

            views.push(InstrumentView {
                instrument: instrument.clone(),
                status: InstrumentStatus::Updated,
                value: Some(sample.value),
                trend: self.state.history.trend(instrument),
                labels,
            });
        }

        self.persist_history_logged();
        if anomaly_fired {
            self.persist_anomalies_logged();
        }

        let report = CycleReport {
            time: Utc::now(),
            instruments: views,
            anomalies: self.state.anomalies.records().to_vec(),
        };
        self.sink.render_cycle(&report);
    }

    fn persist_config(&self) -> Result<(), AppError> {
        self.store.save(CONFIG_KEY, &self.state.config)
    }

    fn persist_history(&self) -> Result<(), AppError> {
        self.store.save(HISTORY_KEY, &self.state.history.to_persisted())
    }

    fn persist_anomalies(&self) -> Result<(), AppError> {
        self.store.save(ANOMALY_KEY, &self.state.anomalies.records())
    }

    fn persist_config_logged(&self) {
        if let Err(e) = self.persist_config() {
            warn!("Failed to persist config: {}", e);
        }
    }

    fn persist_history_logged(&self) {
        if let Err(e) = self.persist_history() {
            warn!("Failed to persist history: {}", e);
        }
    }

    fn persist_anomalies_logged(&self) {
        if let Err(e) = self.persist_anomalies() {
            warn!("Failed to persist anomaly log: {}", e);
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &MonitorState {
        &self.state
    }
}
