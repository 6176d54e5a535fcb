use super::cancel::{Outcome, RequestSlot};
use super::SessionStopped;
use crate::analysis::{self, AnalysisProvider};
use crate::config::SessionConfig;
use crate::feeds::{FeedError, TableFeed};
use crate::models::number::RouletteNumber;
use crate::models::stats::StatsSummary;
use crate::models::strategy::StrategySuggestion;
use crate::models::table::{self, RouletteTable, TableKey};
use crate::signals::history::HistoryReconciler;
use crate::signals::stats::StatsEngine;
use crate::telemetry::alerts::AlertManager;
use crate::telemetry::latency::{LatencyTracker, ANALYSIS_COMPLETE, FEED_FETCH};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FeedStatus {
    /// No reply yet.
    Loading,
    Online,
    /// Retries exhausted; polling continues on the normal timer.
    Offline(String),
}

/// Read-only view of the session handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub tables: Vec<RouletteTable>,
    pub vendors: Vec<String>,
    pub selected_vendor: Option<String>,
    pub selected: Option<TableKey>,
    pub current_table: Option<RouletteTable>,
    pub history: Vec<RouletteNumber>,
    pub stats: StatsSummary,
    pub strategy: StrategySuggestion,
    pub status: FeedStatus,
    pub last_update: Option<DateTime<Utc>>,
}

impl Default for DashboardSnapshot {
    fn default() -> Self {
        Self {
            tables: Vec::new(),
            vendors: Vec::new(),
            selected_vendor: None,
            selected: None,
            current_table: None,
            history: Vec::new(),
            stats: StatsSummary::default(),
            strategy: StrategySuggestion::empty(),
            status: FeedStatus::Loading,
            last_update: None,
        }
    }
}

impl DashboardSnapshot {
    /// Tables offered for the selected vendor.
    pub fn vendor_tables(&self) -> Vec<&RouletteTable> {
        match &self.selected_vendor {
            Some(vendor) => table::tables_for_vendor(&self.tables, vendor),
            None => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SelectTable(TableKey),
    SelectVendor(String),
    RefreshNow,
    Shutdown,
}

enum Reply {
    Poll {
        generation: u64,
        result: Result<Vec<RouletteTable>, FeedError>,
    },
    Analysis {
        generation: u64,
        suggestion: StrategySuggestion,
    },
}

/// Cloneable handle for driving a running [`Session`].
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<DashboardSnapshot>,
}

impl SessionHandle {
    pub async fn send(&self, command: Command) -> Result<(), SessionStopped> {
        self.commands.send(command).await.map_err(|_| SessionStopped)
    }

    pub async fn select_table(&self, key: TableKey) -> Result<(), SessionStopped> {
        self.send(Command::SelectTable(key)).await
    }

    pub async fn select_vendor(&self, vendor: impl Into<String>) -> Result<(), SessionStopped> {
        self.send(Command::SelectVendor(vendor.into())).await
    }

    pub async fn refresh(&self) -> Result<(), SessionStopped> {
        self.send(Command::RefreshNow).await
    }

    pub async fn shutdown(&self) -> Result<(), SessionStopped> {
        self.send(Command::Shutdown).await
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.snapshots.clone()
    }
}

/// Single owner of one table's history and strategy.
///
/// Runs the poll cycle and the debounced analysis cycle in one loop, so every
/// poll reply is reconciled, then summarized, then (later) analyzed, and
/// consumers only ever see whole snapshots.
pub struct Session<F: TableFeed, A: AnalysisProvider> {
    feed: Arc<F>,
    analyzer: Option<Arc<A>>,
    config: SessionConfig,
    latency: Arc<LatencyTracker>,
    alerts: Option<Arc<AlertManager>>,

    tables: Vec<RouletteTable>,
    selected_vendor: Option<String>,
    selected: Option<TableKey>,
    auto_select: bool,
    history: Vec<RouletteNumber>,
    stats: StatsSummary,
    strategy: StrategySuggestion,
    status: FeedStatus,
    last_update: Option<DateTime<Utc>>,
    last_signature: Option<String>,

    poll: RequestSlot,
    analysis: RequestSlot,
    debounce_deadline: Option<Instant>,

    commands: mpsc::Receiver<Command>,
    reply_tx: mpsc::UnboundedSender<Reply>,
    reply_rx: mpsc::UnboundedReceiver<Reply>,
    snapshot_tx: watch::Sender<DashboardSnapshot>,
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(d) => tokio::time::sleep_until(d).await,
        None => std::future::pending().await,
    }
}

impl<F: TableFeed, A: AnalysisProvider> Session<F, A> {
    /// `analyzer = None` keeps the session in stats-only mode.
    pub fn new(
        feed: Arc<F>,
        analyzer: Option<Arc<A>>,
        config: SessionConfig,
        latency: Arc<LatencyTracker>,
    ) -> (Self, SessionHandle) {
        let (command_tx, commands) = mpsc::channel(32);
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshots) = watch::channel(DashboardSnapshot::default());

        let auto_select = true;
        let selected_vendor = config.vendor.clone();

        let session = Self {
            feed,
            analyzer,
            config,
            latency,
            alerts: None,
            tables: Vec::new(),
            selected_vendor,
            selected: None,
            auto_select,
            history: Vec::new(),
            stats: StatsSummary::default(),
            strategy: StrategySuggestion::empty(),
            status: FeedStatus::Loading,
            last_update: None,
            last_signature: None,
            poll: RequestSlot::new(),
            analysis: RequestSlot::new(),
            debounce_deadline: None,
            commands,
            reply_tx,
            reply_rx,
            snapshot_tx,
        };
        let handle = SessionHandle {
            commands: command_tx,
            snapshots,
        };
        (session, handle)
    }

    pub fn with_alerts(mut self, alerts: Arc<AlertManager>) -> Self {
        self.alerts = Some(alerts);
        self
    }

    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(Duration::from_millis(self.config.poll_interval_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.start_poll(),
                Some(reply) = self.reply_rx.recv() => self.on_reply(reply),
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.on_command(command),
                },
                _ = sleep_until_opt(self.debounce_deadline) => {
                    self.debounce_deadline = None;
                    self.start_analysis();
                }
            }
            self.publish();
        }

        self.poll.cancel();
        self.analysis.cancel();
        info!("Session stopped");
    }

    fn publish(&self) {
        let current_table = self
            .selected
            .as_ref()
            .and_then(|key| table::find_table(&self.tables, key))
            .cloned();

        self.snapshot_tx.send_replace(DashboardSnapshot {
            tables: self.tables.clone(),
            vendors: table::vendors(&self.tables),
            selected_vendor: self.selected_vendor.clone(),
            selected: self.selected.clone(),
            current_table,
            history: self.history.clone(),
            stats: self.stats.clone(),
            strategy: self.strategy.clone(),
            status: self.status.clone(),
            last_update: self.last_update,
        });
    }

    // --- poll cycle ---

    fn start_poll(&mut self) {
        let generation = self.poll.begin();
        let feed = self.feed.clone();
        let latency = self.latency.clone();
        let tx = self.reply_tx.clone();

        let task = tokio::spawn(async move {
            let started = Instant::now();
            let result = feed.fetch_tables().await;
            latency.record(FEED_FETCH, started.elapsed());
            let _ = tx.send(Reply::Poll { generation, result });
        });
        self.poll.attach(task.abort_handle());
    }

    fn on_reply(&mut self, reply: Reply) {
        match reply {
            Reply::Poll { generation, result } => match self.poll.resolve(generation, result) {
                Outcome::Completed(Ok(tables)) => self.on_tables(tables),
                Outcome::Completed(Err(e)) => self.on_feed_error(e),
                Outcome::Superseded => debug!("Dropping superseded poll reply"),
            },
            Reply::Analysis {
                generation,
                suggestion,
            } => match self.analysis.resolve(generation, suggestion) {
                Outcome::Completed(suggestion) => {
                    info!(
                        "Strategy: {} (confidence {}, risk {})",
                        suggestion.estrategia, suggestion.confianca, suggestion.risco
                    );
                    self.strategy = suggestion;
                }
                Outcome::Superseded => debug!("Dropping superseded analysis"),
            },
        }
    }

    fn on_tables(&mut self, tables: Vec<RouletteTable>) {
        if let FeedStatus::Offline(_) = self.status {
            info!("Feed back online");
            self.spawn_alert(None);
        }
        self.status = FeedStatus::Online;
        self.last_update = Some(Utc::now());
        self.tables = tables;

        if self.auto_select && self.selected.is_none() {
            if let Some(key) = self.initial_selection() {
                self.switch_table(key, false);
                return;
            }
        }
        self.ingest_selected();
    }

    fn on_feed_error(&mut self, e: FeedError) {
        let message = e.to_string();
        warn!("Feed offline: {message}");
        if !matches!(self.status, FeedStatus::Offline(_)) {
            self.spawn_alert(Some(message.clone()));
        }
        self.status = FeedStatus::Offline(message);
    }

    fn spawn_alert(&self, offline_reason: Option<String>) {
        let Some(alerts) = self.alerts.clone() else {
            return;
        };
        tokio::spawn(async move {
            match offline_reason {
                Some(reason) => alerts.on_offline(&reason).await,
                None => alerts.on_recovered().await,
            }
        });
    }

    /// Configured table, else the first table of the configured vendor,
    /// else the first table of all.
    fn initial_selection(&self) -> Option<TableKey> {
        let candidates: Vec<&RouletteTable> = match &self.config.vendor {
            Some(vendor) => table::tables_for_vendor(&self.tables, vendor),
            None => self.tables.iter().collect(),
        };
        let chosen = match &self.config.table_id {
            Some(id) => candidates.into_iter().find(|t| &t.table_id == id),
            None => candidates.into_iter().next(),
        };
        chosen.map(RouletteTable::key)
    }

    /// Reconcile the selected table's window into the history if the raw
    /// window changed since the last poll.
    fn ingest_selected(&mut self) {
        let Some(key) = &self.selected else {
            return;
        };
        let Some(current) = table::find_table(&self.tables, key) else {
            return;
        };

        let signature = current.results_signature();
        if self.last_signature.as_deref() == Some(signature.as_str()) {
            return;
        }
        self.last_signature = Some(signature);

        let merged =
            HistoryReconciler::reconcile_bounded(&self.history, &current.results, self.config.max_history);
        if merged == self.history {
            return;
        }

        debug!(
            "History {} -> {} spins (table {})",
            self.history.len(),
            merged.len(),
            key.table_id
        );
        self.history = merged;
        self.stats = StatsEngine::compute(&self.history);
        self.on_history_changed();
    }

    // --- analysis cycle ---

    /// Restart the quiet window; the in-flight analysis is for an outdated
    /// history.
    fn on_history_changed(&mut self) {
        if self.analyzer.is_none() {
            return;
        }
        self.analysis.cancel();
        self.strategy.loading = false;
        self.debounce_deadline = Some(Instant::now() + Duration::from_millis(self.config.debounce_ms));
    }

    fn start_analysis(&mut self) {
        let Some(analyzer) = self.analyzer.clone() else {
            return;
        };
        if self.history.len() < self.config.min_history_for_analysis {
            return;
        }
        let Some(current) = self
            .selected
            .as_ref()
            .and_then(|key| table::find_table(&self.tables, key))
        else {
            return;
        };

        let generation = self.analysis.begin();
        let table_name = current.table_name.clone();
        let vendor_name = current.vendor_name.clone();
        let history = self.history.clone();
        let latency = self.latency.clone();
        let tx = self.reply_tx.clone();

        self.strategy = self.strategy.pending();

        let task = tokio::spawn(async move {
            let started = Instant::now();
            let suggestion = analysis::analyze(analyzer.as_ref(), &table_name, &vendor_name, &history).await;
            latency.record(ANALYSIS_COMPLETE, started.elapsed());
            let _ = tx.send(Reply::Analysis {
                generation,
                suggestion,
            });
        });
        self.analysis.attach(task.abort_handle());
    }

    // --- commands ---

    fn on_command(&mut self, command: Command) {
        match command {
            Command::SelectTable(key) => self.switch_table(key, true),
            Command::SelectVendor(vendor) => self.switch_vendor(vendor),
            Command::RefreshNow => self.start_poll(),
            Command::Shutdown => {}
        }
    }

    /// Drop everything tied to the previous selection.
    fn reset_selection(&mut self) {
        self.analysis.cancel();
        self.debounce_deadline = None;
        self.history.clear();
        self.stats = StatsSummary::default();
        self.strategy = StrategySuggestion::empty();
        self.last_signature = None;
    }

    fn switch_table(&mut self, key: TableKey, repoll: bool) {
        info!("Following table {} ({})", key.table_id, key.vendor);
        if repoll {
            self.poll.cancel();
        }
        self.reset_selection();
        self.auto_select = false;
        self.selected_vendor = Some(key.vendor.clone());
        self.selected = Some(key);

        // Seed from the last listing right away; the fresh poll catches up.
        self.ingest_selected();
        if repoll {
            self.start_poll();
        }
    }

    fn switch_vendor(&mut self, vendor: String) {
        let keeps_table = self.selected.as_ref().is_some_and(|k| k.vendor == vendor);
        if !keeps_table && self.selected.is_some() {
            info!("Vendor changed to {vendor}, clearing table selection");
            self.reset_selection();
            self.selected = None;
        }
        self.auto_select = false;
        self.selected_vendor = Some(vendor);
    }
}
