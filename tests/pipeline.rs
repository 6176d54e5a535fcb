//! End-to-end checks for the monitor pipeline.
//!
//! Feeds raw vendor payloads through extraction, history reconciliation,
//! statistics, prompt formatting and reply parsing, then drives a full
//! session against scripted feed and analysis providers.

use serde_json::{json, Value};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use roleta::analysis::{self, AnalysisError, AnalysisProvider};
use roleta::config::SessionConfig;
use roleta::feeds::extract::extract_tables;
use roleta::feeds::{FeedError, TableFeed};
use roleta::models::number::{numbers, RouletteNumber};
use roleta::models::stats::Trend;
use roleta::models::table::{RouletteTable, TableKey};
use roleta::session::{DashboardSnapshot, FeedStatus, Session, SessionHandle};
use roleta::signals::history::{HistoryReconciler, MAX_HISTORY};
use roleta::signals::stats::StatsEngine;
use roleta::telemetry::dashboard;
use roleta::telemetry::latency::{LatencyTracker, ANALYSIS_COMPLETE, FEED_FETCH};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A vendor payload in the shape the live casino endpoint returns.
fn payload(evolution: &[i64], pragmatic: &[i64]) -> Value {
    json!({
        "games": [
            {
                "tableId": "evo-1",
                "tableName": "Roleta Brasileira",
                "vendorName": "Evolution",
                "gameType": "Roulette",
                "results": evolution,
            },
            {
                "tableId": "bj-7",
                "tableName": "Blackjack VIP",
                "vendorName": "Evolution",
                "gameType": "blackjack",
                "results": [1, 2, 3],
            },
            {
                "id": 42,
                "name": "Mega Roulette",
                "provider": "Pragmatic",
                "results": pragmatic,
            }
        ]
    })
}

/// Serves decoded payloads in order, then repeats the last one.
struct PayloadFeed {
    script: Mutex<VecDeque<Value>>,
    last: Mutex<Value>,
}

impl PayloadFeed {
    fn new(script: Vec<Value>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(json!({})),
        }
    }
}

impl TableFeed for PayloadFeed {
    fn fetch_tables(&self) -> impl Future<Output = Result<Vec<RouletteTable>, FeedError>> + Send {
        let next = self.script.lock().unwrap().pop_front();
        let body = match next {
            Some(body) => {
                *self.last.lock().unwrap() = body.clone();
                body
            }
            None => self.last.lock().unwrap().clone(),
        };
        async move { Ok(extract_tables(&body)) }
    }
}

/// Records prompts and answers with a fixed reply or HTTP status.
struct RecordingProvider {
    reply: Result<&'static str, u16>,
    prompts: Mutex<Vec<String>>,
}

impl RecordingProvider {
    fn new(reply: Result<&'static str, u16>) -> Self {
        Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        }
    }
}

impl AnalysisProvider for RecordingProvider {
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String, AnalysisError>> + Send {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let reply = self.reply.map(str::to_string).map_err(AnalysisError::Status);
        async move { reply }
    }
}

const REPLY: &str = "Estratégia: Apostar no vermelho\n\
Alternativa: Segunda dúzia\n\
Justificativa: O vermelho saiu em sequência\ne domina as últimas rodadas.\n\
Nível de confiança (0 a 100): 72%\n\
Risco: Médio";

async fn wait_for(handle: &SessionHandle, pred: impl Fn(&DashboardSnapshot) -> bool) -> DashboardSnapshot {
    let mut rx = handle.subscribe();
    let waited = tokio::time::timeout(Duration::from_secs(120), async {
        loop {
            if pred(&rx.borrow_and_update()) {
                return rx.borrow().clone();
            }
            if rx.changed().await.is_err() {
                panic!("session ended");
            }
        }
    })
    .await;
    waited.expect("condition not reached")
}

fn session_config() -> SessionConfig {
    SessionConfig {
        poll_interval_ms: 5000,
        debounce_ms: 1000,
        min_history_for_analysis: 5,
        ..SessionConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Pure pipeline
// ---------------------------------------------------------------------------

#[test]
fn test_payload_to_tables() {
    let tables = extract_tables(&payload(&[32, 15, 19], &[0, 7]));

    // The blackjack table is filtered out.
    assert_eq!(tables.len(), 2);
    assert_eq!(tables[0].key(), TableKey::new("Evolution", "evo-1"));
    assert_eq!(tables[0].results, numbers(&[32, 15, 19]));
    assert_eq!(tables[0].game_type.as_deref(), Some("roulette"));

    assert_eq!(tables[1].table_id, "42");
    assert_eq!(tables[1].vendor_name, "Pragmatic");
    assert_eq!(tables[1].game_type.as_deref(), Some("roulette"));
}

#[test]
fn test_polls_accumulate_history_and_stats() {
    let windows: [&[i64]; 5] = [
        &[3, 12, 7, 18],
        &[12, 7, 18, 1],   // one new spin
        &[7, 18, 1, 1, 5], // two new spins
        &[7, 18, 1, 1, 5], // unchanged
        &[18, 1, 1, 5, 1], // one new spin
    ];

    let mut history: Vec<RouletteNumber> = Vec::new();
    for window in windows {
        let tables = extract_tables(&payload(window, &[]));
        history = HistoryReconciler::reconcile(&history, &tables[0].results);
    }
    assert_eq!(history, numbers(&[3, 12, 7, 18, 1, 1, 5, 1]));

    let stats = StatsEngine::compute(&history);
    assert_eq!(stats.total(), 8);
    assert_eq!(stats.red, 8);
    assert_eq!(stats.repeats, numbers(&[1]));
    assert!(stats.trends.contains(&Trend::RedStreak));
    assert!(stats.trends.contains(&Trend::OddStreak));
    assert!(stats.trends.contains(&Trend::HotNumber {
        number: RouletteNumber::new(1).unwrap(),
        count: 3,
    }));
}

#[test]
fn test_history_stays_bounded_over_long_run() {
    let mut history: Vec<RouletteNumber> = Vec::new();
    let mut spin: i64 = 0;
    for _ in 0..150 {
        let window: Vec<i64> = (spin.saturating_sub(4)..=spin).map(|n| n % 37).collect();
        history = HistoryReconciler::reconcile(&history, &numbers(&window));
        spin += 1;
    }
    assert_eq!(history.len(), MAX_HISTORY);
    assert_eq!(history.last().map(|n| n.value()), Some((149 % 37) as u8));
}

#[tokio::test]
async fn test_analysis_round_trip() {
    let history = numbers(&[1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21]);
    let provider = RecordingProvider::new(Ok(REPLY));

    let suggestion = analysis::analyze(&provider, "Roleta Brasileira", "Evolution", &history).await;

    assert_eq!(suggestion.estrategia, "Apostar no vermelho");
    assert_eq!(suggestion.alternativa, "Segunda dúzia");
    assert_eq!(
        suggestion.justificativa,
        "O vermelho saiu em sequência\ne domina as últimas rodadas."
    );
    assert_eq!(suggestion.confianca, 72);
    assert_eq!(suggestion.risco, "médio");
    assert!(suggestion.error.is_none());

    let prompts = provider.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Roleta Brasileira"));
    assert!(prompts[0].contains("Evolution"));
    assert!(prompts[0].contains("Últimos 10 números:\n3, 5, 7, 9, 12, 14, 16, 18, 19, 21\n"));
    assert!(prompts[0].contains("Histórico completo (11 números):\n1, 3, 5"));
}

#[tokio::test]
async fn test_analysis_failure_is_reported_in_suggestion() {
    let provider = RecordingProvider::new(Err(503));
    let suggestion = analysis::analyze(&provider, "Mesa", "Vendor", &numbers(&[1, 2, 3, 4, 5])).await;

    assert_eq!(suggestion.confianca, 0);
    assert_eq!(suggestion.risco, "N/A");
    assert!(suggestion.error.as_deref().unwrap_or_default().contains("503"));
    assert!(!suggestion.loading);
}

// ---------------------------------------------------------------------------
// Full session
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_session_end_to_end() {
    let feed = PayloadFeed::new(vec![
        payload(&[1, 3, 5, 7], &[0, 0]),
        payload(&[3, 5, 7, 9], &[0, 0]),
    ]);
    let provider = Arc::new(RecordingProvider::new(Ok(REPLY)));
    let latency = Arc::new(LatencyTracker::new(64));

    let (session, handle) = Session::new(
        Arc::new(feed),
        Some(provider.clone()),
        session_config(),
        latency.clone(),
    );
    tokio::spawn(session.run());

    let snap = wait_for(&handle, |s| s.history.len() == 4).await;
    assert_eq!(snap.status, FeedStatus::Online);
    assert_eq!(snap.vendors, vec!["Evolution", "Pragmatic"]);
    assert_eq!(snap.selected, Some(TableKey::new("Evolution", "evo-1")));
    assert!(snap.strategy.is_empty());

    // The fifth spin crosses the analysis threshold.
    let snap = wait_for(&handle, |s| s.strategy.confianca == 72).await;
    assert_eq!(snap.history, numbers(&[1, 3, 5, 7, 9]));
    assert_eq!(provider.prompts.lock().unwrap().len(), 1);

    let frame = dashboard::render(&snap);
    assert!(frame.contains("Roleta Brasileira (Evolution) | online"));
    assert!(frame.contains("newest first: 9R 7R 5R 3R 1R"));
    assert!(frame.contains("Strategy:    Apostar no vermelho"));

    assert!(latency.sample_count(FEED_FETCH) >= 2);
    assert_eq!(latency.sample_count(ANALYSIS_COMPLETE), 1);

    // Switching tables starts over from the new table's window.
    handle
        .select_table(TableKey::new("Pragmatic", "42"))
        .await
        .unwrap();
    let snap = wait_for(&handle, |s| s.selected_vendor.as_deref() == Some("Pragmatic")).await;
    assert_eq!(snap.history, numbers(&[0, 0]));
    assert!(snap.strategy.is_empty());
    assert_eq!(snap.stats.zeros, 2);

    handle.shutdown().await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(handle.refresh().await.is_err());
}
