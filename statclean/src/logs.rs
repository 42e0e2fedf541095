//! Run log.
//!
//! Pipeline messages are [`RunEvent`]s tagged with the dataset they concern.
//! [`RUN_LOG`] echoes each event to stderr and publishes it to subscribers;
//! the CLI subscribes before a run and folds the events, grouped per
//! dataset, into its JSON report.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;
use tokio::sync::broadcast;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A pipeline stage started.
    Step,
    /// Figures about the current stage.
    Detail,
    /// Rows or values left out of the output.
    Dropped,
    /// An output table was written.
    Written,
    /// The dataset failed; nothing was written for it.
    Failed,
}

impl EventKind {
    fn marker(self) -> &'static str {
        match self {
            EventKind::Step => "📖",
            EventKind::Detail => "  ",
            EventKind::Dropped => "⚠️",
            EventKind::Written => "✓",
            EventKind::Failed => "❌",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunEvent {
    pub dataset: String,
    pub kind: EventKind,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl RunEvent {
    pub fn new(dataset: impl Into<String>, kind: EventKind, message: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            kind,
            message: message.into(),
            at: Utc::now(),
        }
    }

    /// One stderr line: `   [dataset] marker message`.
    pub fn render(&self) -> String {
        format!("   [{}] {} {}", self.dataset, self.kind.marker(), self.message)
    }
}

/// Process-wide run log.
pub static RUN_LOG: Lazy<RunLog> = Lazy::new(|| RunLog::with_capacity(1024));

pub struct RunLog {
    sender: broadcast::Sender<RunEvent>,
}

impl RunLog {
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn emit(&self, event: RunEvent) {
        eprintln!("{}", event.render());
        // Nobody subscribed is fine.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RunEvent> {
        self.sender.subscribe()
    }

    /// A handle that tags everything it logs with `dataset`.
    pub fn dataset(&self, dataset: impl Into<String>) -> DatasetLog<'_> {
        DatasetLog {
            log: self,
            dataset: dataset.into(),
        }
    }
}

/// Logging handle scoped to one dataset run.
pub struct DatasetLog<'a> {
    log: &'a RunLog,
    dataset: String,
}

impl DatasetLog<'_> {
    fn emit(&self, kind: EventKind, message: impl Into<String>) {
        self.log.emit(RunEvent::new(self.dataset.clone(), kind, message));
    }

    pub fn step(&self, message: impl Into<String>) {
        self.emit(EventKind::Step, message);
    }

    pub fn detail(&self, message: impl Into<String>) {
        self.emit(EventKind::Detail, message);
    }

    pub fn dropped(&self, message: impl Into<String>) {
        self.emit(EventKind::Dropped, message);
    }

    pub fn written(&self, message: impl Into<String>) {
        self.emit(EventKind::Written, message);
    }

    pub fn failed(&self, message: impl Into<String>) {
        self.emit(EventKind::Failed, message);
    }
}

/// Take everything buffered in a subscription without blocking.
///
/// Events lost to lag are skipped.
pub fn drain(receiver: &mut broadcast::Receiver<RunEvent>) -> Vec<RunEvent> {
    let mut events = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(event) => events.push(event),
            Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    events
}

/// Group events by dataset name, keeping each dataset's events in order.
pub fn by_dataset(events: Vec<RunEvent>) -> BTreeMap<String, Vec<RunEvent>> {
    let mut grouped: BTreeMap<String, Vec<RunEvent>> = BTreeMap::new();
    for event in events {
        grouped.entry(event.dataset.clone()).or_default().push(event);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_tagged_with_dataset() {
        let log = RunLog::with_capacity(16);
        let mut rx = log.subscribe();

        log.dataset("cpi").step("reading consumer_price_index.csv");
        log.dataset("energy").dropped("3 rows dropped (unresolvable year)");

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].dataset, "cpi");
        assert_eq!(events[1].kind, EventKind::Dropped);
    }

    #[test]
    fn test_emit_without_subscribers() {
        let log = RunLog::with_capacity(4);
        log.dataset("cpi").failed("nobody listening");
    }

    #[test]
    fn test_lagged_events_skipped() {
        let log = RunLog::with_capacity(2);
        let mut rx = log.subscribe();
        let handle = log.dataset("cpi");
        for i in 0..5 {
            handle.detail(format!("event {}", i));
        }

        let messages: Vec<String> = drain(&mut rx).into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["event 3", "event 4"]);
    }

    #[test]
    fn test_group_by_dataset() {
        let events = vec![
            RunEvent::new("undernourishment", EventKind::Step, "reading"),
            RunEvent::new("cpi", EventKind::Step, "reading"),
            RunEvent::new("undernourishment", EventKind::Written, "saved"),
        ];

        let grouped = by_dataset(events);
        assert_eq!(grouped.keys().collect::<Vec<_>>(), vec!["cpi", "undernourishment"]);
        let kinds: Vec<EventKind> = grouped["undernourishment"].iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::Step, EventKind::Written]);
    }

    #[test]
    fn test_event_serializes() {
        let event = RunEvent::new("energy", EventKind::Written, "done");
        let json = serde_json::to_value(event).unwrap();
        assert_eq!(json["dataset"], "energy");
        assert_eq!(json["kind"], "written");
        assert!(json["at"].is_string());
    }

    #[test]
    fn test_render() {
        let event = RunEvent::new("cpi", EventKind::Failed, "missing columns: Area");
        assert_eq!(event.render(), "   [cpi] ❌ missing columns: Area");
    }
}
