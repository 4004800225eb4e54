//! Monitoring sessions: the synthetic live-classification feed
//!
//! Each monitoring session is a recurring task owned by exactly one
//! connection. On every tick it samples a synthetic content item, runs it
//! through the classification pipeline at real-time depth, and pushes the
//! event to its connection - provided the connection is still open and the
//! session was not replaced while the classification was in flight.

use crate::connection::{Connection, MonitoringSession, Outbound};
use crate::protocol::{AnalysisEvent, Envelope};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;
use uuid::Uuid;
use verity_domain::{result::now_millis, AnalysisDepth};
use verity_pipeline::ClassificationPipeline;

/// Default cadence between monitoring events
pub const DEFAULT_CADENCE_SECS: u64 = 3;

/// Candidate pool for the synthetic feed
const SAMPLE_CONTENTS: &[&str] = &[
    "Breaking: New scientific study reveals important findings about climate change",
    "SHOCKING: This one weird trick doctors don't want you to know!",
    "Local weather forecast predicts sunny weekend ahead",
    "URGENT: Government conspiracy exposed by anonymous whistleblower",
    "University researchers publish peer-reviewed study on renewable energy",
    "Miracle cure discovered by local doctor - FDA doesn't want you to know!",
    "Stock market update: Tech companies show strong growth",
    "Celebrity scandal rocks social media with explosive allegations",
];

const SAMPLE_SOURCES: &[&str] = &["twitter", "facebook"];

/// A sampled synthetic content item
#[derive(Debug, Clone)]
pub struct SampleItem {
    /// Item identifier
    pub id: String,
    /// The sampled content
    pub content: String,
    /// Synthetic source tag
    pub source: String,
    /// Sampling time, unix epoch milliseconds
    pub timestamp: u64,
}

/// Draws synthetic content items for monitoring sessions
#[derive(Debug, Clone, Copy, Default)]
pub struct MonitorFeed;

impl MonitorFeed {
    /// Create a feed
    pub fn new() -> Self {
        Self
    }

    /// Sample one item from the candidate pool
    pub fn sample(&self) -> SampleItem {
        let mut rng = rand::rng();
        let content = SAMPLE_CONTENTS[rng.random_range(0..SAMPLE_CONTENTS.len())];
        let source = SAMPLE_SOURCES[rng.random_range(0..SAMPLE_SOURCES.len())];
        SampleItem {
            id: Uuid::now_v7().to_string(),
            content: content.to_string(),
            source: source.to_string(),
            timestamp: now_millis(),
        }
    }
}

/// Starts and stops per-connection monitoring sessions.
///
/// At most one session runs per connection: starting a new one atomically
/// replaces any prior session for that connection.
pub struct SessionManager {
    pipeline: Arc<ClassificationPipeline>,
    feed: MonitorFeed,
    cadence: Duration,
}

impl SessionManager {
    /// Create a session manager over the shared pipeline
    pub fn new(pipeline: Arc<ClassificationPipeline>, cadence: Duration) -> Self {
        Self {
            pipeline,
            feed: MonitorFeed::new(),
            cadence,
        }
    }

    /// Start a monitoring session on the connection, replacing any
    /// existing one.
    pub fn start(&self, connection: &Arc<Connection>) {
        // The new generation invalidates any in-flight result from a
        // previous session before the old task is even aborted.
        let generation = connection.bump_session_generation();
        connection.cancel_session();

        let conn = Arc::clone(connection);
        let pipeline = Arc::clone(&self.pipeline);
        let feed = self.feed;
        let cadence = self.cadence;

        let handle = tokio::spawn(async move {
            let mut ticker = interval(cadence);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; the first event should
            // come one full cadence after the session starts.
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let item = feed.sample();
                let result = pipeline
                    .analyze(&item.content, Some(&item.source), AnalysisDepth::RealTime)
                    .await;

                // The session may have been stopped or replaced while the
                // classification was in flight; stale results are discarded.
                if !conn.is_open() || conn.current_session_generation() != generation {
                    debug!(conn_id = %conn.id(), "discarding stale monitoring result");
                    break;
                }

                conn.send(Outbound::Event(Envelope::AnalysisResult {
                    data: Box::new(AnalysisEvent {
                        id: item.id,
                        content: item.content,
                        source: item.source,
                        timestamp: item.timestamp,
                        result,
                    }),
                }));
            }
        });

        connection.install_session(MonitoringSession::new(handle));
        debug!(conn_id = %connection.id(), generation, "monitoring session started");
    }

    /// Stop the connection's monitoring session, if any.
    ///
    /// Returns whether a session existed. After this returns, no further
    /// classification calls are issued on the session's behalf.
    pub fn stop(&self, connection: &Arc<Connection>) -> bool {
        connection.bump_session_generation();
        let existed = connection.cancel_session();
        if existed {
            debug!(conn_id = %connection.id(), "monitoring session stopped");
        }
        existed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionId;
    use tokio::sync::mpsc;
    use verity_domain::Classification;
    use verity_llm::MockClassifier;

    fn make_manager(cadence: Duration) -> SessionManager {
        let provider = MockClassifier::succeeding(Classification::Authentic);
        let pipeline = Arc::new(ClassificationPipeline::new(Arc::new(provider)));
        SessionManager::new(pipeline, cadence)
    }

    fn make_connection(capacity: usize) -> (Arc<Connection>, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Arc::new(Connection::new(ConnectionId::new(), tx)),
            rx,
        )
    }

    #[test]
    fn test_feed_samples_from_pool() {
        let feed = MonitorFeed::new();
        for _ in 0..20 {
            let item = feed.sample();
            assert!(SAMPLE_CONTENTS.contains(&item.content.as_str()));
            assert!(SAMPLE_SOURCES.contains(&item.source.as_str()));
            assert!(!item.id.is_empty());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_emits_analysis_results() {
        let manager = make_manager(Duration::from_secs(3));
        let (conn, mut rx) = make_connection(16);

        manager.start(&conn);
        tokio::time::advance(Duration::from_millis(3100)).await;
        tokio::task::yield_now().await;

        match rx.recv().await.unwrap() {
            Outbound::Event(Envelope::AnalysisResult { data }) => {
                assert!(SAMPLE_CONTENTS.contains(&data.content.as_str()));
            }
            other => panic!("expected analysis result, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_keeps_a_single_session() {
        let manager = make_manager(Duration::from_secs(3));
        let (conn, mut rx) = make_connection(64);

        manager.start(&conn);
        manager.start(&conn);
        assert!(conn.has_session());
        assert_eq!(conn.current_session_generation(), 2);

        // Let the restarted session register its timer before advancing.
        tokio::task::yield_now().await;

        // Over four cadences a single session produces at most four events;
        // a duplicated session would produce roughly twice that.
        for _ in 0..4 {
            tokio::time::advance(Duration::from_millis(3_100)).await;
            tokio::task::yield_now().await;
        }

        let mut events = 0;
        while let Ok(out) = rx.try_recv() {
            if matches!(out, Outbound::Event(Envelope::AnalysisResult { .. })) {
                events += 1;
            }
        }
        assert!(events >= 1, "session should have produced events");
        assert!(events <= 4, "duplicate session detected: {events} events");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_the_event_stream() {
        let manager = make_manager(Duration::from_secs(3));
        let (conn, mut rx) = make_connection(64);

        manager.start(&conn);
        tokio::time::advance(Duration::from_millis(3100)).await;
        tokio::task::yield_now().await;

        assert!(manager.stop(&conn));
        assert!(!conn.has_session());
        while rx.try_recv().is_ok() {}

        tokio::time::advance(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err(), "events after stop");
    }

    #[tokio::test]
    async fn test_stop_without_session_reports_none() {
        let manager = make_manager(Duration::from_secs(3));
        let (conn, _rx) = make_connection(4);
        assert!(!manager.stop(&conn));
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_connection_receives_nothing() {
        let manager = make_manager(Duration::from_secs(3));
        let (conn, mut rx) = make_connection(64);

        manager.start(&conn);
        conn.close();

        tokio::time::advance(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
    }
}
