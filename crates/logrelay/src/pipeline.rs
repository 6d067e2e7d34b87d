// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Per-datagram processing: sanitize, classify, persist, relay, and build the reply.

use std::fmt::Display;
use std::sync::Arc;

use tracing::{debug, error};

use crate::admin_api::EventSink;
use crate::parser::parse;
use crate::router::route;
use crate::sanitize::strip_zero_bytes;
use crate::transcript::Transcript;

#[derive(Clone)]
pub struct EventPipeline {
    sink: Arc<dyn EventSink>,
    transcript: Transcript,
}

impl EventPipeline {
    pub fn new(sink: Arc<dyn EventSink>, transcript: Transcript) -> Self {
        EventPipeline { sink, transcript }
    }

    /// Runs one datagram payload through the pipeline and returns the reply to echo.
    ///
    /// A classified event is written to the transcript, relayed if its category routes
    /// anywhere, and echoed back as its JSON line. A line that fails to classify is only
    /// logged; the reply then carries an error object instead of an event.
    pub async fn process(&self, payload: &[u8]) -> Vec<u8> {
        let clean = strip_zero_bytes(payload);
        let line = String::from_utf8_lossy(&clean);

        let event = match parse(&line) {
            Ok(event) => event,
            Err(e) => {
                error!("Failed to parse log line {:?}: {}", line.trim_end(), e);
                return failure_reply(&e);
            }
        };
        debug!("{} {}", event.category(), event.time);

        let json = match event.to_json() {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize {} event: {}", event.category(), e);
                return failure_reply(&e);
            }
        };

        self.transcript.record(&json).await;

        if let Some(endpoint) = route(event.category()) {
            self.sink.forward(endpoint, &json).await;
        }

        let mut reply = json.into_bytes();
        reply.push(b'\n');
        strip_zero_bytes(&reply)
    }
}

/// Reply sent for a datagram that produced no event: `{"error":"..."}` plus newline.
pub fn failure_reply(error: &impl Display) -> Vec<u8> {
    let mut reply = serde_json::json!({ "error": error.to_string() })
        .to_string()
        .into_bytes();
    reply.push(b'\n');
    reply
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::router::Endpoint;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use time::UtcOffset;
    use tracing_test::traced_test;

    #[derive(Default)]
    struct CapturingSink {
        calls: Mutex<Vec<(Endpoint, String)>>,
    }

    #[async_trait]
    impl EventSink for CapturingSink {
        async fn forward(&self, endpoint: Endpoint, payload: &str) {
            self.calls
                .lock()
                .unwrap()
                .push((endpoint, payload.to_string()));
        }
    }

    struct Fixture {
        sink: Arc<CapturingSink>,
        pipeline: EventPipeline,
        transcript: Transcript,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(CapturingSink::default());
        let transcript = Transcript::new(dir.path(), UtcOffset::UTC);
        let pipeline = EventPipeline::new(sink.clone(), transcript.clone());
        Fixture {
            sink,
            pipeline,
            transcript,
            _dir: dir,
        }
    }

    fn transcript_lines(transcript: &Transcript) -> Vec<String> {
        match std::fs::read_to_string(transcript.current_path()) {
            Ok(contents) => contents.lines().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_game_over_is_persisted_and_relayed_once() {
        let f = fixture();
        let reply = f
            .pipeline
            .process(b"L 11/23/2019 - 19:29:07: Game Over: competitive mg_active de_dust2 score 16:9 after 42 min\n")
            .await;

        let calls = f.sink.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, Endpoint::MatchEnd);

        let lines = transcript_lines(&f.transcript);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], calls[0].1);

        let reply = String::from_utf8(reply).unwrap();
        assert_eq!(reply, format!("{}\n", lines[0]));
        let value: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(value["type"], "GameOver");
        assert_eq!(value["map"], "de_dust2");
    }

    #[tokio::test]
    async fn test_unrouted_category_is_persisted_only() {
        let f = fixture();
        let reply = f
            .pipeline
            .process(b"L 11/23/2019 - 19:29:07: \"alice<2><STEAM_1:0:111><CT>\" say \"gg\"")
            .await;

        assert!(f.sink.calls.lock().unwrap().is_empty());
        let lines = transcript_lines(&f.transcript);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("\"type\":\"PlayerSay\""));
        assert!(String::from_utf8(reply).unwrap().contains("PlayerSay"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_malformed_line_produces_error_reply_only() {
        let f = fixture();
        let reply = f.pipeline.process(b"definitely not a log line").await;

        assert!(f.sink.calls.lock().unwrap().is_empty());
        assert!(transcript_lines(&f.transcript).is_empty());
        assert!(!f.transcript.current_path().exists());

        let value: serde_json::Value = serde_json::from_slice(&reply).unwrap();
        assert_eq!(value["error"], "could not parse message");
        assert!(value.get("type").is_none());
        assert!(logs_contain("Failed to parse log line"));
    }

    #[tokio::test]
    async fn test_zero_bytes_are_stripped_before_classification() {
        let f = fixture();
        let mut payload = b"L 11/23/2019 - 19:29:07: World\0 triggered \"Round_End\"\n".to_vec();
        payload.extend_from_slice(&[0; 32]);

        let reply = f.pipeline.process(&payload).await;

        assert!(!reply.contains(&0));
        let calls = f.sink.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, Endpoint::RoundEnd);
    }

    #[tokio::test]
    async fn test_unknown_body_is_persisted_not_relayed() {
        let f = fixture();
        f.pipeline
            .process(b"L 11/23/2019 - 19:29:07: Log file closed")
            .await;

        assert!(f.sink.calls.lock().unwrap().is_empty());
        let lines = transcript_lines(&f.transcript);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("\"type\":\"Unknown\""));
    }

    #[test]
    fn test_failure_reply_shape() {
        let reply = failure_reply(&"boom");
        assert_eq!(reply, b"{\"error\":\"boom\"}\n".to_vec());
    }
}
