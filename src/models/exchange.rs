//! Exchange capture record
//!
//! Pairs a captured request with the response that eventually answers it.
//! The owning proxy session drives the lifecycle: the core never decides on
//! its own that an exchange is complete.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::models::message::{HttpMessage, StartLine};

/// State of a captured exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExchangeState {
    /// Request captured, response not yet seen
    AwaitingResponse,
    /// Response captured
    Completed,
    /// Connection dropped or upstream failed before a response arrived
    Failed,
}

/// One request/response pair flowing through the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    /// Unique identifier for this exchange
    pub id: String,
    pub request: HttpMessage,
    pub response: Option<HttpMessage>,
    pub state: ExchangeState,
    /// When the request was captured, milliseconds since epoch
    pub started_at: i64,
    /// When the exchange finished, milliseconds since epoch
    pub completed_at: Option<i64>,
}

impl Exchange {
    /// Create a record for a freshly captured request.
    pub fn new(request: HttpMessage) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            request,
            response: None,
            state: ExchangeState::AwaitingResponse,
            started_at: Utc::now().timestamp_millis(),
            completed_at: None,
        }
    }

    /// Attach the response observed by the owning session.
    pub fn complete(&mut self, response: HttpMessage) {
        self.response = Some(response);
        self.state = ExchangeState::Completed;
        self.completed_at = Some(Utc::now().timestamp_millis());
    }

    /// Mark the exchange as failed.
    pub fn fail(&mut self) {
        self.state = ExchangeState::Failed;
        self.completed_at = Some(Utc::now().timestamp_millis());
    }

    pub fn duration_ms(&self) -> Option<i64> {
        self.completed_at.map(|end| end - self.started_at)
    }

    /// Get duration as formatted string
    pub fn duration_str(&self) -> String {
        match self.duration_ms() {
            Some(ms) if ms < 1000 => format!("{}ms", ms),
            Some(ms) => format!("{:.1}s", ms as f64 / 1000.0),
            None => "-".to_string(),
        }
    }

    /// Get response size as formatted string
    pub fn size_str(&self) -> String {
        match self.response.as_ref().map(|r| r.body_len() as u64) {
            Some(size) if size < 1024 => format!("{}B", size),
            Some(size) if size < 1024 * 1024 => format!("{:.1}KB", size as f64 / 1024.0),
            Some(size) => format!("{:.1}MB", size as f64 / (1024.0 * 1024.0)),
            None => "-".to_string(),
        }
    }

    /// One-line description for log output.
    pub fn summary(&self) -> String {
        let request_line = match &self.request.start_line {
            StartLine::Request { method, target, .. } => {
                format!("{} {}", method, target.origin_form())
            }
            StartLine::Response { .. } => "<response>".to_string(),
        };
        match self.response.as_ref().and_then(|r| r.status_code()) {
            Some(code) => format!("{request_line} -> {code} ({})", self.size_str()),
            None => format!("{request_line} -> pending"),
        }
    }
}
