//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::api::{CourseStats, QueryRequest, QueryResponse, Transport, TransportError};
use crate::core::controller::ChatController;
use crate::core::conversation::{Turn, TurnId, TurnSink};

#[derive(Debug, Clone, PartialEq)]
pub enum SinkOp {
    Appended(TurnId),
    Removed(TurnId),
    Cleared,
    Scrolled,
}

/// A sink that remembers every call made on it, in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub ops: Vec<SinkOp>,
}

impl TurnSink for RecordingSink {
    fn turn_appended(&mut self, turn: &Turn) {
        self.ops.push(SinkOp::Appended(turn.id));
    }

    fn turn_removed(&mut self, id: TurnId) {
        self.ops.push(SinkOp::Removed(id));
    }

    fn cleared(&mut self) {
        self.ops.push(SinkOp::Cleared);
    }

    fn scroll_to_latest(&mut self) {
        self.ops.push(SinkOp::Scrolled);
    }
}

/// Transport that replays queued outcomes and records every query it sees.
#[derive(Default, Clone)]
pub struct ScriptedTransport {
    pub queries: Arc<Mutex<VecDeque<Result<QueryResponse, TransportError>>>>,
    pub stats: Arc<Mutex<Option<Result<CourseStats, TransportError>>>>,
    pub seen: Arc<Mutex<Vec<QueryRequest>>>,
}

impl ScriptedTransport {
    pub fn answering(answers: Vec<Result<QueryResponse, TransportError>>) -> Self {
        let transport = Self::default();
        transport.queries.lock().unwrap().extend(answers);
        transport
    }

    pub fn with_stats(stats: Result<CourseStats, TransportError>) -> Self {
        let transport = Self::default();
        *transport.stats.lock().unwrap() = Some(stats);
        transport
    }

    pub fn seen(&self) -> Vec<QueryRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post_query(&self, request: &QueryRequest) -> Result<QueryResponse, TransportError> {
        self.seen.lock().unwrap().push(request.clone());
        self.queries
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(TransportError::Network("no scripted answer".to_string())))
    }

    async fn course_stats(&self) -> Result<CourseStats, TransportError> {
        self.stats
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(Err(TransportError::Status(503)))
    }
}

pub fn answer(text: &str, session: &str, sources: &[&str]) -> QueryResponse {
    QueryResponse {
        answer: text.to_string(),
        session_id: session.to_string(),
        sources: sources.iter().map(|s| s.to_string()).collect(),
    }
}

/// A controller over a scripted transport, already showing the welcome turn.
pub fn test_controller(transport: ScriptedTransport) -> ChatController<RecordingSink> {
    ChatController::new(Arc::new(transport), RecordingSink::default())
}
