//! # Chat Controller
//!
//! The submit lifecycle, split into two synchronous halves around the I/O:
//!
//! ```text
//! begin(text) ──► InFlight ──► Transport::post_query ──► complete(InFlight, outcome)
//!   │  gate taken                                          │  session adopted
//!   │  user turn + pending turn                            │  pending → answer | error
//!   └─ request built with current session                  └─ gate released
//! ```
//!
//! The TUI runs the I/O on a background task and calls `complete` from the
//! event loop. [`ChatController::submit`] runs all three steps inline.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use log::{info, warn};

use crate::api::{QueryRequest, QueryResponse, Transport, TransportError};
use crate::core::conversation::{ConversationRenderer, TurnId, TurnSink};
use crate::core::gate::{BusyGuard, InputGate};
use crate::core::session::SessionTracker;

/// Why a submission was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejected {
    /// Input trimmed to nothing.
    Empty,
    /// A query is already in flight.
    Busy,
}

/// Terminal state a query ended in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Answered(TurnId),
    Failed(TurnId),
}

/// An accepted submission whose outcome has not been applied yet.
///
/// Owns the gate: while this value exists no other query can begin. Dropping
/// it without [`ChatController::complete`] frees the gate, and the next
/// `begin` turns the abandoned placeholder into an error turn.
#[derive(Debug)]
pub struct InFlight {
    request: QueryRequest,
    pending: TurnId,
    busy: BusyGuard,
}

impl InFlight {
    pub fn request(&self) -> &QueryRequest {
        &self.request
    }

    pub fn pending_turn(&self) -> TurnId {
        self.pending
    }
}

pub struct ChatController<S: TurnSink> {
    gate: InputGate,
    session: SessionTracker,
    conversation: ConversationRenderer<S>,
    transport: Arc<dyn Transport>,
}

impl<S: TurnSink> ChatController<S> {
    /// Builds the controller and shows the welcome turn.
    pub fn new(transport: Arc<dyn Transport>, sink: S) -> Self {
        let mut conversation = ConversationRenderer::new(sink);
        conversation.start_new_conversation();
        Self {
            gate: InputGate::new(),
            session: SessionTracker::new(),
            conversation,
            transport,
        }
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    pub fn session(&self) -> &SessionTracker {
        &self.session
    }

    pub fn conversation(&self) -> &ConversationRenderer<S> {
        &self.conversation
    }

    pub fn conversation_mut(&mut self) -> &mut ConversationRenderer<S> {
        &mut self.conversation
    }

    /// True while a query is in flight; input should be shown disabled.
    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    /// Accepts a submission: takes the gate, renders the user turn and the
    /// pending placeholder, and builds the request.
    pub fn begin(&mut self, text: &str) -> Result<InFlight, Rejected> {
        let query = text.trim();
        if query.is_empty() {
            return Err(Rejected::Empty);
        }
        let busy = self.gate.try_acquire().ok_or(Rejected::Busy)?;

        // A ticket dropped without `complete` leaves its placeholder behind
        while let Some(stale) = self.conversation.first_pending() {
            warn!("Resolving abandoned pending turn {:?}", stale);
            self.conversation
                .resolve_pending_with_error(stale, &TransportError::Aborted.user_message());
        }

        self.conversation.append_user_turn(query);
        let pending = self.conversation.append_pending_turn();

        let request = QueryRequest {
            query: query.to_string(),
            session_id: self.session.current().map(str::to_string),
        };
        info!(
            "Query accepted (len={}, session={:?})",
            request.query.len(),
            request.session_id
        );

        Ok(InFlight {
            request,
            pending,
            busy,
        })
    }

    /// Applies the outcome of an in-flight query, then releases the gate.
    pub fn complete(
        &mut self,
        in_flight: InFlight,
        outcome: Result<QueryResponse, TransportError>,
    ) -> Resolution {
        let InFlight { pending, busy, .. } = in_flight;

        let resolution = match outcome {
            Ok(response) => {
                self.session.adopt_if_absent(&response.session_id);
                let id = self.conversation.resolve_pending(pending, &response);
                Resolution::Answered(id)
            }
            Err(e) => {
                warn!("Query failed: {}", e);
                let id = self
                    .conversation
                    .resolve_pending_with_error(pending, &e.user_message());
                Resolution::Failed(id)
            }
        };

        drop(busy);
        resolution
    }

    /// Runs a whole submission inline. A panicking transport is reported as
    /// [`TransportError::Aborted`].
    pub async fn submit(&mut self, text: &str) -> Result<Resolution, Rejected> {
        let in_flight = self.begin(text)?;
        let transport = Arc::clone(&self.transport);
        let outcome = AssertUnwindSafe(transport.post_query(in_flight.request()))
            .catch_unwind()
            .await
            .unwrap_or(Err(TransportError::Aborted));
        Ok(self.complete(in_flight, outcome))
    }

    /// Clears the conversation and forgets the session. Refused while a query
    /// is in flight so its placeholder cannot be orphaned.
    pub fn start_new_conversation(&mut self) -> bool {
        if self.gate.is_busy() {
            info!("New conversation refused: query in flight");
            return false;
        }
        self.session.reset();
        self.conversation.start_new_conversation();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::conversation::{ContentFormat, Role, WELCOME_MESSAGE};
    use crate::test_support::{ScriptedTransport, answer, test_controller};

    #[test]
    fn test_starts_with_welcome_turn() {
        let controller = test_controller(ScriptedTransport::default());
        let turns = controller.conversation().turns();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].content, WELCOME_MESSAGE);
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn test_submit_appends_user_and_answer() {
        let transport = ScriptedTransport::answering(vec![Ok(answer("Hi", "session_1", &[]))]);
        let mut controller = test_controller(transport.clone());

        let resolution = controller.submit("  hello  ").await;

        assert!(matches!(resolution, Ok(Resolution::Answered(_))));
        let turns = controller.conversation().turns();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[1].role, Role::User);
        assert_eq!(turns[1].content, "hello");
        assert_eq!(turns[2].content, "Hi");
        assert_eq!(turns[2].format, ContentFormat::Rich);
        assert_eq!(controller.conversation().pending_count(), 0);
        assert!(!controller.is_busy());
        assert_eq!(transport.seen()[0].query, "hello");
    }

    #[tokio::test]
    async fn test_whitespace_input_does_nothing() {
        let transport = ScriptedTransport::default();
        let mut controller = test_controller(transport.clone());

        assert_eq!(controller.submit("   \n\t").await, Err(Rejected::Empty));
        assert_eq!(controller.conversation().turns().len(), 1);
        assert!(transport.seen().is_empty());
    }

    #[test]
    fn test_second_begin_rejected_while_in_flight() {
        let transport = ScriptedTransport::default();
        let mut controller = test_controller(transport);

        let first = controller.begin("one").unwrap();
        assert!(controller.is_busy());
        assert_eq!(controller.begin("two").unwrap_err(), Rejected::Busy);

        // user + pending from the first submission only
        assert_eq!(controller.conversation().turns().len(), 3);
        assert_eq!(controller.conversation().pending_count(), 1);

        controller.complete(first, Ok(answer("done", "s", &[])));
        assert!(!controller.is_busy());
        assert!(controller.begin("three").is_ok());
    }

    #[tokio::test]
    async fn test_failure_renders_error_and_releases_gate() {
        let transport = ScriptedTransport::answering(vec![Err(TransportError::Status(500))]);
        let mut controller = test_controller(transport);

        let resolution = controller.submit("why").await;

        assert!(matches!(resolution, Ok(Resolution::Failed(_))));
        let last = controller.conversation().turns().last().unwrap();
        assert_eq!(last.content, "Error: Query failed");
        assert_eq!(last.format, ContentFormat::Literal);
        assert!(!controller.is_busy());
        assert_eq!(controller.session().current(), None);
    }

    #[tokio::test]
    async fn test_session_adopted_once_and_sent_afterwards() {
        let transport = ScriptedTransport::answering(vec![
            Ok(answer("a", "session_1", &[])),
            Ok(answer("b", "session_2", &[])),
            Ok(answer("c", "session_3", &[])),
        ]);
        let mut controller = test_controller(transport.clone());

        controller.submit("first").await.unwrap();
        controller.submit("second").await.unwrap();
        controller.submit("third").await.unwrap();

        assert_eq!(controller.session().current(), Some("session_1"));
        let seen = transport.seen();
        assert_eq!(seen[0].session_id, None);
        assert_eq!(seen[1].session_id.as_deref(), Some("session_1"));
        assert_eq!(seen[2].session_id.as_deref(), Some("session_1"));
    }

    #[tokio::test]
    async fn test_new_conversation_resets_session() {
        let transport = ScriptedTransport::answering(vec![Ok(answer("a", "session_1", &["doc"]))]);
        let mut controller = test_controller(transport);
        controller.submit("q").await.unwrap();

        assert!(controller.start_new_conversation());

        assert_eq!(controller.session().current(), None);
        let turns = controller.conversation().turns();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].content, WELCOME_MESSAGE);
    }

    #[test]
    fn test_new_conversation_refused_while_busy() {
        let mut controller = test_controller(ScriptedTransport::default());
        let in_flight = controller.begin("q").unwrap();

        assert!(!controller.start_new_conversation());
        assert_eq!(controller.conversation().pending_count(), 1);

        controller.complete(in_flight, Err(TransportError::Aborted));
        assert!(controller.start_new_conversation());
    }

    #[test]
    fn test_request_carries_trimmed_query() {
        let mut controller = test_controller(ScriptedTransport::default());
        let in_flight = controller.begin("  spaced out ").unwrap();
        assert_eq!(in_flight.request().query, "spaced out");
        assert_eq!(in_flight.request().session_id, None);
    }

    #[test]
    fn test_dropped_ticket_releases_gate() {
        let mut controller = test_controller(ScriptedTransport::default());
        let in_flight = controller.begin("q").unwrap();
        drop(in_flight);
        assert!(!controller.is_busy());
    }

    #[test]
    fn test_begin_after_dropped_ticket_keeps_one_pending_turn() {
        let mut controller = test_controller(ScriptedTransport::default());
        let abandoned = controller.begin("one").unwrap();
        let abandoned_pending = abandoned.pending_turn();
        drop(abandoned);

        let second = controller.begin("two").unwrap();

        let conversation = controller.conversation();
        assert_eq!(conversation.pending_count(), 1);
        assert_eq!(conversation.first_pending(), Some(second.pending_turn()));
        assert!(conversation.turns().iter().all(|t| t.id != abandoned_pending));
        // welcome, "one", abandoned error, "two", pending
        let contents: Vec<&str> = conversation.turns().iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents[1..4], ["one", "Error: request aborted", "two"]);

        controller.complete(second, Ok(answer("done", "s", &[])));
        assert_eq!(controller.conversation().pending_count(), 0);
    }

    #[test]
    fn test_submit_drives_with_block_on() {
        let transport = ScriptedTransport::answering(vec![Ok(answer("x", "s", &["a", "b"]))]);
        let mut controller = test_controller(transport);
        let resolution = tokio_test::block_on(controller.submit("q"));
        assert!(matches!(resolution, Ok(Resolution::Answered(_))));
        let last = controller.conversation().turns().last().unwrap();
        assert_eq!(last.sources_line().as_deref(), Some("a, b"));
    }
}
