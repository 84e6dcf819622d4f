//! # Conversation Renderer
//!
//! Owns the ordered list of turns and forwards every change to a
//! [`TurnSink`], the only thing that knows how turns are actually shown.
//!
//! ```text
//! append_user_turn ──┐
//! append_pending ────┤      ┌──────────────┐      ┌───────────┐
//! resolve_pending ───┼────► │ Vec<Turn>    │ ───► │ TurnSink  │
//! resolve_with_error ┤      └──────────────┘      └───────────┘
//! start_new ─────────┘
//! ```
//!
//! The list is append-only apart from the pending placeholder, which is
//! removed when its query resolves.

use chrono::{DateTime, Local};
use log::debug;

use crate::api::QueryResponse;

pub const WELCOME_MESSAGE: &str = "Welcome to the Course Materials Assistant! \
    I can help you with questions about courses, lessons and specific content. \
    What would you like to know?";

/// Joins source citations in the sources section.
pub const SOURCES_DELIMITER: &str = ", ";

const ERROR_PREFIX: &str = "Error: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TurnId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// How the content of a turn may be interpreted by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentFormat {
    /// Markdown. Only ever used for answers coming from the backend.
    Rich,
    /// Shown verbatim. User input and error text.
    Literal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub id: TurnId,
    pub role: Role,
    pub content: String,
    pub format: ContentFormat,
    pub sources: Vec<String>,
    /// Loading placeholder. Never survives its query's resolution.
    pub pending: bool,
    pub created_at: DateTime<Local>,
}

impl Turn {
    /// The sources section text, or `None` when there is nothing to cite.
    pub fn sources_line(&self) -> Option<String> {
        if self.sources.is_empty() {
            None
        } else {
            Some(self.sources.join(SOURCES_DELIMITER))
        }
    }

    pub fn is_error(&self) -> bool {
        self.role == Role::Assistant
            && self.format == ContentFormat::Literal
            && self.content.starts_with(ERROR_PREFIX)
    }
}

/// Presentation capability the renderer drives.
pub trait TurnSink {
    fn turn_appended(&mut self, turn: &Turn);
    fn turn_removed(&mut self, id: TurnId);
    fn cleared(&mut self);
    /// Bring the newest turn into view.
    fn scroll_to_latest(&mut self);
}

pub struct ConversationRenderer<S: TurnSink> {
    turns: Vec<Turn>,
    sink: S,
    next_id: u64,
}

impl<S: TurnSink> ConversationRenderer<S> {
    /// Creates an empty renderer. Call [`start_new_conversation`] to show the
    /// welcome turn.
    ///
    /// [`start_new_conversation`]: Self::start_new_conversation
    pub fn new(sink: S) -> Self {
        Self {
            turns: Vec::new(),
            sink,
            next_id: 1,
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Borrow the turns and the sink at the same time (for drawing).
    pub fn split_mut(&mut self) -> (&[Turn], &mut S) {
        (&self.turns, &mut self.sink)
    }

    pub fn pending_count(&self) -> usize {
        self.turns.iter().filter(|t| t.pending).count()
    }

    /// The oldest placeholder still waiting for an outcome.
    pub fn first_pending(&self) -> Option<TurnId> {
        self.turns.iter().find(|t| t.pending).map(|t| t.id)
    }

    pub fn append_user_turn(&mut self, text: &str) -> TurnId {
        self.append(Role::User, text.to_string(), ContentFormat::Literal, Vec::new(), false)
    }

    pub fn append_pending_turn(&mut self) -> TurnId {
        self.append(Role::Assistant, String::new(), ContentFormat::Literal, Vec::new(), true)
    }

    /// Swaps the placeholder for the real answer.
    pub fn resolve_pending(&mut self, pending: TurnId, response: &QueryResponse) -> TurnId {
        self.remove_pending(pending);
        self.append(
            Role::Assistant,
            response.answer.clone(),
            ContentFormat::Rich,
            response.sources.clone(),
            false,
        )
    }

    /// Swaps the placeholder for a literal `Error: <message>` turn.
    pub fn resolve_pending_with_error(&mut self, pending: TurnId, message: &str) -> TurnId {
        self.remove_pending(pending);
        self.append(
            Role::Assistant,
            format!("{ERROR_PREFIX}{message}"),
            ContentFormat::Literal,
            Vec::new(),
            false,
        )
    }

    /// Drops every turn and shows the welcome turn.
    pub fn start_new_conversation(&mut self) -> TurnId {
        self.turns.clear();
        self.sink.cleared();
        self.append(
            Role::Assistant,
            WELCOME_MESSAGE.to_string(),
            ContentFormat::Rich,
            Vec::new(),
            false,
        )
    }

    fn remove_pending(&mut self, id: TurnId) {
        let before = self.turns.len();
        self.turns.retain(|t| !(t.id == id && t.pending));
        if self.turns.len() != before {
            self.sink.turn_removed(id);
        } else {
            debug!("Pending turn {:?} already gone", id);
        }
    }

    fn append(
        &mut self,
        role: Role,
        content: String,
        format: ContentFormat,
        sources: Vec<String>,
        pending: bool,
    ) -> TurnId {
        let id = TurnId(self.next_id);
        self.next_id += 1;
        self.turns.push(Turn {
            id,
            role,
            content,
            format,
            sources,
            pending,
            created_at: Local::now(),
        });
        if let Some(turn) = self.turns.last() {
            self.sink.turn_appended(turn);
        }
        self.sink.scroll_to_latest();
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingSink, SinkOp};

    fn response(answer: &str, sources: &[&str]) -> QueryResponse {
        QueryResponse {
            answer: answer.to_string(),
            session_id: "session_1".to_string(),
            sources: sources.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_new_conversation_has_single_welcome_turn() {
        let mut conv = ConversationRenderer::new(RecordingSink::default());
        conv.append_user_turn("old");
        conv.start_new_conversation();
        assert_eq!(conv.turns().len(), 1);
        assert_eq!(conv.turns()[0].content, WELCOME_MESSAGE);
        assert_eq!(conv.turns()[0].role, Role::Assistant);
    }

    #[test]
    fn test_user_turn_is_literal() {
        let mut conv = ConversationRenderer::new(RecordingSink::default());
        conv.append_user_turn("**not bold**");
        let turn = &conv.turns()[0];
        assert_eq!(turn.format, ContentFormat::Literal);
        assert_eq!(turn.content, "**not bold**");
    }

    #[test]
    fn test_resolve_pending_replaces_placeholder() {
        let mut conv = ConversationRenderer::new(RecordingSink::default());
        conv.append_user_turn("q");
        let pending = conv.append_pending_turn();
        assert_eq!(conv.pending_count(), 1);

        conv.resolve_pending(pending, &response("**answer**", &["doc1", "doc2"]));

        assert_eq!(conv.pending_count(), 0);
        let last = conv.turns().last().unwrap();
        assert_eq!(last.format, ContentFormat::Rich);
        assert_eq!(last.sources_line().as_deref(), Some("doc1, doc2"));
        assert!(conv.sink().ops.contains(&SinkOp::Removed(pending)));
    }

    #[test]
    fn test_no_sources_section_when_empty() {
        let mut conv = ConversationRenderer::new(RecordingSink::default());
        let pending = conv.append_pending_turn();
        conv.resolve_pending(pending, &response("answer", &[]));
        assert_eq!(conv.turns().last().unwrap().sources_line(), None);
    }

    #[test]
    fn test_error_turn_is_prefixed_literal() {
        let mut conv = ConversationRenderer::new(RecordingSink::default());
        let pending = conv.append_pending_turn();
        conv.resolve_pending_with_error(pending, "Query failed");
        let last = conv.turns().last().unwrap();
        assert_eq!(last.content, "Error: Query failed");
        assert_eq!(last.format, ContentFormat::Literal);
        assert_eq!(last.role, Role::Assistant);
        assert!(last.is_error());
        assert_eq!(conv.pending_count(), 0);
    }

    #[test]
    fn test_every_append_scrolls_to_latest() {
        let mut conv = ConversationRenderer::new(RecordingSink::default());
        let first = conv.append_user_turn("a");
        let second = conv.append_pending_turn();
        assert_eq!(
            conv.sink().ops,
            vec![
                SinkOp::Appended(first),
                SinkOp::Scrolled,
                SinkOp::Appended(second),
                SinkOp::Scrolled,
            ]
        );
    }

    #[test]
    fn test_ids_not_reused_across_conversations() {
        let mut conv = ConversationRenderer::new(RecordingSink::default());
        let a = conv.append_user_turn("a");
        let welcome = conv.start_new_conversation();
        assert!(welcome > a);
    }
}
