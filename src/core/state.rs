//! # Application State
//!
//! Core business state for Lectern. Domain logic only, no TUI-specific
//! types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App<S>
//! ├── controller: ChatController<S>   // gate + session + conversation
//! ├── in_flight: Option<InFlight>     // ticket of the outstanding query
//! ├── desktop_stats: StatsSlot        // sidebar stats
//! ├── mobile_stats: StatsSlot         // drawer stats
//! ├── themes: ThemeController         // persisted theme
//! └── status_message: String          // title bar text
//! ```
//!
//! Background results only change state through [`App::update`].

use log::{debug, info, warn};
use std::sync::Arc;

use crate::api::{QueryRequest, Transport};
use crate::core::action::Action;
use crate::core::controller::{ChatController, InFlight, Rejected, Resolution};
use crate::core::conversation::TurnSink;
use crate::core::stats::{Placement, StatsSlot, StatsTarget};
use crate::core::theme::ThemeController;

/// Questions offered in the sidebar and the drawer.
pub const SUGGESTED_QUESTIONS: [&str; 3] = [
    "What is the outline of the MCP course?",
    "Are there any courses that explain what RAG is?",
    "What was covered in lesson 5 of the MCP course?",
];

pub const STATUS_READY: &str = "Ready";
pub const STATUS_THINKING: &str = "Thinking...";

pub struct App<S: TurnSink> {
    pub controller: ChatController<S>,
    pub in_flight: Option<InFlight>,
    pub desktop_stats: StatsSlot,
    pub mobile_stats: StatsSlot,
    pub themes: ThemeController,
    pub status_message: String,
}

impl<S: TurnSink> App<S> {
    pub fn new(transport: Arc<dyn Transport>, sink: S, themes: ThemeController) -> Self {
        Self {
            controller: ChatController::new(transport, sink),
            in_flight: None,
            desktop_stats: StatsSlot::default(),
            mobile_stats: StatsSlot::default(),
            themes,
            status_message: String::from(STATUS_READY),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.controller.is_busy()
    }

    pub fn stats(&self, placement: Placement) -> &StatsSlot {
        match placement {
            Placement::Desktop => &self.desktop_stats,
            Placement::Mobile => &self.mobile_stats,
        }
    }

    fn stats_mut(&mut self, placement: Placement) -> &mut StatsSlot {
        match placement {
            Placement::Desktop => &mut self.desktop_stats,
            Placement::Mobile => &mut self.mobile_stats,
        }
    }

    /// Accepts typed or suggested input. Returns the request the caller must
    /// send, or `None` when the submission was ignored.
    pub fn submit(&mut self, text: &str) -> Option<QueryRequest> {
        match self.controller.begin(text) {
            Ok(in_flight) => {
                let request = in_flight.request().clone();
                self.in_flight = Some(in_flight);
                self.status_message = String::from(STATUS_THINKING);
                Some(request)
            }
            Err(Rejected::Empty) => None,
            Err(Rejected::Busy) => {
                debug!("Submission ignored: query in flight");
                None
            }
        }
    }

    pub fn new_chat(&mut self) -> bool {
        let started = self.controller.start_new_conversation();
        self.status_message = if started {
            String::from("New conversation")
        } else {
            String::from("Wait for the current answer first")
        };
        started
    }

    pub fn update(&mut self, action: Action) {
        match action {
            Action::QueryFinished(outcome) => {
                let Some(in_flight) = self.in_flight.take() else {
                    warn!("Query result arrived with nothing in flight; dropped");
                    return;
                };
                match self.controller.complete(in_flight, outcome) {
                    Resolution::Answered(_) => {
                        self.status_message = String::from(STATUS_READY);
                    }
                    Resolution::Failed(_) => {
                        self.status_message = String::from("Query failed");
                    }
                }
            }
            Action::StatsLoaded(placement, view) => {
                info!("Stats loaded for {:?}: {} courses", placement, view.total_courses);
                self.stats_mut(placement).show(view);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TransportError;
    use crate::core::conversation::ContentFormat;
    use crate::core::preferences::MemoryPreferenceStore;
    use crate::core::stats::{CourseList, StatsView};
    use crate::core::theme::Theme;
    use crate::test_support::{RecordingSink, ScriptedTransport, answer};

    fn test_app() -> App<RecordingSink> {
        let themes = ThemeController::new(Box::new(MemoryPreferenceStore::default()), Theme::Dark);
        App::new(Arc::new(ScriptedTransport::default()), RecordingSink::default(), themes)
    }

    #[test]
    fn test_app_new_defaults() {
        let app = test_app();
        assert_eq!(app.status_message, STATUS_READY);
        assert!(!app.is_busy());
        assert!(app.desktop_stats.view.is_none());
        assert_eq!(app.controller.conversation().turns().len(), 1);
    }

    #[test]
    fn test_submit_then_finish() {
        let mut app = test_app();
        let request = app.submit("What is RAG?").unwrap();
        assert_eq!(request.query, "What is RAG?");
        assert!(app.is_busy());
        assert_eq!(app.status_message, STATUS_THINKING);

        // second submission while busy is ignored
        assert!(app.submit("again").is_none());

        app.update(Action::QueryFinished(Ok(answer("RAG is...", "s1", &["Lesson 1"]))));
        assert!(!app.is_busy());
        assert_eq!(app.status_message, STATUS_READY);
        assert_eq!(app.controller.session().current(), Some("s1"));
        let last = app.controller.conversation().turns().last().unwrap();
        assert_eq!(last.format, ContentFormat::Rich);
    }

    #[test]
    fn test_failed_query_sets_status() {
        let mut app = test_app();
        app.submit("q").unwrap();
        app.update(Action::QueryFinished(Err(TransportError::Status(502))));
        assert_eq!(app.status_message, "Query failed");
        assert!(!app.is_busy());
    }

    #[test]
    fn test_stray_result_is_ignored() {
        let mut app = test_app();
        app.update(Action::QueryFinished(Ok(answer("late", "s", &[]))));
        assert_eq!(app.controller.conversation().turns().len(), 1);
        assert_eq!(app.controller.session().current(), None);
    }

    #[test]
    fn test_stats_land_in_their_own_slot() {
        let mut app = test_app();
        app.update(Action::StatsLoaded(Placement::Mobile, StatsView::failed()));
        assert!(app.stats(Placement::Desktop).view.is_none());
        assert_eq!(
            app.stats(Placement::Mobile).view.as_ref().map(|v| &v.courses),
            Some(&CourseList::Failed)
        );
    }

    #[test]
    fn test_new_chat_refused_while_busy() {
        let mut app = test_app();
        app.submit("q").unwrap();
        assert!(!app.new_chat());
        app.update(Action::QueryFinished(Err(TransportError::Aborted)));
        assert!(app.new_chat());
        assert_eq!(app.controller.conversation().turns().len(), 1);
    }
}
