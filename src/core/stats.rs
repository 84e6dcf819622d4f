//! # Stats Panel
//!
//! Fire-and-forget display of catalogue numbers. Independent of the
//! conversation: a failed fetch only changes what the panel shows.

use std::sync::Arc;

use log::{debug, warn};

use crate::api::{CourseStats, Transport};

/// Where a panel (or a theme selector) is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    /// Sidebar of the wide layout.
    Desktop,
    /// Navigation drawer of the narrow layout.
    Mobile,
}

impl Placement {
    pub const ALL: [Placement; 2] = [Placement::Desktop, Placement::Mobile];
}

#[derive(Debug, Clone, PartialEq)]
pub enum CourseList {
    Titles(Vec<String>),
    /// Backend answered with an empty catalogue.
    Empty,
    /// Fetch failed.
    Failed,
}

/// What a stats panel shows after a refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsView {
    pub total_courses: u64,
    pub courses: CourseList,
}

impl StatsView {
    pub fn from_stats(stats: CourseStats) -> Self {
        let courses = if stats.course_titles.is_empty() {
            CourseList::Empty
        } else {
            CourseList::Titles(stats.course_titles)
        };
        Self {
            total_courses: stats.total_courses,
            courses,
        }
    }

    pub fn failed() -> Self {
        Self {
            total_courses: 0,
            courses: CourseList::Failed,
        }
    }

    pub fn count_label(&self) -> String {
        self.total_courses.to_string()
    }

    /// Lines for the course list: the titles in order, or a single indicator.
    pub fn course_lines(&self) -> Vec<String> {
        match &self.courses {
            CourseList::Titles(titles) => titles.clone(),
            CourseList::Empty => vec!["No courses available".to_string()],
            CourseList::Failed => vec!["Failed to load courses".to_string()],
        }
    }
}

/// Something a [`StatsView`] can be rendered into.
pub trait StatsTarget {
    fn show(&mut self, view: StatsView);
}

/// Holds the latest view for one placement. `None` until the first refresh
/// lands.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StatsSlot {
    pub view: Option<StatsView>,
}

impl StatsTarget for StatsSlot {
    fn show(&mut self, view: StatsView) {
        self.view = Some(view);
    }
}

pub struct StatsPanel {
    transport: Arc<dyn Transport>,
}

impl StatsPanel {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Fetches the stats. Never fails: errors become [`StatsView::failed`].
    pub async fn fetch(&self) -> StatsView {
        match self.transport.course_stats().await {
            Ok(stats) => {
                debug!(
                    "Course stats: total={}, titles={}",
                    stats.total_courses,
                    stats.course_titles.len()
                );
                StatsView::from_stats(stats)
            }
            Err(e) => {
                warn!("Failed to load course stats: {}", e);
                StatsView::failed()
            }
        }
    }
}
