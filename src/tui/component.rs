use ratatui::Frame;
use ratatui::layout::Rect;

/// A reusable piece of the screen.
///
/// Props come in as struct fields; persistent presentation state is borrowed
/// as `&mut` so `render` can update caches (layout heights, hit regions,
/// scroll offsets) while drawing, the way ratatui's `StatefulWidget` does.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// Something that turns raw [`TuiEvent`](super::event::TuiEvent)s into
/// higher-level events of its own.
pub trait EventHandler {
    type Event;

    fn handle_event(&mut self, event: &super::event::TuiEvent) -> Option<Self::Event>;
}
