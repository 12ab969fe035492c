//! Shared component rendering context
//!
//! `ComponentContext` carries the per-pass facts components need during
//! rendering and event handling: whether they hold keyboard focus, the host's
//! scroll offset (to convert between viewport and document space) and the
//! timestamp of the current pass (for hover-open deadlines).

use std::time::Instant;

use crate::geometry::ScrollOffset;

#[derive(Debug, Clone, Copy)]
pub struct ComponentContext {
    focused: bool,
    scroll: ScrollOffset,
    now: Instant,
}

impl ComponentContext {
    /// Create a context for the current instant with no scroll.
    pub fn new(focused: bool) -> Self {
        Self {
            focused,
            scroll: ScrollOffset::default(),
            now: Instant::now(),
        }
    }

    pub const fn focused(&self) -> bool {
        self.focused
    }

    pub const fn scroll(&self) -> ScrollOffset {
        self.scroll
    }

    pub const fn now(&self) -> Instant {
        self.now
    }

    pub const fn with_focus(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub const fn with_scroll(mut self, scroll: ScrollOffset) -> Self {
        self.scroll = scroll;
        self
    }

    pub const fn with_now(mut self, now: Instant) -> Self {
        self.now = now;
        self
    }
}

impl Default for ComponentContext {
    fn default() -> Self {
        Self::new(false)
    }
}
