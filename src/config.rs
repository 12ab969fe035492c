//! Overlay configuration.
//!
//! `OverlayConfig` is plain data chosen once when an overlay is built. Names
//! coming from the command line are parsed strictly with `FromStr` (returning
//! [`ConfigError`]) or leniently with [`Placement::parse_lenient`], which falls
//! back to defaults instead of failing.

use std::time::Duration;

use thiserror::Error;

use crate::geometry::{Align, Placement, Side};
use crate::visibility::TriggerMode;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown placement side `{0}` (expected top, bottom, left or right)")]
    UnknownSide(String),
    #[error("unknown placement align `{0}` (expected start, center or end)")]
    UnknownAlign(String),
    #[error("unknown trigger mode `{0}` (expected hover, click or focus)")]
    UnknownTrigger(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayConfig {
    pub placement: Placement,
    pub trigger: TriggerMode,
    /// Hover-open debounce. Ignored for click and focus triggers.
    pub delay: Duration,
    /// Close when an item inside the panel is activated.
    pub close_on_click: bool,
    pub close_on_escape: bool,
    /// Close when focus leaves the overlay.
    pub close_on_blur: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            placement: Placement::default(),
            trigger: TriggerMode::default(),
            delay: Duration::ZERO,
            close_on_click: true,
            close_on_escape: true,
            close_on_blur: false,
        }
    }
}

impl OverlayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    #[must_use]
    pub fn side(mut self, side: Side) -> Self {
        self.placement.side = side;
        self
    }

    #[must_use]
    pub fn align(mut self, align: Align) -> Self {
        self.placement.align = align;
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: u16) -> Self {
        self.placement.offset = offset;
        self
    }

    #[must_use]
    pub fn trigger(mut self, trigger: TriggerMode) -> Self {
        self.trigger = trigger;
        self
    }

    #[must_use]
    pub fn delay_ms(mut self, ms: u64) -> Self {
        self.delay = Duration::from_millis(ms);
        self
    }

    #[must_use]
    pub fn close_on_click(mut self, enabled: bool) -> Self {
        self.close_on_click = enabled;
        self
    }

    #[must_use]
    pub fn close_on_escape(mut self, enabled: bool) -> Self {
        self.close_on_escape = enabled;
        self
    }

    #[must_use]
    pub fn close_on_blur(mut self, enabled: bool) -> Self {
        self.close_on_blur = enabled;
        self
    }
}
