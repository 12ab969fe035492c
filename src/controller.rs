//! Overlay controller: visibility plus placement.
//!
//! The controller owns one [`VisibilityMachine`] and keeps the resolved
//! position of the floating panel fresh. Opening never measures inside the
//! event handler, because the panel has not been drawn yet at that point.
//! Instead the open path marks the controller as needing measurement and the
//! host calls [`OverlayController::after_render`] once the panel has been
//! committed to the frame.
//!
//! While open, the controller holds a [`ViewportSubscription`]; resize and
//! scroll signals published by the host cause the position to be resolved
//! again. The subscription is released on close, on [`unmount`] and when the
//! controller is dropped.
//!
//! [`unmount`]: OverlayController::unmount

use std::time::Instant;

use crossterm::event::{Event, KeyEventKind, MouseEvent, MouseEventKind};

use crate::config::OverlayConfig;
use crate::geometry::{Bounds, Placement, Position, resolve_position};
use crate::host::{ElementId, Measure, ViewportSignals, ViewportSubscription};
use crate::keybindings::{Action, KeyBindings};
use crate::visibility::{Intent, Transition, TriggerMode, VisibilityInput, VisibilityMachine};

/// Snapshot exposed to renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlayState {
    pub is_open: bool,
    /// `None` until the first successful measurement after opening.
    pub position: Option<Position>,
}

#[derive(Debug)]
pub struct OverlayController {
    machine: VisibilityMachine,
    placement: Placement,
    trigger: ElementId,
    floating: ElementId,
    position: Option<Position>,
    signals: ViewportSignals,
    subscription: Option<ViewportSubscription>,
    needs_measure: bool,
    hovered: bool,
    // Cleared by `unmount`; an open transition mounts again.
    mounted: bool,
    keys: KeyBindings,
}

impl OverlayController {
    pub fn new(
        config: OverlayConfig,
        trigger: ElementId,
        floating: ElementId,
        signals: ViewportSignals,
    ) -> Self {
        Self::with_machine(
            VisibilityMachine::uncontrolled(config),
            trigger,
            floating,
            signals,
        )
    }

    /// Build a controller whose open flag belongs to the caller. Transitions
    /// are reported through `on_request_change`; apply them with
    /// [`OverlayController::set_external_open`].
    pub fn controlled<F>(
        config: OverlayConfig,
        trigger: ElementId,
        floating: ElementId,
        signals: ViewportSignals,
        external_open: bool,
        on_request_change: F,
    ) -> Self
    where
        F: FnMut(Intent) + 'static,
    {
        let mut controller = Self::with_machine(
            VisibilityMachine::controlled(config, external_open, on_request_change),
            trigger,
            floating,
            signals,
        );
        if external_open {
            controller.on_open();
        }
        controller
    }

    fn with_machine(
        machine: VisibilityMachine,
        trigger: ElementId,
        floating: ElementId,
        signals: ViewportSignals,
    ) -> Self {
        Self {
            placement: machine.config().placement,
            machine,
            trigger,
            floating,
            position: None,
            signals,
            subscription: None,
            needs_measure: false,
            hovered: false,
            mounted: true,
            keys: KeyBindings::default(),
        }
    }

    pub fn config(&self) -> &OverlayConfig {
        self.machine.config()
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Change placement; an open overlay is re-measured on the next pass.
    pub fn set_placement(&mut self, placement: Placement) {
        self.placement = placement;
        if self.is_open() {
            self.needs_measure = true;
        }
    }

    /// Open and mounted. A controlled overlay that was unmounted reads as
    /// closed until its owner opens it again.
    pub fn is_open(&self) -> bool {
        self.mounted && self.machine.is_open()
    }

    pub fn is_controlled(&self) -> bool {
        self.machine.is_controlled()
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn needs_measure(&self) -> bool {
        self.needs_measure
    }

    pub fn has_pending_open(&self) -> bool {
        self.machine.has_pending_open()
    }

    pub fn state(&self) -> OverlayState {
        OverlayState {
            is_open: self.is_open(),
            position: self.position,
        }
    }

    pub fn request_open(&mut self, now: Instant) -> Transition {
        self.apply(VisibilityInput::RequestOpen, now)
    }

    pub fn request_close(&mut self, now: Instant) -> Transition {
        self.apply(VisibilityInput::RequestClose, now)
    }

    pub fn toggle(&mut self, now: Instant) -> Transition {
        self.apply(VisibilityInput::Toggle, now)
    }

    /// An item inside the panel was activated.
    pub fn item_activated(&mut self, now: Instant) -> Transition {
        self.apply(VisibilityInput::ItemClick, now)
    }

    pub fn focus_in(&mut self, now: Instant) -> Transition {
        self.apply(VisibilityInput::FocusIn, now)
    }

    pub fn focus_out(&mut self, now: Instant) -> Transition {
        self.apply(VisibilityInput::FocusOut, now)
    }

    pub fn apply(&mut self, input: VisibilityInput, now: Instant) -> Transition {
        let transition = self.machine.apply(input, now);
        self.react(transition);
        transition
    }

    /// Fire a due hover-open deadline.
    pub fn tick(&mut self, now: Instant) -> Transition {
        let transition = self.machine.tick(now);
        self.react(transition);
        transition
    }

    /// Controlled mode: adopt the owner's open flag. Setting `true` on an
    /// unmounted overlay whose flag is already set mounts it again.
    pub fn set_external_open(&mut self, open: bool) -> Transition {
        let remount = open && !self.mounted && self.machine.is_open();
        let mut transition = self.machine.set_external_open(open);
        if remount {
            transition = Transition::Opened;
        }
        self.react(transition);
        transition
    }

    /// Post-render measurement pass. Resolves the position once both the
    /// trigger and the floating panel can be measured. Returns whether the
    /// position changed.
    pub fn after_render<M: Measure + ?Sized>(&mut self, host: &M) -> bool {
        if !self.is_open() {
            return false;
        }
        // Signals that arrived before this pass are folded into it.
        let signalled = self
            .subscription
            .as_ref()
            .is_some_and(|subscription| subscription.take_pending());
        if !signalled && !self.needs_measure && self.position.is_some() {
            return false;
        }
        self.measure(host)
    }

    /// Re-resolve against the latest bounds. No-op while closed or when either
    /// element is detached; the previous position is kept.
    pub fn on_viewport_change<M: Measure + ?Sized>(&mut self, host: &M) -> bool {
        if !self.is_open() {
            return false;
        }
        self.measure(host)
    }

    /// Drain viewport signals and re-resolve if any fired.
    pub fn poll_viewport<M: Measure + ?Sized>(&mut self, host: &M) -> bool {
        let fired = self
            .subscription
            .as_ref()
            .is_some_and(|subscription| subscription.take_pending());
        fired && self.on_viewport_change(host)
    }

    /// Viewport-space rectangle the panel occupies, once positioned.
    pub fn floating_rect<M: Measure + ?Sized>(&self, host: &M) -> Option<Bounds> {
        if !self.is_open() {
            return None;
        }
        let position = self.position?;
        let size = host.bounds(self.floating)?;
        Some(
            size.with_position(position)
                .to_viewport(host.scroll_offset()),
        )
    }

    /// The trigger is going away. Cancels the hover timer, releases listeners
    /// and forgets the position. An uncontrolled overlay is closed; a
    /// controlled one keeps its owner's flag but stops measuring until it is
    /// opened again.
    pub fn unmount(&mut self) {
        self.machine.reset();
        self.release();
        self.hovered = false;
        self.position = None;
        self.mounted = false;
        tracing::debug!(trigger = ?self.trigger, "overlay unmounted");
    }

    /// Route a terminal event. Returns true when the event was consumed.
    pub fn handle_event<M: Measure + ?Sized>(
        &mut self,
        event: &Event,
        host: &M,
        now: Instant,
    ) -> bool {
        let consumed = match event {
            Event::Mouse(mouse) => self.handle_mouse(mouse, host, now),
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if self.is_open() && self.keys.matches(Action::CloseOverlay, key) {
                    let transition = self.apply(VisibilityInput::Escape, now);
                    matches!(
                        transition,
                        Transition::Closed | Transition::Requested(Intent::Close)
                    )
                } else {
                    false
                }
            }
            Event::FocusLost => {
                self.apply(VisibilityInput::FocusOut, now);
                false
            }
            _ => false,
        };
        self.poll_viewport(host);
        consumed
    }

    fn handle_mouse<M: Measure + ?Sized>(
        &mut self,
        mouse: &MouseEvent,
        host: &M,
        now: Instant,
    ) -> bool {
        let column = mouse.column as i32;
        let row = mouse.row as i32;
        let over_trigger = host
            .bounds(self.trigger)
            .is_some_and(|bounds| bounds.contains(column, row));
        let over_floating = self
            .floating_rect(host)
            .is_some_and(|bounds| bounds.contains(column, row));

        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                let inside = over_trigger || over_floating;
                if inside != self.hovered {
                    self.hovered = inside;
                    let input = if inside {
                        VisibilityInput::PointerEnter
                    } else {
                        VisibilityInput::PointerLeave
                    };
                    self.apply(input, now);
                }
                false
            }
            MouseEventKind::Down(_) => {
                if over_trigger {
                    let input = match self.config().trigger {
                        TriggerMode::Click => Some(VisibilityInput::TriggerClick),
                        TriggerMode::Focus => Some(VisibilityInput::FocusIn),
                        TriggerMode::Hover => None,
                    };
                    if let Some(input) = input {
                        self.apply(input, now);
                    }
                    true
                } else if over_floating {
                    true
                } else {
                    if self.is_open() || self.has_pending_open() {
                        self.apply(VisibilityInput::OutsideClick, now);
                    }
                    false
                }
            }
            _ => false,
        }
    }

    fn measure<M: Measure + ?Sized>(&mut self, host: &M) -> bool {
        let trigger = host.bounds(self.trigger);
        let floating = host.bounds(self.floating);
        let (Some(trigger), Some(floating)) = (trigger, floating) else {
            tracing::trace!(trigger = ?self.trigger, "overlay element not measurable");
            return false;
        };
        let position = resolve_position(trigger, floating, self.placement, host.scroll_offset());
        // A zero-sized panel projects against a degenerate box; keep asking
        // until it has real dimensions.
        self.needs_measure = floating.is_degenerate();
        let changed = self.position != Some(position);
        if changed {
            tracing::debug!(
                top = position.top,
                left = position.left,
                side = %self.placement.side,
                align = %self.placement.align,
                "overlay positioned"
            );
        }
        self.position = Some(position);
        changed
    }

    fn react(&mut self, transition: Transition) {
        match transition {
            Transition::Opened => self.on_open(),
            Transition::Closed => self.on_close(),
            _ => {}
        }
    }

    fn on_open(&mut self) {
        self.mounted = true;
        // a position from an earlier open is stale until measured again
        self.position = None;
        self.needs_measure = true;
        if self.subscription.is_none() {
            self.subscription = Some(self.signals.subscribe());
        }
    }

    fn on_close(&mut self) {
        self.release();
    }

    fn release(&mut self) {
        self.machine.cancel_pending();
        self.needs_measure = false;
        self.subscription = None;
    }
}
