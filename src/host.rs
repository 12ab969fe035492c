//! Contracts with the surrounding UI tree.
//!
//! The overlay never owns the elements it positions. It reads their bounds
//! through [`Measure`] and learns about viewport changes through
//! [`ViewportSignals`], a listener registry shared by every overlay of a
//! screen. Listeners are held by a [`ViewportSubscription`] guard so that
//! every registration is paired with a removal on whichever path the overlay
//! leaves through (close, unmount or drop).

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crossterm::event::{Event, MouseEventKind};

use crate::geometry::{Bounds, ScrollOffset};

/// Handle naming an element the host can measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(u32);

impl ElementId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Measurement primitive supplied by the host.
pub trait Measure {
    /// Viewport-space bounds of a mounted element, `None` when the element is
    /// not attached.
    fn bounds(&self, id: ElementId) -> Option<Bounds>;

    fn scroll_offset(&self) -> ScrollOffset {
        ScrollOffset::default()
    }
}

impl<T: Measure + ?Sized> Measure for &T {
    fn bounds(&self, id: ElementId) -> Option<Bounds> {
        (**self).bounds(id)
    }

    fn scroll_offset(&self) -> ScrollOffset {
        (**self).scroll_offset()
    }
}

/// Element bounds recorded during a render pass.
#[derive(Debug, Clone, Default)]
pub struct ElementMap {
    regions: BTreeMap<ElementId, Bounds>,
    scroll: ScrollOffset,
}

impl ElementMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> Vec<ElementId> {
        self.regions.keys().copied().collect()
    }

    pub fn set(&mut self, id: ElementId, bounds: Bounds) {
        self.regions.insert(id, bounds);
    }

    pub fn get(&self, id: ElementId) -> Option<Bounds> {
        self.regions.get(&id).copied()
    }

    pub fn remove(&mut self, id: ElementId) -> Option<Bounds> {
        self.regions.remove(&id)
    }

    pub fn set_scroll(&mut self, scroll: ScrollOffset) {
        self.scroll = scroll;
    }
}

impl Measure for ElementMap {
    fn bounds(&self, id: ElementId) -> Option<Bounds> {
        self.get(id)
    }

    fn scroll_offset(&self) -> ScrollOffset {
        self.scroll
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SignalKind {
    Resize,
    Scroll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

#[derive(Debug)]
struct Listener {
    kind: SignalKind,
    pending: bool,
}

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    listeners: BTreeMap<ListenerId, Listener>,
}

/// Shared resize/scroll listener list.
///
/// The host publishes signals with [`ViewportSignals::emit`] (or
/// [`ViewportSignals::observe`] for raw terminal events); each listener keeps
/// a dirty flag that its owner drains on its next pass.
#[derive(Debug, Clone, Default)]
pub struct ViewportSignals {
    inner: Rc<RefCell<Registry>>,
}

impl ViewportSignals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one resize and one scroll listener, released when the guard
    /// is dropped.
    pub fn subscribe(&self) -> ViewportSubscription {
        let resize = self.add(SignalKind::Resize);
        let scroll = self.add(SignalKind::Scroll);
        ViewportSubscription {
            signals: self.clone(),
            resize,
            scroll,
        }
    }

    pub fn emit(&self, kind: SignalKind) {
        let mut registry = self.inner.borrow_mut();
        for listener in registry.listeners.values_mut() {
            if listener.kind == kind {
                listener.pending = true;
            }
        }
    }

    /// Publish the viewport signal carried by a terminal event, if any.
    ///
    /// Every wheel event counts as a scroll regardless of which container it
    /// lands on, so listeners see scrolls of nested views as well as the root.
    pub fn observe(&self, event: &Event) -> Option<SignalKind> {
        let kind = match event {
            Event::Resize(_, _) => SignalKind::Resize,
            Event::Mouse(mouse)
                if matches!(
                    mouse.kind,
                    MouseEventKind::ScrollUp
                        | MouseEventKind::ScrollDown
                        | MouseEventKind::ScrollLeft
                        | MouseEventKind::ScrollRight
                ) =>
            {
                SignalKind::Scroll
            }
            _ => return None,
        };
        self.emit(kind);
        Some(kind)
    }

    pub fn listener_count(&self, kind: SignalKind) -> usize {
        self.inner
            .borrow()
            .listeners
            .values()
            .filter(|listener| listener.kind == kind)
            .count()
    }

    fn add(&self, kind: SignalKind) -> ListenerId {
        let mut registry = self.inner.borrow_mut();
        let id = ListenerId(registry.next_id);
        registry.next_id += 1;
        registry.listeners.insert(
            id,
            Listener {
                kind,
                pending: false,
            },
        );
        id
    }

    fn remove(&self, id: ListenerId) {
        self.inner.borrow_mut().listeners.remove(&id);
    }

    fn take_pending(&self, id: ListenerId) -> bool {
        self.inner
            .borrow_mut()
            .listeners
            .get_mut(&id)
            .is_some_and(|listener| std::mem::take(&mut listener.pending))
    }
}

/// Resize and scroll listeners held for as long as an overlay is open.
#[derive(Debug)]
pub struct ViewportSubscription {
    signals: ViewportSignals,
    resize: ListenerId,
    scroll: ListenerId,
}

impl ViewportSubscription {
    /// Drain both dirty flags; true when either signal fired since last call.
    pub fn take_pending(&self) -> bool {
        let resized = self.signals.take_pending(self.resize);
        let scrolled = self.signals.take_pending(self.scroll);
        resized || scrolled
    }
}

impl Drop for ViewportSubscription {
    fn drop(&mut self) {
        self.signals.remove(self.resize);
        self.signals.remove(self.scroll);
    }
}
