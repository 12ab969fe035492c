use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use term_anchor::config::OverlayConfig;
use term_anchor::controller::OverlayController;
use term_anchor::geometry::{
    Align, Bounds, Placement, Position, ScrollOffset, Side, resolve_position,
};
use term_anchor::host::{ElementId, Measure, SignalKind, ViewportSignals};
use term_anchor::visibility::{Intent, Transition, TriggerMode};

const TRIGGER: ElementId = ElementId::new(10);
const FLOATING: ElementId = ElementId::new(11);

/// A host that records bounds the way a retained layout tree would.
#[derive(Default)]
struct Layout {
    nodes: HashMap<ElementId, Bounds>,
    scroll: ScrollOffset,
}

impl Measure for Layout {
    fn bounds(&self, id: ElementId) -> Option<Bounds> {
        self.nodes.get(&id).copied()
    }

    fn scroll_offset(&self) -> ScrollOffset {
        self.scroll
    }
}

fn reference_layout() -> Layout {
    let mut layout = Layout::default();
    layout.nodes.insert(TRIGGER, Bounds::new(100, 100, 50, 20));
    layout.nodes.insert(FLOATING, Bounds::sized(80, 40));
    layout
}

fn moved(column: u16, row: u16) -> Event {
    Event::Mouse(MouseEvent {
        kind: MouseEventKind::Moved,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    })
}

#[test]
fn reference_placements_resolve() {
    let trigger = Bounds::new(100, 100, 50, 20);
    let floating = Bounds::sized(80, 40);
    let cases = [
        (Side::Bottom, Align::Start, Position::new(128, 100)),
        (Side::Top, Align::Center, Position::new(52, 85)),
        (Side::Right, Align::End, Position::new(80, 158)),
        (Side::Left, Align::Start, Position::new(100, 12)),
        (Side::Bottom, Align::End, Position::new(128, 70)),
        (Side::Left, Align::Center, Position::new(90, 12)),
    ];
    for (side, align, expected) in cases {
        let placement = Placement::new(side, align, 8);
        let got = resolve_position(trigger, floating, placement, ScrollOffset::default());
        assert_eq!(got, expected, "{side}/{align}");
        // resolving again gives the same answer
        assert_eq!(
            resolve_position(trigger, floating, placement, ScrollOffset::default()),
            got
        );
    }
}

#[test]
fn controller_positions_after_render_only() {
    let signals = ViewportSignals::new();
    let mut c = OverlayController::new(
        OverlayConfig::new().side(Side::Top).align(Align::Center).offset(8),
        TRIGGER,
        FLOATING,
        signals,
    );
    let layout = reference_layout();
    c.request_open(Instant::now());
    assert!(c.is_open());
    assert_eq!(c.position(), None);
    assert!(c.after_render(&layout));
    assert_eq!(c.position(), Some(Position::new(52, 85)));
}

#[test]
fn scrolled_host_positions_in_document_space() {
    let signals = ViewportSignals::new();
    let mut c = OverlayController::new(OverlayConfig::new().offset(8), TRIGGER, FLOATING, signals);
    let mut layout = reference_layout();
    layout.scroll = ScrollOffset::new(0, 30);
    c.request_open(Instant::now());
    c.after_render(&layout);
    assert_eq!(c.position(), Some(Position::new(158, 100)));
    // drawn where the trigger is on screen
    assert_eq!(c.floating_rect(&layout), Some(Bounds::new(128, 100, 80, 40)));
}

#[test]
fn hover_delay_is_debounced() {
    let signals = ViewportSignals::new();
    let config = OverlayConfig::new()
        .trigger(TriggerMode::Hover)
        .delay_ms(200);
    let mut c = OverlayController::new(config, TRIGGER, FLOATING, signals);
    let layout = reference_layout();
    let start = Instant::now();

    c.handle_event(&moved(110, 105), &layout, start);
    assert!(c.has_pending_open());
    c.handle_event(&moved(5, 5), &layout, start + Duration::from_millis(100));
    assert!(!c.has_pending_open());
    assert_eq!(c.tick(start + Duration::from_millis(300)), Transition::Unchanged);
    assert!(!c.is_open());

    let again = start + Duration::from_millis(400);
    c.handle_event(&moved(110, 105), &layout, again);
    assert_eq!(c.tick(again + Duration::from_millis(199)), Transition::Unchanged);
    assert_eq!(c.tick(again + Duration::from_millis(200)), Transition::Opened);
    assert!(c.is_open());
}

#[test]
fn escape_respects_close_on_escape() {
    let esc = Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
    let layout = reference_layout();
    let now = Instant::now();

    let mut closes = OverlayController::new(
        OverlayConfig::new(),
        TRIGGER,
        FLOATING,
        ViewportSignals::new(),
    );
    closes.request_open(now);
    assert!(closes.handle_event(&esc, &layout, now));
    assert!(!closes.is_open());

    let mut stays = OverlayController::new(
        OverlayConfig::new().close_on_escape(false),
        TRIGGER,
        FLOATING,
        ViewportSignals::new(),
    );
    stays.request_open(now);
    assert!(!stays.handle_event(&esc, &layout, now));
    assert!(stays.is_open());
}

#[test]
fn listeners_balance_across_open_close_and_drop() {
    let signals = ViewportSignals::new();
    let before = (
        signals.listener_count(SignalKind::Resize),
        signals.listener_count(SignalKind::Scroll),
    );
    let now = Instant::now();
    {
        let mut c = OverlayController::new(
            OverlayConfig::new(),
            TRIGGER,
            FLOATING,
            signals.clone(),
        );
        c.request_open(now);
        assert_eq!(signals.listener_count(SignalKind::Resize), before.0 + 1);
        assert_eq!(signals.listener_count(SignalKind::Scroll), before.1 + 1);
        c.request_close(now);
        assert_eq!(signals.listener_count(SignalKind::Resize), before.0);
        c.request_open(now);
        // dropped while open
    }
    assert_eq!(signals.listener_count(SignalKind::Resize), before.0);
    assert_eq!(signals.listener_count(SignalKind::Scroll), before.1);
}

#[test]
fn resize_signal_repositions_open_overlay() {
    let signals = ViewportSignals::new();
    let mut c = OverlayController::new(OverlayConfig::new(), TRIGGER, FLOATING, signals.clone());
    let mut layout = reference_layout();
    let now = Instant::now();
    c.request_open(now);
    c.after_render(&layout);
    assert_eq!(c.position(), Some(Position::new(120, 100)));

    layout.nodes.insert(TRIGGER, Bounds::new(10, 20, 50, 20));
    assert_eq!(signals.observe(&Event::Resize(80, 24)), Some(SignalKind::Resize));
    assert!(c.poll_viewport(&layout));
    assert_eq!(c.position(), Some(Position::new(30, 20)));

    // trigger unmounted: keep the last position
    layout.nodes.remove(&TRIGGER);
    signals.emit(SignalKind::Scroll);
    assert!(!c.poll_viewport(&layout));
    assert_eq!(c.position(), Some(Position::new(30, 20)));
}

#[test]
fn controlled_overlay_reports_intents_only() {
    let intents = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&intents);
    let mut c = OverlayController::controlled(
        OverlayConfig::new(),
        TRIGGER,
        FLOATING,
        ViewportSignals::new(),
        true,
        move |intent| sink.borrow_mut().push(intent),
    );
    let now = Instant::now();
    assert_eq!(c.request_close(now), Transition::Requested(Intent::Close));
    assert!(c.is_open());
    assert_eq!(intents.borrow().as_slice(), &[Intent::Close]);

    assert_eq!(c.set_external_open(false), Transition::Closed);
    assert!(!c.is_open());
}

#[test]
fn reopened_overlay_waits_for_fresh_measurement() {
    let signals = ViewportSignals::new();
    let mut c = OverlayController::new(OverlayConfig::new(), TRIGGER, FLOATING, signals);
    let mut layout = reference_layout();
    let now = Instant::now();
    c.request_open(now);
    c.after_render(&layout);
    assert_eq!(c.position(), Some(Position::new(120, 100)));
    c.request_close(now);

    layout.nodes.insert(TRIGGER, Bounds::new(20, 30, 50, 20));
    c.request_open(now);
    assert_eq!(c.state().position, None);
    assert_eq!(c.floating_rect(&layout), None);
    c.after_render(&layout);
    assert_eq!(c.position(), Some(Position::new(40, 30)));
}

#[test]
fn unmounted_controlled_overlay_is_not_measured() {
    let signals = ViewportSignals::new();
    let mut c = OverlayController::controlled(
        OverlayConfig::new(),
        TRIGGER,
        FLOATING,
        signals.clone(),
        true,
        |_| {},
    );
    let layout = reference_layout();
    c.after_render(&layout);
    c.unmount();
    assert!(!c.after_render(&layout));
    assert_eq!(c.position(), None);
    assert!(!c.state().is_open);
    assert_eq!(signals.listener_count(SignalKind::Scroll), 0);
}
