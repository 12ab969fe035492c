use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::{Event, KeyEventKind, MouseEventKind};
use indoc::indoc;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use tracing::Level;

use term_anchor::components::anchored::TRIGGER_ELEMENT;
use term_anchor::components::event_log::set_global_event_log;
use term_anchor::components::{
    Anchored, Component, ComponentContext, DropdownComponent, EventLogComponent,
    PopoverComponent, TooltipComponent,
};
use term_anchor::config::OverlayConfig;
use term_anchor::drivers::OutputDriver;
use term_anchor::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use term_anchor::event_loop::{ControlFlow, EventLoop};
use term_anchor::geometry::{Placement, ScrollOffset};
use term_anchor::host::{SignalKind, ViewportSignals};
use term_anchor::keybindings::{Action, KeyBindings};
use term_anchor::tracing_sub;
use term_anchor::ui::UiFrame;
use term_anchor::visibility::Intent;

const LONG_ABOUT: &str = indoc! {"
    Interactive playground for anchored overlays.

    Three triggers are laid out in a scrollable pane: a click dropdown, a
    hover tooltip and a focus popover whose open flag is owned by the app.
    The dropdown uses the placement given on the command line. Scroll the
    pane with the mouse wheel or PageUp/PageDown to watch open panels
    follow their triggers. Transitions are logged in the bottom pane.
"};

const LOG_HEIGHT: u16 = 8;
const TRIGGER_WIDTH: u16 = 14;
const ROW_SPACING: i32 = 4;
const MAX_SCROLL: i32 = 12;

#[derive(Parser, Debug)]
#[command(version, about = "Anchored overlay playground", long_about = LONG_ABOUT)]
struct Args {
    /// Side of the trigger the dropdown opens on (top, bottom, left, right)
    #[arg(long, default_value = "bottom")]
    side: String,

    /// Cross-axis alignment of the dropdown (start, center, end)
    #[arg(long, default_value = "start")]
    align: String,

    /// Gap in cells between trigger and panel
    #[arg(long, default_value_t = 0)]
    offset: u16,

    /// Hover delay before the tooltip opens
    #[arg(long, default_value_t = 300)]
    delay_ms: u64,

    /// Keep panels open when Escape is pressed
    #[arg(long)]
    no_escape: bool,

    /// Close the dropdown when the terminal loses focus
    #[arg(long)]
    blur: bool,

    /// Idle tick interval; bounds how late a delayed tooltip appears
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,

    #[arg(long, default_value_t = Level::DEBUG)]
    log_level: Level,
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    let (log, handle) = EventLogComponent::new_default();
    set_global_event_log(handle);
    tracing_sub::init(args.log_level);

    let mut app = App::new(&args, log);
    let mut output = ConsoleOutputDriver::new()?;
    output.enter()?;

    let mut event_loop = EventLoop::new(
        ConsoleInputDriver::new(),
        Duration::from_millis(args.tick_ms.max(1)),
    );
    let result = event_loop.run(|_driver, event, now| {
        match event {
            None => app.tick(now),
            Some(event) => {
                if app.handle_event(&event, now) {
                    return Ok(ControlFlow::Quit);
                }
            }
        }
        app.draw(&mut output, now)?;
        Ok(ControlFlow::Continue)
    });

    app.unmount();
    output.exit()?;
    result
}

struct App {
    signals: ViewportSignals,
    dropdown: DropdownComponent,
    tooltip: TooltipComponent,
    popover: PopoverComponent,
    popover_intents: Rc<RefCell<Vec<Intent>>>,
    log: EventLogComponent,
    keys: KeyBindings,
    focus: usize,
    scroll: ScrollOffset,
}

impl App {
    fn new(args: &Args, log: EventLogComponent) -> Self {
        let signals = ViewportSignals::new();
        let placement = Placement::parse_lenient(&args.side, &args.align, args.offset);
        let close_on_escape = !args.no_escape;

        let mut dropdown = DropdownComponent::with_config(
            "Theme",
            OverlayConfig::new()
                .placement(placement)
                .close_on_escape(close_on_escape)
                .close_on_blur(args.blur),
            signals.clone(),
        );
        dropdown.set_items(
            ["Dark", "Light", "Solarized", "High contrast"]
                .into_iter()
                .map(String::from)
                .collect(),
        );

        let tooltip = TooltipComponent::with_config(
            "Hover me",
            "Tooltips open after a short hover and close when the pointer leaves.",
            TooltipComponent::default_config()
                .delay_ms(args.delay_ms)
                .close_on_escape(close_on_escape),
            signals.clone(),
        );

        let popover_intents = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&popover_intents);
        let mut popover = PopoverComponent::controlled(
            "Details",
            PopoverComponent::default_config().close_on_escape(close_on_escape),
            signals.clone(),
            false,
            move |intent| sink.borrow_mut().push(intent),
        );
        popover.set_title("Shortcuts");
        popover.set_body("Tab moves focus. Focusing this trigger asks the app to open the panel.");

        tracing::info!(
            side = %placement.side,
            align = %placement.align,
            offset = placement.offset,
            "demo started"
        );

        Self {
            signals,
            dropdown,
            tooltip,
            popover,
            popover_intents,
            log,
            keys: KeyBindings::default(),
            focus: 0,
            scroll: ScrollOffset::default(),
        }
    }

    fn overlays(&mut self) -> [&mut dyn Anchored; 3] {
        [&mut self.dropdown, &mut self.tooltip, &mut self.popover]
    }

    fn context(&self, index: usize, now: Instant) -> ComponentContext {
        ComponentContext::new(index == self.focus)
            .with_scroll(self.scroll)
            .with_now(now)
    }

    /// Returns true when the app should quit.
    fn handle_event(&mut self, event: &Event, now: Instant) -> bool {
        self.signals.observe(event);

        if let Event::Key(key) = event
            && key.kind != KeyEventKind::Release
        {
            if self.keys.matches(Action::Quit, key) {
                return true;
            }
            if self.keys.matches(Action::FocusNext, key) {
                self.focus = (self.focus + 1) % 3;
                return false;
            }
            if self.keys.matches(Action::FocusPrev, key) {
                self.focus = (self.focus + 2) % 3;
                return false;
            }
            if self.keys.matches(Action::ScrollUp, key) {
                self.scroll_by(-ROW_SPACING);
                return false;
            }
            if self.keys.matches(Action::ScrollDown, key) {
                self.scroll_by(ROW_SPACING);
                return false;
            }
        }
        if let Event::Mouse(mouse) = event {
            match mouse.kind {
                MouseEventKind::ScrollUp => self.scroll_by(-1),
                MouseEventKind::ScrollDown => self.scroll_by(1),
                MouseEventKind::Down(_) => {
                    if let Some(index) = self.trigger_at(mouse.column, mouse.row) {
                        self.focus = index;
                    }
                }
                _ => {}
            }
        }

        // Every overlay sees every event so outside clicks reach them all.
        let contexts: Vec<ComponentContext> = (0..3).map(|i| self.context(i, now)).collect();
        for (overlay, ctx) in self.overlays().into_iter().zip(contexts.iter()) {
            overlay.handle_event(event, ctx);
        }
        if let Some(index) = self.dropdown.take_activated()
            && let Some(item) = self.dropdown.items().get(index)
        {
            tracing::info!(%item, "theme selected");
        }
        self.apply_popover_intents();
        false
    }

    fn trigger_at(&mut self, column: u16, row: u16) -> Option<usize> {
        self.overlays().iter().position(|overlay| {
            overlay
                .surface()
                .elements()
                .get(TRIGGER_ELEMENT)
                .is_some_and(|bounds| bounds.contains(column as i32, row as i32))
        })
    }

    fn scroll_by(&mut self, delta: i32) {
        let y = (self.scroll.y + delta).clamp(0, MAX_SCROLL);
        if y != self.scroll.y {
            self.scroll = ScrollOffset::new(self.scroll.x, y);
            self.signals.emit(SignalKind::Scroll);
        }
    }

    fn tick(&mut self, now: Instant) {
        let contexts: Vec<ComponentContext> = (0..3).map(|i| self.context(i, now)).collect();
        for (overlay, ctx) in self.overlays().into_iter().zip(contexts.iter()) {
            overlay.tick(ctx);
        }
    }

    fn apply_popover_intents(&mut self) {
        let intents: Vec<Intent> = self.popover_intents.borrow_mut().drain(..).collect();
        for intent in intents {
            tracing::debug!(?intent, "popover intent");
            self.popover
                .surface_mut()
                .controller_mut()
                .set_external_open(intent == Intent::Open);
        }
    }

    /// Render, then measure. A second frame is drawn when the measurement
    /// moved a panel so it never shows at a stale spot for a whole tick.
    fn draw(&mut self, output: &mut ConsoleOutputDriver, now: Instant) -> io::Result<()> {
        output.draw(|frame| self.render(frame, now))?;
        let mut moved = false;
        for overlay in self.overlays() {
            moved |= overlay.after_render();
        }
        self.apply_popover_intents();
        if moved {
            output.draw(|frame| self.render(frame, now))?;
        }
        Ok(())
    }

    fn render(&mut self, mut frame: UiFrame<'_>, now: Instant) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(LOG_HEIGHT),
            ])
            .split(area);
        let (header, content, log_area) = (chunks[0], chunks[1], chunks[2]);

        frame.render_widget(
            Paragraph::new(Line::from(self.help_line()))
                .style(Style::default().fg(term_anchor::theme::accent())),
            header,
        );

        let contexts: Vec<ComponentContext> = (0..3).map(|i| self.context(i, now)).collect();
        let slots: Vec<Rect> = (0..3).map(|i| self.trigger_slot(content, i)).collect();
        for ((overlay, ctx), slot) in self
            .overlays()
            .into_iter()
            .zip(contexts.iter())
            .zip(slots)
        {
            overlay.render(&mut frame, slot, ctx);
        }
        self.log
            .render(&mut frame, log_area, &ComponentContext::default());
        for overlay in self.overlays() {
            overlay.render_overlay(&mut frame);
        }
    }

    /// Viewport rect of trigger `index`, or an empty rect once it scrolls
    /// out of the content pane.
    fn trigger_slot(&self, content: Rect, index: usize) -> Rect {
        let doc_row = 1 + ROW_SPACING * index as i32;
        let row = content.y as i32 + doc_row - self.scroll.y;
        if row < content.y as i32 || row >= content.bottom() as i32 {
            return Rect::default();
        }
        let x = content.x + 4 + (index as u16) * 8;
        Rect::new(x, row as u16, TRIGGER_WIDTH, 1).intersection(content)
    }

    fn help_line(&self) -> String {
        let combos = |action| self.keys.combos_for(action).join("/");
        format!(
            "{} focus  {} open  {} scroll  {} close  {} quit",
            combos(Action::FocusNext),
            combos(Action::Activate),
            [combos(Action::ScrollUp), combos(Action::ScrollDown)].join("/"),
            combos(Action::CloseOverlay),
            combos(Action::Quit),
        )
    }

    fn unmount(&mut self) {
        for overlay in self.overlays() {
            overlay.unmount();
        }
    }
}
