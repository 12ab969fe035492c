use crossterm::event::Event;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph, Widget, Wrap};

use crate::components::{AnchoredSurface, Component, ComponentContext};
use crate::config::OverlayConfig;
use crate::geometry::{Align, Side};
use crate::host::ViewportSignals;
use crate::ui::UiFrame;
use crate::visibility::{Intent, TriggerMode};

/// Titled panel of free text that follows keyboard focus.
#[derive(Debug)]
pub struct PopoverComponent {
    label: String,
    title: String,
    body: String,
    width: u16,
    height: u16,
    surface: AnchoredSurface,
}

impl PopoverComponent {
    pub fn default_config() -> OverlayConfig {
        OverlayConfig::new()
            .trigger(TriggerMode::Focus)
            .side(Side::Right)
            .align(Align::Start)
            .offset(1)
            .close_on_blur(true)
    }

    pub fn new(label: impl Into<String>, signals: ViewportSignals) -> Self {
        Self::from_surface(
            label,
            AnchoredSurface::new(Self::default_config(), signals),
        )
    }

    /// A popover whose open flag is owned by the caller.
    pub fn controlled<F>(
        label: impl Into<String>,
        config: OverlayConfig,
        signals: ViewportSignals,
        open: bool,
        on_request_change: F,
    ) -> Self
    where
        F: FnMut(Intent) + 'static,
    {
        Self::from_surface(
            label,
            AnchoredSurface::controlled(config, signals, open, on_request_change),
        )
    }

    fn from_surface(label: impl Into<String>, surface: AnchoredSurface) -> Self {
        Self {
            label: label.into(),
            title: String::new(),
            body: String::new(),
            width: 30,
            height: 6,
            surface,
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    pub fn surface(&self) -> &AnchoredSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut AnchoredSurface {
        &mut self.surface
    }

    pub fn render_overlay(&mut self, frame: &mut UiFrame<'_>) {
        if !self.surface.is_open() {
            return;
        }
        self.surface.set_floating_size(self.width, self.height);
        let title = self.title.as_str();
        let body = self.body.as_str();
        self.surface.render_floating(frame, |buf, area| {
            let block = Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(crate::theme::panel_border()));
            Paragraph::new(body)
                .style(
                    Style::default()
                        .fg(crate::theme::panel_fg())
                        .bg(crate::theme::panel_bg()),
                )
                .block(block)
                .alignment(Alignment::Left)
                .wrap(Wrap { trim: true })
                .render(area, buf);
        });
    }
}

impl Component for PopoverComponent {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        if area.width == 0 || area.height == 0 {
            self.surface.unmount_trigger();
            return;
        }
        self.surface.mount_trigger(area, ctx);
        self.surface.sync_focus(ctx);
        let mut style = Style::default().fg(crate::theme::trigger_fg());
        style = if ctx.focused() {
            style
                .bg(crate::theme::trigger_focused_bg())
                .add_modifier(Modifier::BOLD)
        } else {
            style.bg(crate::theme::trigger_bg())
        };
        frame.write_line(area, &self.label, style);
    }

    fn handle_event(&mut self, event: &Event, ctx: &ComponentContext) -> bool {
        self.surface.sync_focus(ctx);
        self.surface.handle_event(event, ctx)
    }
}
