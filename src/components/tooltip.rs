use crossterm::event::Event;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

use crate::components::{AnchoredSurface, Component, ComponentContext};
use crate::config::OverlayConfig;
use crate::geometry::{Align, Side};
use crate::host::ViewportSignals;
use crate::ui::{UiFrame, cell_extent};
use crate::visibility::TriggerMode;

pub const DEFAULT_TOOLTIP_DELAY_MS: u64 = 300;

/// Hover-triggered hint shown above a label.
#[derive(Debug)]
pub struct TooltipComponent {
    label: String,
    text: String,
    max_width: u16,
    surface: AnchoredSurface,
}

impl TooltipComponent {
    pub fn default_config() -> OverlayConfig {
        OverlayConfig::new()
            .trigger(TriggerMode::Hover)
            .delay_ms(DEFAULT_TOOLTIP_DELAY_MS)
            .side(Side::Top)
            .align(Align::Center)
            .close_on_click(false)
    }

    pub fn new(
        label: impl Into<String>,
        text: impl Into<String>,
        signals: ViewportSignals,
    ) -> Self {
        Self::with_config(label, text, Self::default_config(), signals)
    }

    pub fn with_config(
        label: impl Into<String>,
        text: impl Into<String>,
        config: OverlayConfig,
        signals: ViewportSignals,
    ) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
            max_width: 40,
            surface: AnchoredSurface::new(config, signals),
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn surface(&self) -> &AnchoredSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut AnchoredSurface {
        &mut self.surface
    }

    /// Panel size: text wrapped at `max_width` plus a one-cell border.
    pub fn panel_size(&self) -> (u16, u16) {
        let inner_max = self.max_width.saturating_sub(2).max(1) as usize;
        let lines = wrap(&self.text, inner_max);
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        (
            cell_extent(width).saturating_add(2),
            cell_extent(lines.len()).saturating_add(2),
        )
    }

    pub fn render_overlay(&mut self, frame: &mut UiFrame<'_>) {
        if !self.surface.is_open() {
            return;
        }
        let (width, height) = self.panel_size();
        self.surface.set_floating_size(width, height);
        let text = wrap(&self.text, width.saturating_sub(2).max(1) as usize).join("\n");
        self.surface.render_floating(frame, |buf, area| {
            let style = Style::default()
                .fg(crate::theme::tooltip_fg())
                .bg(crate::theme::tooltip_bg());
            Paragraph::new(text)
                .style(style)
                .block(Block::default().borders(Borders::ALL).border_style(style))
                .render(area, buf);
        });
    }
}

impl Component for TooltipComponent {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        if area.width == 0 || area.height == 0 {
            self.surface.unmount_trigger();
            return;
        }
        self.surface.mount_trigger(area, ctx);
        let style = Style::default()
            .fg(crate::theme::trigger_fg())
            .bg(crate::theme::trigger_bg());
        frame.write_line(area, &self.label, style);
    }

    fn handle_event(&mut self, event: &Event, ctx: &ComponentContext) -> bool {
        self.surface.handle_event(event, ctx)
    }
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
    }
    lines
}
