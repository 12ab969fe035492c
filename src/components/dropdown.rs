use crossterm::event::{Event, KeyEventKind, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, StatefulWidget, Widget};

use crate::components::{AnchoredSurface, Component, ComponentContext};
use crate::config::OverlayConfig;
use crate::host::ViewportSignals;
use crate::keybindings::{Action, KeyBindings};
use crate::ui::{UiFrame, cell_extent};
use crate::visibility::TriggerMode;

/// Click-to-open menu of string items.
#[derive(Debug)]
pub struct DropdownComponent {
    label: String,
    items: Vec<String>,
    selected: usize,
    activated: Option<usize>,
    keys: KeyBindings,
    surface: AnchoredSurface,
}

impl DropdownComponent {
    pub fn new(label: impl Into<String>, signals: ViewportSignals) -> Self {
        Self::with_config(
            label,
            OverlayConfig::new().trigger(TriggerMode::Click),
            signals,
        )
    }

    pub fn with_config(
        label: impl Into<String>,
        config: OverlayConfig,
        signals: ViewportSignals,
    ) -> Self {
        Self {
            label: label.into(),
            items: Vec::new(),
            selected: 0,
            activated: None,
            keys: KeyBindings::default(),
            surface: AnchoredSurface::new(config, signals),
        }
    }

    pub fn set_items(&mut self, items: Vec<String>) {
        self.items = items;
        if self.selected >= self.items.len() {
            self.selected = self.items.len().saturating_sub(1);
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Index of the item activated since the last call.
    pub fn take_activated(&mut self) -> Option<usize> {
        self.activated.take()
    }

    pub fn surface(&self) -> &AnchoredSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut AnchoredSurface {
        &mut self.surface
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.items.is_empty() {
            self.selected = 0;
            return;
        }
        if delta.is_negative() {
            self.selected = self.selected.saturating_sub(delta.unsigned_abs());
        } else {
            self.selected = (self.selected + delta as usize).min(self.items.len() - 1);
        }
    }

    /// Panel size: widest item plus border, one row per item.
    pub fn panel_size(&self) -> (u16, u16) {
        let widest = self
            .items
            .iter()
            .map(|item| item.chars().count())
            .max()
            .unwrap_or(0)
            .max(self.label.chars().count());
        (
            cell_extent(widest).saturating_add(2),
            cell_extent(self.items.len()).saturating_add(2),
        )
    }

    pub fn render_overlay(&mut self, frame: &mut UiFrame<'_>) {
        if !self.surface.is_open() {
            return;
        }
        let (width, height) = self.panel_size();
        self.surface.set_floating_size(width, height);
        let items = self
            .items
            .iter()
            .map(|item| ListItem::new(item.clone()))
            .collect::<Vec<_>>();
        let mut state = ListState::default();
        if !self.items.is_empty() {
            state.select(Some(self.selected));
        }
        self.surface.render_floating(frame, |buf, area| {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(crate::theme::panel_border()))
                .style(
                    Style::default()
                        .fg(crate::theme::panel_fg())
                        .bg(crate::theme::panel_bg()),
                );
            let inner = block.inner(area);
            block.render(area, buf);
            let list = List::new(items).highlight_style(
                Style::default()
                    .fg(crate::theme::menu_selected_fg())
                    .bg(crate::theme::menu_selected_bg())
                    .add_modifier(Modifier::BOLD),
            );
            StatefulWidget::render(list, inner, buf, &mut state);
        });
    }

    fn activate(&mut self, index: usize, ctx: &ComponentContext) {
        self.selected = index;
        self.activated = Some(index);
        tracing::debug!(item = %self.items[index], "dropdown item activated");
        self.surface.controller_mut().item_activated(ctx.now());
    }

    /// Item row under the pointer, if it lands inside the open panel.
    fn item_at(&self, column: u16, row: u16) -> Option<usize> {
        let rect = self.surface.floating_rect()?;
        if !rect.contains(column as i32, row as i32) {
            return None;
        }
        let index = row as i32 - rect.top - 1;
        let inside_border = (column as i32) > rect.left && (column as i32) < rect.right() - 1;
        if inside_border && index >= 0 && (index as usize) < self.items.len() {
            Some(index as usize)
        } else {
            None
        }
    }

    fn handle_open_key(&mut self, event: &Event, ctx: &ComponentContext) -> bool {
        let Event::Key(key) = event else {
            return false;
        };
        if key.kind == KeyEventKind::Release {
            return false;
        }
        if self.keys.matches(Action::MenuUp, key) {
            self.move_selection(-1);
            true
        } else if self.keys.matches(Action::MenuDown, key) {
            self.move_selection(1);
            true
        } else if self.keys.matches(Action::MenuSelect, key) {
            if !self.items.is_empty() {
                self.activate(self.selected, ctx);
            }
            true
        } else {
            false
        }
    }
}

impl Component for DropdownComponent {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        if area.width == 0 || area.height == 0 {
            self.surface.unmount_trigger();
            return;
        }
        self.surface.mount_trigger(area, ctx);
        let bg = if ctx.focused() {
            crate::theme::trigger_focused_bg()
        } else {
            crate::theme::trigger_bg()
        };
        let style = Style::default().fg(crate::theme::trigger_fg()).bg(bg);
        let marker = if self.surface.is_open() { "▴" } else { "▾" };
        let text = format!("{} {}", self.label, marker);
        frame.write_line(area, &text, style);
    }

    fn handle_event(&mut self, event: &Event, ctx: &ComponentContext) -> bool {
        if self.surface.is_open() {
            if let Event::Mouse(mouse) = event
                && matches!(mouse.kind, MouseEventKind::Down(_))
                && let Some(index) = self.item_at(mouse.column, mouse.row)
            {
                self.activate(index, ctx);
                return true;
            }
            if self.handle_open_key(event, ctx) {
                return true;
            }
        } else if ctx.focused()
            && let Event::Key(key) = event
            && key.kind != KeyEventKind::Release
            && self.keys.matches(Action::Activate, key)
        {
            self.surface.controller_mut().request_open(ctx.now());
            return true;
        }
        self.surface.handle_event(event, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent};
    use ratatui::buffer::Buffer;

    fn key_event(code: KeyCode) -> Event {
        let mut k = KeyEvent::new(code, KeyModifiers::NONE);
        k.kind = KeyEventKind::Press;
        Event::Key(k)
    }

    fn click(column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn menu() -> DropdownComponent {
        let mut d = DropdownComponent::new("Actions", ViewportSignals::new());
        d.set_items(vec!["Edit".into(), "Duplicate".into(), "Delete".into()]);
        d
    }

    fn pass(d: &mut DropdownComponent, buf: &mut Buffer, ctx: &ComponentContext) {
        let area = buf.area;
        let mut frame = UiFrame::from_parts(area, buf);
        d.render(&mut frame, Rect::new(2, 1, 9, 1), ctx);
        d.render_overlay(&mut frame);
        drop(frame);
        d.surface_mut().after_render();
    }

    #[test]
    fn panel_size_saturates_for_huge_items() {
        let mut d = DropdownComponent::new("Paste", ViewportSignals::new());
        d.set_items(vec!["x".repeat(70_000)]);
        assert_eq!(d.panel_size(), (u16::MAX, 3));
    }

    #[test]
    fn selection_moves_and_clamps() {
        let mut d = menu();
        d.move_selection(1);
        assert_eq!(d.selected(), 1);
        d.move_selection(10);
        assert_eq!(d.selected(), 2);
        d.move_selection(-5);
        assert_eq!(d.selected(), 0);
    }

    #[test]
    fn click_opens_and_item_click_closes() {
        let mut d = menu();
        let ctx = ComponentContext::default();
        let mut buf = Buffer::empty(Rect::new(0, 0, 30, 10));
        pass(&mut d, &mut buf, &ctx);

        assert!(d.handle_event(&click(3, 1), &ctx));
        assert!(d.surface().is_open());
        pass(&mut d, &mut buf, &ctx);
        pass(&mut d, &mut buf, &ctx);
        // panel sits under the trigger: border on row 2, items from row 3
        assert_eq!(buf.cell((3, 4)).map(|c| c.symbol()), Some("D"));

        assert!(d.handle_event(&click(4, 4), &ctx));
        assert_eq!(d.take_activated(), Some(1));
        assert!(!d.surface().is_open());
    }

    #[test]
    fn keyboard_navigation_when_open() {
        let mut d = menu();
        let ctx = ComponentContext::new(true);
        let mut buf = Buffer::empty(Rect::new(0, 0, 30, 10));
        pass(&mut d, &mut buf, &ctx);
        assert!(d.handle_event(&key_event(KeyCode::Enter), &ctx));
        assert!(d.surface().is_open());
        assert!(d.handle_event(&key_event(KeyCode::Down), &ctx));
        assert!(d.handle_event(&key_event(KeyCode::Down), &ctx));
        assert!(d.handle_event(&key_event(KeyCode::Enter), &ctx));
        assert_eq!(d.take_activated(), Some(2));
        assert!(!d.surface().is_open());
    }

    #[test]
    fn escape_closes_without_activation() {
        let mut d = menu();
        let ctx = ComponentContext::default();
        let mut buf = Buffer::empty(Rect::new(0, 0, 30, 10));
        pass(&mut d, &mut buf, &ctx);
        d.handle_event(&click(3, 1), &ctx);
        assert!(d.handle_event(&key_event(KeyCode::Esc), &ctx));
        assert!(!d.surface().is_open());
        assert_eq!(d.take_activated(), None);
    }

    #[test]
    fn panel_size_tracks_widest_item() {
        let d = menu();
        assert_eq!(d.panel_size(), (11, 5));
    }
}
