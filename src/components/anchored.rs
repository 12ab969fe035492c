//! Shared plumbing for every component that shows a floating panel.
//!
//! `AnchoredSurface` wraps an [`OverlayController`] together with the element
//! bounds the component records while rendering, so the component itself acts
//! as the measurement host for its trigger and panel. Consumers only decide
//! what the trigger and the panel look like; placement, visibility and
//! listener lifetime all live here.

use crossterm::event::Event;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use crate::components::ComponentContext;
use crate::config::OverlayConfig;
use crate::controller::{OverlayController, OverlayState};
use crate::geometry::Bounds;
use crate::host::{ElementId, ElementMap, ViewportSignals};
use crate::ui::UiFrame;
use crate::visibility::{Intent, Transition};

pub const TRIGGER_ELEMENT: ElementId = ElementId::new(0);
pub const FLOATING_ELEMENT: ElementId = ElementId::new(1);

#[derive(Debug)]
pub struct AnchoredSurface {
    controller: OverlayController,
    elements: ElementMap,
    focused: bool,
}

impl AnchoredSurface {
    pub fn new(config: OverlayConfig, signals: ViewportSignals) -> Self {
        Self::from_controller(OverlayController::new(
            config,
            TRIGGER_ELEMENT,
            FLOATING_ELEMENT,
            signals,
        ))
    }

    pub fn controlled<F>(
        config: OverlayConfig,
        signals: ViewportSignals,
        external_open: bool,
        on_request_change: F,
    ) -> Self
    where
        F: FnMut(Intent) + 'static,
    {
        Self::from_controller(OverlayController::controlled(
            config,
            TRIGGER_ELEMENT,
            FLOATING_ELEMENT,
            signals,
            external_open,
            on_request_change,
        ))
    }

    fn from_controller(controller: OverlayController) -> Self {
        Self {
            controller,
            elements: ElementMap::new(),
            focused: false,
        }
    }

    pub fn controller(&self) -> &OverlayController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut OverlayController {
        &mut self.controller
    }

    pub fn elements(&self) -> &ElementMap {
        &self.elements
    }

    pub fn state(&self) -> OverlayState {
        self.controller.state()
    }

    pub fn is_open(&self) -> bool {
        self.controller.is_open()
    }

    /// Record where the trigger was drawn this pass.
    pub fn mount_trigger(&mut self, area: Rect, ctx: &ComponentContext) {
        self.elements.set(TRIGGER_ELEMENT, area.into());
        self.elements.set_scroll(ctx.scroll());
    }

    /// The trigger was not drawn (scrolled out of a virtualized list, hidden
    /// tab). Later viewport passes keep the last position instead of failing.
    pub fn unmount_trigger(&mut self) {
        self.elements.remove(TRIGGER_ELEMENT);
    }

    /// Record the panel's natural size. Called every pass the panel is open,
    /// before it is drawn, so the post-render measurement sees real
    /// dimensions.
    pub fn set_floating_size(&mut self, width: u16, height: u16) {
        self.elements
            .set(FLOATING_ELEMENT, Bounds::sized(width, height));
    }

    /// Viewport rectangle of the panel once positioned.
    pub fn floating_rect(&self) -> Option<Bounds> {
        self.controller.floating_rect(&self.elements)
    }

    /// Draw the panel. Nothing is drawn while closed or before the first
    /// measurement; `draw` paints into a buffer of the panel's own size which
    /// is then clipped onto the frame.
    pub fn render_floating<F>(&mut self, frame: &mut UiFrame<'_>, draw: F) -> Option<Bounds>
    where
        F: FnOnce(&mut Buffer, Rect),
    {
        let rect = self.floating_rect()?;
        if rect.is_degenerate() {
            return None;
        }
        let area = Rect::new(0, 0, rect.width, rect.height);
        let mut scratch = Buffer::empty(area);
        draw(&mut scratch, area);
        frame.blit_from_signed(&scratch, rect);
        Some(rect)
    }

    /// Post-render measurement for this surface.
    pub fn after_render(&mut self) -> bool {
        self.controller.after_render(&self.elements)
    }

    pub fn tick(&mut self, ctx: &ComponentContext) -> Transition {
        self.controller.tick(ctx.now())
    }

    /// Feed focus changes from the host into the controller.
    pub fn sync_focus(&mut self, ctx: &ComponentContext) -> Transition {
        let focused = ctx.focused();
        if focused == self.focused {
            return Transition::Unchanged;
        }
        self.focused = focused;
        if focused {
            self.controller.focus_in(ctx.now())
        } else {
            self.controller.focus_out(ctx.now())
        }
    }

    pub fn handle_event(&mut self, event: &Event, ctx: &ComponentContext) -> bool {
        self.elements.set_scroll(ctx.scroll());
        self.controller
            .handle_event(event, &self.elements, ctx.now())
    }

    pub fn unmount(&mut self) {
        self.elements = ElementMap::new();
        self.focused = false;
        self.controller.unmount();
    }
}
