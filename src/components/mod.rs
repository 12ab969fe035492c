use crossterm::event::Event;
use ratatui::layout::Rect;

use crate::ui::UiFrame;

pub mod anchored;
pub mod dropdown;
pub mod event_log;
pub mod popover;
pub mod tooltip;

pub use anchored::AnchoredSurface;
pub use dropdown::DropdownComponent;
pub use event_log::{EventLogComponent, EventLogHandle};
pub use popover::PopoverComponent;
pub use tooltip::TooltipComponent;

pub use crate::component_context::ComponentContext;

pub trait Component {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext);

    fn handle_event(&mut self, _event: &Event, _ctx: &ComponentContext) -> bool {
        false
    }
}

/// A component that owns a floating panel anchored to its trigger.
///
/// Hosts render every trigger first, then every overlay (so panels paint on
/// top), then run the measurement pass.
pub trait Anchored: Component {
    fn surface(&self) -> &AnchoredSurface;
    fn surface_mut(&mut self) -> &mut AnchoredSurface;
    fn render_overlay(&mut self, frame: &mut UiFrame<'_>);

    fn after_render(&mut self) -> bool {
        self.surface_mut().after_render()
    }

    fn tick(&mut self, ctx: &ComponentContext) -> bool {
        !matches!(
            self.surface_mut().tick(ctx),
            crate::visibility::Transition::Unchanged
        )
    }

    fn unmount(&mut self) {
        self.surface_mut().unmount();
    }
}

macro_rules! impl_anchored {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Anchored for $ty {
                fn surface(&self) -> &AnchoredSurface {
                    <$ty>::surface(self)
                }

                fn surface_mut(&mut self) -> &mut AnchoredSurface {
                    <$ty>::surface_mut(self)
                }

                fn render_overlay(&mut self, frame: &mut UiFrame<'_>) {
                    <$ty>::render_overlay(self, frame)
                }
            }
        )*
    };
}

impl_anchored!(DropdownComponent, PopoverComponent, TooltipComponent);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ViewportSignals;

    struct DummyComp;
    impl Component for DummyComp {
        fn render(&mut self, _frame: &mut UiFrame<'_>, _area: Rect, _ctx: &ComponentContext) {}
    }

    #[test]
    fn default_handle_event_returns_false() {
        let mut d = DummyComp;
        assert!(!d.handle_event(
            &Event::Key(crossterm::event::KeyEvent::new(
                crossterm::event::KeyCode::Char('a'),
                crossterm::event::KeyModifiers::NONE
            )),
            &ComponentContext::default()
        ));
    }

    #[test]
    fn anchored_components_share_one_registry() {
        let signals = ViewportSignals::new();
        let mut overlays: Vec<Box<dyn Anchored>> = vec![
            Box::new(DropdownComponent::new("a", signals.clone())),
            Box::new(PopoverComponent::new("b", signals.clone())),
        ];
        let now = std::time::Instant::now();
        for overlay in overlays.iter_mut() {
            overlay.surface_mut().controller_mut().request_open(now);
        }
        assert_eq!(signals.listener_count(crate::host::SignalKind::Resize), 2);
        for overlay in overlays.iter_mut() {
            overlay.unmount();
        }
        assert_eq!(signals.listener_count(crate::host::SignalKind::Resize), 0);
    }
}
