//! Anchor geometry for floating panels.
//!
//! A floating panel (menu, tooltip, calendar) is placed next to its trigger
//! by projecting along a primary axis picked by [`Side`] and aligning on the
//! cross axis picked by [`Align`]. The projection is purely geometric: no
//! flipping and no clamping to the viewport. A panel that lands partly off
//! screen is drawn clipped by [`crate::ui::UiFrame`].
//!
//! All coordinates are terminal cells. Rectangles carry a signed origin so a
//! panel placed above the first row or left of the first column can still be
//! described.

use std::fmt;
use std::str::FromStr;

use ratatui::layout::Rect;

use crate::config::ConfigError;

/// Scroll offset of the host content area, added to viewport coordinates to
/// obtain document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollOffset {
    pub x: i32,
    pub y: i32,
}

impl ScrollOffset {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Signed rectangle origin with unsigned size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    pub top: i32,
    pub left: i32,
    pub width: u16,
    pub height: u16,
}

impl Bounds {
    pub const fn new(top: i32, left: i32, width: u16, height: u16) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    /// A size-only rectangle anchored at the origin.
    pub const fn sized(width: u16, height: u16) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn bottom(&self) -> i32 {
        self.top + self.height as i32
    }

    pub fn right(&self) -> i32 {
        self.left + self.width as i32
    }

    /// Zero-area boxes still project, but the result must be re-resolved once
    /// the element has real dimensions.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, column: i32, row: i32) -> bool {
        if self.is_degenerate() {
            return false;
        }
        column >= self.left && column < self.right() && row >= self.top && row < self.bottom()
    }

    /// Document-space bounds of a rect drawn at `rect` in the viewport.
    pub fn from_viewport(rect: Rect, scroll: ScrollOffset) -> Self {
        Self::from(rect).to_document(scroll)
    }

    pub fn to_document(self, scroll: ScrollOffset) -> Self {
        Self {
            top: self.top + scroll.y,
            left: self.left + scroll.x,
            ..self
        }
    }

    pub fn to_viewport(self, scroll: ScrollOffset) -> Self {
        Self {
            top: self.top - scroll.y,
            left: self.left - scroll.x,
            ..self
        }
    }

    pub fn with_position(self, position: Position) -> Self {
        Self {
            top: position.top,
            left: position.left,
            ..self
        }
    }

    /// Visible part of this box as an unsigned rect, if any cell lands at
    /// non-negative coordinates.
    pub fn visible_rect(&self) -> Option<Rect> {
        let left = self.left.max(0);
        let top = self.top.max(0);
        let right = self.right().min(u16::MAX as i32);
        let bottom = self.bottom().min(u16::MAX as i32);
        if right <= left || bottom <= top {
            return None;
        }
        Some(Rect {
            x: left as u16,
            y: top as u16,
            width: (right - left) as u16,
            height: (bottom - top) as u16,
        })
    }
}

impl From<Rect> for Bounds {
    fn from(rect: Rect) -> Self {
        Self::new(rect.y as i32, rect.x as i32, rect.width, rect.height)
    }
}

/// Top-left corner of a resolved floating panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub top: i32,
    pub left: i32,
}

impl Position {
    pub const fn new(top: i32, left: i32) -> Self {
        Self { top, left }
    }

    pub fn to_viewport(self, scroll: ScrollOffset) -> Self {
        Self {
            top: self.top - scroll.y,
            left: self.left - scroll.x,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
}

impl Side {
    /// Top and bottom push along the vertical axis; the cross axis is horizontal.
    pub fn is_vertical(self) -> bool {
        matches!(self, Side::Top | Side::Bottom)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Side::Top => "top",
            Side::Bottom => "bottom",
            Side::Left => "left",
            Side::Right => "right",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Side {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Side::Top),
            "bottom" => Ok(Side::Bottom),
            "left" => Ok(Side::Left),
            "right" => Ok(Side::Right),
            _ => Err(ConfigError::UnknownSide(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Start,
    Center,
    End,
}

impl fmt::Display for Align {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Align::Start => "start",
            Align::Center => "center",
            Align::End => "end",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Align {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(Align::Start),
            "center" | "centre" => Ok(Align::Center),
            "end" => Ok(Align::End),
            _ => Err(ConfigError::UnknownAlign(s.to_string())),
        }
    }
}

/// Where a floating panel sits relative to its trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Placement {
    pub side: Side,
    pub align: Align,
    /// Gap between trigger and panel along the primary axis, always outward.
    pub offset: u16,
}

impl Placement {
    pub const fn new(side: Side, align: Align, offset: u16) -> Self {
        Self {
            side,
            align,
            offset,
        }
    }

    /// Build a placement from loosely typed names. Unknown names fall back to
    /// the default side (`bottom`) or alignment (`start`) with a warning.
    pub fn parse_lenient(side: &str, align: &str, offset: u16) -> Self {
        let side = side.parse::<Side>().unwrap_or_else(|err| {
            tracing::warn!(%err, fallback = %Side::default(), "invalid placement side");
            Side::default()
        });
        let align = align.parse::<Align>().unwrap_or_else(|err| {
            tracing::warn!(%err, fallback = %Align::default(), "invalid placement align");
            Align::default()
        });
        Self::new(side, align, offset)
    }
}

/// Project `floating` next to `trigger`, both in document space.
///
/// Only the size of `floating` is read.
pub fn project(trigger: Bounds, floating: Bounds, placement: Placement) -> Position {
    let offset = placement.offset as i32;
    let fw = floating.width as i32;
    let fh = floating.height as i32;

    if placement.side.is_vertical() {
        let top = match placement.side {
            Side::Bottom => trigger.bottom() + offset,
            _ => trigger.top - fh - offset,
        };
        let left = match placement.align {
            Align::Start => trigger.left,
            Align::Center => trigger.left + (trigger.width as i32 - fw).div_euclid(2),
            Align::End => trigger.right() - fw,
        };
        Position { top, left }
    } else {
        let left = match placement.side {
            Side::Right => trigger.right() + offset,
            _ => trigger.left - fw - offset,
        };
        let top = match placement.align {
            Align::Start => trigger.top,
            Align::Center => trigger.top + (trigger.height as i32 - fh).div_euclid(2),
            Align::End => trigger.bottom() - fh,
        };
        Position { top, left }
    }
}

/// Resolve the document-space position of a floating panel from viewport
/// measurements and the current scroll offset.
pub fn resolve_position(
    trigger: Bounds,
    floating: Bounds,
    placement: Placement,
    scroll: ScrollOffset,
) -> Position {
    project(trigger.to_document(scroll), floating, placement)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIGGER: Bounds = Bounds::new(100, 100, 50, 20);
    const FLOATING: Bounds = Bounds::sized(80, 40);

    fn at(side: Side, align: Align) -> Position {
        project(TRIGGER, FLOATING, Placement::new(side, align, 8))
    }

    #[test]
    fn reference_placements() {
        assert_eq!(at(Side::Bottom, Align::Start), Position::new(128, 100));
        assert_eq!(at(Side::Top, Align::Center), Position::new(52, 85));
        assert_eq!(at(Side::Right, Align::End), Position::new(80, 158));
    }

    #[test]
    fn every_side_and_align() {
        assert_eq!(at(Side::Bottom, Align::Center), Position::new(128, 85));
        assert_eq!(at(Side::Bottom, Align::End), Position::new(128, 70));
        assert_eq!(at(Side::Top, Align::Start), Position::new(52, 100));
        assert_eq!(at(Side::Top, Align::End), Position::new(52, 70));
        assert_eq!(at(Side::Left, Align::Start), Position::new(100, 12));
        assert_eq!(at(Side::Left, Align::Center), Position::new(90, 12));
        assert_eq!(at(Side::Left, Align::End), Position::new(80, 12));
        assert_eq!(at(Side::Right, Align::Start), Position::new(100, 158));
        assert_eq!(at(Side::Right, Align::Center), Position::new(90, 158));
    }

    #[test]
    fn resolve_is_idempotent() {
        let placement = Placement::new(Side::Top, Align::Center, 3);
        let scroll = ScrollOffset::new(2, 7);
        let a = resolve_position(TRIGGER, FLOATING, placement, scroll);
        let b = resolve_position(TRIGGER, FLOATING, placement, scroll);
        assert_eq!(a, b);
    }

    #[test]
    fn scroll_offset_moves_result_into_document_space() {
        let placement = Placement::new(Side::Bottom, Align::Start, 0);
        let p = resolve_position(
            Bounds::new(5, 10, 4, 1),
            Bounds::sized(6, 3),
            placement,
            ScrollOffset::new(0, 30),
        );
        assert_eq!(p, Position::new(36, 10));
        assert_eq!(p.to_viewport(ScrollOffset::new(0, 30)), Position::new(6, 10));
    }

    #[test]
    fn no_clamping_near_the_origin() {
        let p = project(
            Bounds::new(0, 0, 4, 1),
            Bounds::sized(10, 3),
            Placement::new(Side::Top, Align::End, 1),
        );
        assert_eq!(p, Position::new(-4, -6));
    }

    #[test]
    fn odd_center_remainder_floors() {
        let p = project(
            Bounds::new(0, 0, 5, 1),
            Bounds::sized(2, 1),
            Placement::new(Side::Bottom, Align::Center, 0),
        );
        assert_eq!(p.left, 1);
        let p = project(
            Bounds::new(0, 0, 3, 1),
            Bounds::sized(8, 1),
            Placement::new(Side::Bottom, Align::Center, 0),
        );
        assert_eq!(p.left, -3);
    }

    #[test]
    fn degenerate_floating_still_projects() {
        let p = project(TRIGGER, Bounds::default(), Placement::default());
        assert_eq!(p, Position::new(120, 100));
        assert!(Bounds::default().is_degenerate());
    }

    #[test]
    fn lenient_parse_falls_back_to_defaults() {
        let p = Placement::parse_lenient("diagonal", "middle", 2);
        assert_eq!(p, Placement::new(Side::Bottom, Align::Start, 2));
        let p = Placement::parse_lenient("Right", "center", 0);
        assert_eq!(p, Placement::new(Side::Right, Align::Center, 0));
    }

    #[test]
    fn strict_parse_reports_unknown_names() {
        assert_eq!(
            "sideways".parse::<Side>(),
            Err(ConfigError::UnknownSide("sideways".to_string()))
        );
        assert!("middle".parse::<Align>().is_err());
    }

    #[test]
    fn visible_rect_clips_negative_origin() {
        let b = Bounds::new(-2, -3, 6, 4);
        assert_eq!(
            b.visible_rect(),
            Some(Rect {
                x: 0,
                y: 0,
                width: 3,
                height: 2
            })
        );
        assert_eq!(Bounds::new(-5, 0, 3, 2).visible_rect(), None);
    }

    #[test]
    fn contains_respects_edges() {
        let b = Bounds::new(1, 1, 3, 3);
        assert!(b.contains(1, 1));
        assert!(!b.contains(4, 1));
        assert!(!Bounds::new(0, 0, 0, 5).contains(0, 0));
    }

    #[test]
    fn from_viewport_adds_scroll() {
        let rect = Rect::new(4, 2, 10, 3);
        let doc = Bounds::from_viewport(rect, ScrollOffset::new(1, 20));
        assert_eq!(doc, Bounds::new(22, 5, 10, 3));
        assert_eq!(doc.to_viewport(ScrollOffset::new(1, 20)), Bounds::from(rect));
    }
}
