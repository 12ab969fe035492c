//! UiFrame: a thin wrapper around `ratatui::Frame` that clamps drawing to the
//! visible area.
//!
//! Floating panels are positioned without any collision handling, so a
//! dropdown anchored near the bottom edge or a tooltip above the first row
//! routinely lands partly outside the terminal. Components draw those panels
//! into an offscreen buffer of the panel's own size and composite it through
//! [`UiFrame::blit_from_signed`], which drops the cells that fall outside.
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;

use crate::geometry::Bounds;

pub struct UiFrame<'a> {
    area: Rect,
    buffer: &'a mut Buffer,
}

impl<'a> UiFrame<'a> {
    pub fn new(frame: &'a mut Frame<'_>) -> Self {
        let area = frame.area();
        let buffer = frame.buffer_mut();
        Self { area, buffer }
    }

    /// Construct a `UiFrame` directly from an area and buffer.
    pub fn from_parts(area: Rect, buffer: &'a mut Buffer) -> Self {
        Self { area, buffer }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer {
        self.buffer
    }

    fn clip_rect(&self, rect: Rect) -> Option<Rect> {
        let clipped = rect.intersection(self.area);
        if clipped.width == 0 || clipped.height == 0 {
            None
        } else {
            Some(clipped)
        }
    }

    pub fn render_widget<W>(&mut self, widget: W, area: Rect)
    where
        W: Widget,
    {
        if let Some(clipped) = self.clip_rect(area) {
            widget.render(clipped, self.buffer);
        }
    }

    /// Write a single line starting at the top-left cell of `area`, cut at
    /// the right edge of `area` or the frame, whichever comes first. Nothing
    /// is written when that cell is off the frame.
    pub fn write_line(&mut self, area: Rect, text: &str, style: Style) {
        let Some(clipped) = self.clip_rect(area) else {
            return;
        };
        if (clipped.x, clipped.y) != (area.x, area.y) {
            return;
        }
        self.buffer
            .set_stringn(area.x, area.y, text, clipped.width as usize, style);
    }

    /// Composite `src`, drawn at its own origin, onto the frame at `dest`.
    /// `dest` may start above or left of the frame; only the overlap is copied.
    pub fn blit_from_signed(&mut self, src: &Buffer, dest: Bounds) {
        let Some(visible) = dest.visible_rect() else {
            return;
        };
        let Some(visible) = self.clip_rect(visible) else {
            return;
        };
        for y in visible.top()..visible.bottom() {
            let sy = (y as i32 - dest.top) as u16;
            for x in visible.left()..visible.right() {
                let sx = (x as i32 - dest.left) as u16;
                if let (Some(src_cell), Some(dst_cell)) =
                    (src.cell((sx, sy)), self.buffer.cell_mut((x, y)))
                {
                    *dst_cell = src_cell.clone();
                }
            }
        }
    }
}

/// Clamp a character or row count to a `u16` extent.
pub(crate) fn cell_extent(count: usize) -> u16 {
    u16::try_from(count).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(width: u16, height: u16, symbol: &str) -> Buffer {
        let mut src = Buffer::empty(Rect::new(0, 0, width, height));
        for y in 0..height {
            for x in 0..width {
                if let Some(cell) = src.cell_mut((x, y)) {
                    cell.set_symbol(symbol);
                }
            }
        }
        src
    }

    #[test]
    fn blit_from_signed_clips_negative_offsets() {
        let frame_area = Rect::new(0, 0, 4, 2);
        let mut dest = Buffer::empty(frame_area);
        {
            let mut frame = UiFrame::from_parts(frame_area, &mut dest);
            frame.blit_from_signed(&filled(3, 2, "#"), Bounds::new(0, -1, 3, 2));
        }
        assert_eq!(dest.cell((0, 0)).map(|c| c.symbol()), Some("#"));
        assert_eq!(dest.cell((1, 1)).map(|c| c.symbol()), Some("#"));
        assert_eq!(dest.cell((2, 0)).map(|c| c.symbol()), Some(" "));
    }

    #[test]
    fn blit_from_signed_drops_cells_past_the_far_edge() {
        let frame_area = Rect::new(0, 0, 4, 2);
        let mut dest = Buffer::empty(frame_area);
        {
            let mut frame = UiFrame::from_parts(frame_area, &mut dest);
            frame.blit_from_signed(&filled(3, 3, "@"), Bounds::new(1, 2, 3, 3));
        }
        assert_eq!(dest.cell((3, 1)).map(|c| c.symbol()), Some("@"));
        assert_eq!(dest.cell((1, 1)).map(|c| c.symbol()), Some(" "));
        assert_eq!(dest.cell((2, 0)).map(|c| c.symbol()), Some(" "));
    }

    #[test]
    fn render_widget_outside_area_is_skipped() {
        let frame_area = Rect::new(0, 0, 4, 2);
        let mut dest = Buffer::empty(frame_area);
        let mut frame = UiFrame::from_parts(frame_area, &mut dest);
        frame.render_widget(
            ratatui::widgets::Paragraph::new("hi"),
            Rect::new(10, 10, 3, 1),
        );
    }

    #[test]
    fn write_line_is_cut_at_frame_edge() {
        let frame_area = Rect::new(0, 0, 4, 1);
        let mut buf = Buffer::empty(frame_area);
        {
            let mut frame = UiFrame::from_parts(frame_area, &mut buf);
            frame.write_line(Rect::new(1, 0, 10, 1), "hello", Style::default());
            frame.write_line(Rect::new(0, 3, 10, 1), "off", Style::default());
        }
        assert_eq!(buf.cell((1, 0)).map(|c| c.symbol()), Some("h"));
        assert_eq!(buf.cell((3, 0)).map(|c| c.symbol()), Some("l"));
    }

    #[test]
    fn cell_extent_saturates() {
        assert_eq!(cell_extent(12), 12);
        assert_eq!(cell_extent(70_000), u16::MAX);
        assert_eq!(cell_extent(70_000).saturating_add(2), u16::MAX);
    }
}
