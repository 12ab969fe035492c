//! In-app log pane.
//!
//! Tracing output cannot go to stderr while the terminal is in raw mode, so
//! the subscriber installed by [`crate::tracing_sub::init`] writes into
//! a bounded line buffer that this component renders.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, OnceLock};

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::components::{Component, ComponentContext};
use crate::ui::UiFrame;

const DEFAULT_MAX_LINES: usize = 500;
static GLOBAL_LOG: OnceLock<EventLogHandle> = OnceLock::new();

pub fn set_global_event_log(handle: EventLogHandle) -> bool {
    GLOBAL_LOG.set(handle).is_ok()
}

pub fn global_event_log() -> Option<EventLogHandle> {
    GLOBAL_LOG.get().cloned()
}

#[derive(Debug)]
struct EventLogBuffer {
    lines: VecDeque<String>,
    max_lines: usize,
}

impl EventLogBuffer {
    fn new(max_lines: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            max_lines: max_lines.max(1),
        }
    }

    fn push_line(&mut self, line: String) {
        self.lines.push_back(line);
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }
}

#[derive(Clone, Debug)]
pub struct EventLogHandle {
    inner: Arc<Mutex<EventLogBuffer>>,
}

impl EventLogHandle {
    pub fn push(&self, line: impl Into<String>) {
        if let Ok(mut buffer) = self.inner.lock() {
            buffer.push_line(line.into());
        }
    }

    pub fn writer(&self) -> EventLogWriter {
        EventLogWriter::new(self.clone())
    }

    /// The most recent `count` lines, oldest first.
    pub fn tail(&self, count: usize) -> Vec<String> {
        match self.inner.lock() {
            Ok(buffer) => {
                let skip = buffer.lines.len().saturating_sub(count);
                buffer.lines.iter().skip(skip).cloned().collect()
            }
            Err(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|b| b.lines.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `io::Write` adapter that splits incoming bytes into log lines.
#[derive(Debug)]
pub struct EventLogWriter {
    handle: EventLogHandle,
    pending: Vec<u8>,
}

impl EventLogWriter {
    pub fn new(handle: EventLogHandle) -> Self {
        Self {
            handle,
            pending: Vec::new(),
        }
    }

    fn flush_pending(&mut self, force: bool) {
        if self.pending.is_empty() {
            return;
        }
        let end = if force {
            self.pending.len()
        } else {
            match self.pending.iter().rposition(|b| *b == b'\n') {
                Some(pos) => pos + 1,
                None => return,
            }
        };
        let drained: Vec<u8> = self.pending.drain(..end).collect();
        let text = String::from_utf8_lossy(&drained);
        for line in text.split('\n').filter(|line| !line.is_empty()) {
            self.handle.push(line.to_string());
        }
    }
}

impl Write for EventLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        self.flush_pending(false);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_pending(true);
        Ok(())
    }
}

impl Drop for EventLogWriter {
    fn drop(&mut self) {
        self.flush_pending(true);
    }
}

#[derive(Debug)]
pub struct EventLogComponent {
    handle: EventLogHandle,
    title: String,
}

impl EventLogComponent {
    pub fn new(max_lines: usize) -> (Self, EventLogHandle) {
        let handle = EventLogHandle {
            inner: Arc::new(Mutex::new(EventLogBuffer::new(max_lines))),
        };
        (
            Self {
                handle: handle.clone(),
                title: "Events".to_string(),
            },
            handle,
        )
    }

    pub fn new_default() -> (Self, EventLogHandle) {
        Self::new(DEFAULT_MAX_LINES)
    }
}

impl Component for EventLogComponent {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, _ctx: &ComponentContext) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let block = Block::default()
            .title(self.title.as_str())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(crate::theme::log_highlight()));
        let view = block.inner(area).height as usize;
        let lines = self
            .handle
            .tail(view)
            .into_iter()
            .map(Line::from)
            .collect::<Vec<_>>();
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}
