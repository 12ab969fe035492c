use std::io;
use std::time::{Duration, Instant};

use crossterm::event::Event;

use crate::drivers::InputDriver;

pub enum ControlFlow {
    Continue,
    Quit,
}

/// Single-threaded message pump driving the UI.
///
/// Every input event and every idle wake-up is handed to one handler closure
/// together with the instant it was observed. The idle wake-up (`None`) is
/// where hosts fire due hover-open deadlines and redraw, so the poll interval
/// bounds how late a delayed overlay can appear.
pub struct EventLoop<D> {
    driver: D,
    poll_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
        }
    }

    /// Runs the loop until the handler returns [`ControlFlow::Quit`].
    ///
    /// The handler is called with `None` once per iteration and with
    /// `Some(event)` for every queued input. Bursts (mouse drags, wheel
    /// scrolling) are drained before the next idle call so rendering does not
    /// fall behind the input stream.
    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(&mut D, Option<Event>, Instant) -> io::Result<ControlFlow>,
    {
        loop {
            if let ControlFlow::Quit = handler(&mut self.driver, None, Instant::now())? {
                break;
            }

            if self.driver.poll(self.poll_interval)? {
                loop {
                    let event = self.driver.read()?;
                    if let ControlFlow::Quit =
                        handler(&mut self.driver, Some(event), Instant::now())?
                    {
                        return Ok(());
                    }
                    if !self.driver.poll(Duration::from_millis(0))? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}
