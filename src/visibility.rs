//! Open/closed lifecycle of an anchored overlay.
//!
//! The machine has two states and never fails. Inputs that do not apply to
//! the configured trigger mode or close rules are ignored and reported as
//! [`Transition::Unchanged`].
//!
//! Ownership of the open flag is fixed at construction:
//!
//! - [`OpenState::Uncontrolled`]: the machine flips its own flag.
//! - [`OpenState::Controlled`]: the caller owns the flag. Transitions are
//!   reported as [`Intent`]s through the callback and the flag only changes
//!   through [`VisibilityMachine::set_external_open`].
//!
//! Hover opening may be delayed. The pending open is a deadline checked by
//! [`VisibilityMachine::tick`]; leaving the trigger before the deadline
//! cancels it.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use crate::config::{ConfigError, OverlayConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerMode {
    Hover,
    #[default]
    Click,
    Focus,
}

impl fmt::Display for TriggerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TriggerMode::Hover => "hover",
            TriggerMode::Click => "click",
            TriggerMode::Focus => "focus",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for TriggerMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hover" => Ok(TriggerMode::Hover),
            "click" => Ok(TriggerMode::Click),
            "focus" => Ok(TriggerMode::Focus),
            _ => Err(ConfigError::UnknownTrigger(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Open,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityInput {
    PointerEnter,
    PointerLeave,
    TriggerClick,
    FocusIn,
    FocusOut,
    /// An item inside the floating panel was activated.
    ItemClick,
    Escape,
    /// A click landed outside both the trigger and the floating panel.
    OutsideClick,
    RequestOpen,
    RequestClose,
    Toggle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Opened,
    Closed,
    /// A delayed hover open is now pending.
    Scheduled,
    /// A pending hover open was dropped.
    Cancelled,
    /// Controlled mode: the intent went to the owner, the flag is unchanged.
    Requested(Intent),
    Unchanged,
}

pub enum OpenState {
    Uncontrolled {
        internal_open: bool,
    },
    Controlled {
        external_open: bool,
        on_request_change: Box<dyn FnMut(Intent)>,
    },
}

impl fmt::Debug for OpenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenState::Uncontrolled { internal_open } => f
                .debug_struct("Uncontrolled")
                .field("internal_open", internal_open)
                .finish(),
            OpenState::Controlled { external_open, .. } => f
                .debug_struct("Controlled")
                .field("external_open", external_open)
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Debug)]
pub struct VisibilityMachine {
    config: OverlayConfig,
    state: OpenState,
    pending_open: Option<Instant>,
}

impl VisibilityMachine {
    pub fn uncontrolled(config: OverlayConfig) -> Self {
        Self {
            config,
            state: OpenState::Uncontrolled {
                internal_open: false,
            },
            pending_open: None,
        }
    }

    pub fn controlled<F>(config: OverlayConfig, external_open: bool, on_request_change: F) -> Self
    where
        F: FnMut(Intent) + 'static,
    {
        Self {
            config,
            state: OpenState::Controlled {
                external_open,
                on_request_change: Box::new(on_request_change),
            },
            pending_open: None,
        }
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        match &self.state {
            OpenState::Uncontrolled { internal_open } => *internal_open,
            OpenState::Controlled { external_open, .. } => *external_open,
        }
    }

    pub fn is_controlled(&self) -> bool {
        matches!(self.state, OpenState::Controlled { .. })
    }

    pub fn has_pending_open(&self) -> bool {
        self.pending_open.is_some()
    }

    pub fn apply(&mut self, input: VisibilityInput, now: Instant) -> Transition {
        let transition = self.step(input, now);
        if transition != Transition::Unchanged {
            tracing::debug!(?input, ?transition, "overlay visibility");
        }
        transition
    }

    /// Fire a pending hover open whose deadline has passed.
    pub fn tick(&mut self, now: Instant) -> Transition {
        match self.pending_open {
            Some(deadline) if now >= deadline => {
                self.pending_open = None;
                let transition = self.request(Intent::Open);
                tracing::debug!(?transition, "hover delay elapsed");
                transition
            }
            _ => Transition::Unchanged,
        }
    }

    /// Drop a pending hover open. Returns whether one was pending.
    pub fn cancel_pending(&mut self) -> bool {
        self.pending_open.take().is_some()
    }

    /// Write the owner's flag. Only meaningful in controlled mode; an
    /// uncontrolled machine ignores the call.
    pub fn set_external_open(&mut self, open: bool) -> Transition {
        let OpenState::Controlled { external_open, .. } = &mut self.state else {
            tracing::warn!("set_external_open on an uncontrolled overlay");
            return Transition::Unchanged;
        };
        if *external_open == open {
            return Transition::Unchanged;
        }
        *external_open = open;
        if open {
            self.pending_open = None;
            Transition::Opened
        } else {
            Transition::Closed
        }
    }

    /// Force the uncontrolled flag closed without emitting anything. Used on
    /// unmount; a controlled flag is left to its owner.
    pub fn reset(&mut self) {
        self.pending_open = None;
        if let OpenState::Uncontrolled { internal_open } = &mut self.state {
            *internal_open = false;
        }
    }

    fn step(&mut self, input: VisibilityInput, now: Instant) -> Transition {
        use VisibilityInput::*;

        let open = self.is_open();
        let mode = self.config.trigger;
        match input {
            PointerEnter => {
                if mode != TriggerMode::Hover || open {
                    return Transition::Unchanged;
                }
                if self.config.delay.is_zero() {
                    return self.request(Intent::Open);
                }
                if self.pending_open.is_some() {
                    return Transition::Unchanged;
                }
                self.pending_open = Some(now + self.config.delay);
                Transition::Scheduled
            }
            PointerLeave => self.close_path(mode == TriggerMode::Hover),
            TriggerClick => {
                if mode != TriggerMode::Click {
                    return Transition::Unchanged;
                }
                let intent = if open { Intent::Close } else { Intent::Open };
                self.request(intent)
            }
            FocusIn => {
                if mode != TriggerMode::Focus || open {
                    return Transition::Unchanged;
                }
                self.request(Intent::Open)
            }
            FocusOut => self.close_path(self.config.close_on_blur),
            ItemClick => self.close_path(self.config.close_on_click),
            Escape => self.close_path(self.config.close_on_escape),
            OutsideClick => self.close_path(true),
            RequestOpen => {
                self.pending_open = None;
                self.request(Intent::Open)
            }
            RequestClose => {
                self.pending_open = None;
                self.request(Intent::Close)
            }
            Toggle => {
                self.pending_open = None;
                let intent = if open { Intent::Close } else { Intent::Open };
                self.request(intent)
            }
        }
    }

    fn close_path(&mut self, enabled: bool) -> Transition {
        if !enabled {
            return Transition::Unchanged;
        }
        if self.pending_open.take().is_some() {
            return Transition::Cancelled;
        }
        if self.is_open() {
            self.request(Intent::Close)
        } else {
            Transition::Unchanged
        }
    }

    fn request(&mut self, intent: Intent) -> Transition {
        let want = intent == Intent::Open;
        match &mut self.state {
            OpenState::Uncontrolled { internal_open } => {
                if *internal_open == want {
                    return Transition::Unchanged;
                }
                *internal_open = want;
                if want {
                    Transition::Opened
                } else {
                    Transition::Closed
                }
            }
            OpenState::Controlled {
                external_open,
                on_request_change,
            } => {
                if *external_open == want {
                    return Transition::Unchanged;
                }
                on_request_change(intent);
                Transition::Requested(intent)
            }
        }
    }
}
