//! Anchored floating overlays for terminal UIs.
//!
//! A floating panel (dropdown menu, tooltip, popover) is positioned against a
//! trigger element by [`geometry::resolve_position`], shown and hidden by a
//! [`visibility::VisibilityMachine`], and kept in sync with the viewport by an
//! [`controller::OverlayController`]. The [`components`] module wires these
//! into ratatui widgets.

pub mod component_context;
pub mod components;
pub mod config;
pub mod controller;
pub mod drivers;
pub mod event_loop;
pub mod geometry;
pub mod host;
pub mod keybindings;
pub mod theme;
pub mod tracing_sub;
pub mod ui;
pub mod visibility;
