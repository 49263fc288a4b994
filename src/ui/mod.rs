//! UI rendering module for kwdash
//!
//! This module contains all the rendering logic for the terminal dashboard,
//! using the ratatui library for TUI components.

pub mod charts;
pub mod dashboard;
pub mod help_overlay;
pub mod widgets;

pub use dashboard::render as render_dashboard;
pub use help_overlay::render as render_help_overlay;
