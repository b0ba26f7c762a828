//! confab-tui: Terminal UI components
//!
//! A lightweight terminal UI layer built on ratatui and crossterm.
//! Everything here is a pure projection of conversation state; no
//! widget mutates the store.

pub mod app;
pub mod input;
pub mod theme;
pub mod widgets;

pub use app::{App, AppState};
pub use theme::Theme;
