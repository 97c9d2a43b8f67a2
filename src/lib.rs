//! Month calendar library
//!
//! This library computes month grids and manages per-day calendar events:
//! creating, editing, deleting, searching and exporting them, with the event
//! collection persisted in a key-value store.

mod calendar;
mod cli;
mod config;
mod errors;
mod event;
mod event_store;
mod helper;
mod notify;
mod render;
mod storage;
mod types;
mod widget;

// Re-export key components
pub use calendar::*;
pub use cli::*;
pub use config::*;
pub use errors::*;
pub use event::*;
pub use event_store::*;
pub use helper::*;
pub use notify::*;
pub use render::*;
pub use storage::*;
pub use types::*;
pub use widget::*;
