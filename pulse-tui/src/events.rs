//! Event types for the TUI event loop.

use crossterm::event::KeyEvent;
use pulse_cache::QueryKey;

#[derive(Debug, Clone)]
pub enum TuiEvent {
    Input(KeyEvent),
    Tick,
    Resize { width: u16, height: u16 },
    /// A subscribed cache entry changed state.
    QueryUpdated(QueryKey),
}
