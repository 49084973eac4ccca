//! Live search box with a minimum-length gate and debounce.
//!
//! The cache has no opinion on short terms; this is where they are kept
//! from reaching it. Edits restart the debounce window, and only when it
//! elapses does the active term change.

use std::time::{Duration, Instant};

/// True if `term` is long enough to search for.
pub fn is_searchable(term: &str, min_chars: usize) -> bool {
    term.chars().count() >= min_chars
}

/// What the owner of the search subscription should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchChange {
    /// Replace the current subscription with one for this term.
    Subscribe(String),
    /// Drop the current subscription.
    Clear,
}

#[derive(Debug, Clone)]
pub struct SearchBox {
    input: String,
    min_chars: usize,
    debounce: Duration,
    edited_at: Option<Instant>,
    active: Option<String>,
}

impl SearchBox {
    pub fn new(min_chars: usize, debounce: Duration) -> Self {
        Self {
            input: String::new(),
            min_chars,
            debounce,
            edited_at: None,
            active: None,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Term currently driving the search subscription.
    pub fn active_term(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn min_chars(&self) -> usize {
        self.min_chars
    }

    /// Input is non-empty but below the gate.
    pub fn is_too_short(&self) -> bool {
        !self.input.is_empty() && !is_searchable(&self.input, self.min_chars)
    }

    pub fn push(&mut self, c: char, now: Instant) {
        self.input.push(c);
        self.edited_at = Some(now);
    }

    pub fn backspace(&mut self, now: Instant) {
        if self.input.pop().is_some() {
            self.edited_at = Some(now);
        }
    }

    pub fn clear(&mut self, now: Instant) {
        if !self.input.is_empty() {
            self.input.clear();
            self.edited_at = Some(now);
        }
    }

    /// Settle pending edits once the debounce window has passed.
    pub fn poll(&mut self, now: Instant) -> Option<SearchChange> {
        let edited_at = self.edited_at?;
        if now.saturating_duration_since(edited_at) < self.debounce {
            return None;
        }
        self.edited_at = None;

        let wanted = is_searchable(&self.input, self.min_chars).then(|| self.input.clone());
        if wanted == self.active {
            return None;
        }
        self.active = wanted.clone();
        Some(match wanted {
            Some(term) => SearchChange::Subscribe(term),
            None => SearchChange::Clear,
        })
    }
}
