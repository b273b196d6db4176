//! Bounded, timestamped event history.

use std::collections::VecDeque;

use chrono::Local;

/// Entries kept before the oldest is dropped.
pub const HISTORY_CAPACITY: usize = 20;

#[derive(Clone, Debug)]
pub struct History {
    entries:  VecDeque<String>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self { History::with_capacity(HISTORY_CAPACITY) }
}

impl History {
    pub fn new() -> Self { History::default() }

    pub fn with_capacity(capacity: usize) -> Self {
        History { entries: VecDeque::with_capacity(capacity), capacity: capacity.max(1) }
    }

    /// Append `msg` with a local `[HH:MM:SS] ` prefix.
    pub fn push(&mut self, msg: impl AsRef<str>) {
        let line = format!("{}{}", Local::now().format("[%H:%M:%S] "), msg.as_ref());
        self.push_raw(line);
    }

    pub fn push_raw(&mut self, line: String) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(line);
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.entries.back().map(String::as_str)
    }
}
