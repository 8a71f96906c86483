//! Linear undo/redo over whole-state snapshots.

use std::collections::VecDeque;

use tracing::{debug, trace};

/// Number of states kept on each side of the present.
pub const MAX_HISTORY: usize = 50;

/// Past, present and future snapshots of a value.
///
/// All changes go through [`History::commit`]. Undo and redo only move
/// snapshots between the stacks; they never recompute a state.
#[derive(Debug, Clone)]
pub struct History<T> {
    past: VecDeque<T>,
    present: T,
    future: VecDeque<T>,
    limit: usize,
}

impl<T: Clone + PartialEq> History<T> {
    pub fn new(initial: T) -> Self {
        Self::with_limit(initial, MAX_HISTORY)
    }

    pub fn with_limit(initial: T, limit: usize) -> Self {
        Self {
            past: VecDeque::new(),
            present: initial,
            future: VecDeque::new(),
            limit,
        }
    }

    pub fn present(&self) -> &T {
        &self.present
    }

    /// Applies `transform` to the present state.
    ///
    /// Returns whether a new state was recorded. A transform whose result
    /// equals the present leaves the history untouched; any other result
    /// becomes the present and discards the redo stack.
    pub fn commit<F>(&mut self, transform: F) -> bool
    where
        F: FnOnce(&T) -> T,
    {
        let candidate = transform(&self.present);
        if candidate == self.present {
            trace!("Commit produced no change");
            return false;
        }

        let previous = std::mem::replace(&mut self.present, candidate);
        self.push_past(previous);
        self.future.clear();
        debug!(past = self.past.len(), "Committed new state");
        true
    }

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.past.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push_front(current);
        if self.future.len() > self.limit {
            self.future.pop_back();
        }
        debug!(past = self.past.len(), future = self.future.len(), "Undo");
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop_front() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, next);
        self.push_past(current);
        debug!(past = self.past.len(), future = self.future.len(), "Redo");
        true
    }

    /// Starts over from `initial`. The previous states are not reachable
    /// through undo afterwards.
    pub fn replace_initial(&mut self, initial: T) {
        self.past.clear();
        self.future.clear();
        self.present = initial;
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    fn push_past(&mut self, state: T) {
        self.past.push_back(state);
        if self.past.len() > self.limit {
            self.past.pop_front();
            trace!(limit = self.limit, "Dropped oldest undo state");
        }
    }
}
