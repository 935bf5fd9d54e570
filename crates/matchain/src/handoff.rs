//! Write-once, blocking single-value cell.

use parking_lot::{Condvar, Mutex};

enum State<T> {
    Empty,
    Full(T),
    Taken,
}

/// Carries one value from a producer to a consumer.
///
/// The first [`put`](Handoff::put) wins; [`take`](Handoff::take) parks the
/// caller until that value arrives.
pub struct Handoff<T> {
    state: Mutex<State<T>>,
    ready: Condvar,
}

impl<T> Default for Handoff<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Handoff<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::Empty),
            ready: Condvar::new(),
        }
    }

    /// Stores `value`, waking a waiting consumer.
    ///
    /// # Errors
    /// Returns the value back if the cell was already written.
    pub fn put(&self, value: T) -> Result<(), T> {
        let mut state = self.state.lock();
        if !matches!(*state, State::Empty) {
            return Err(value);
        }
        *state = State::Full(value);
        drop(state);
        self.ready.notify_one();
        Ok(())
    }

    /// Blocks until a value is present and moves it out. Returns `None` if
    /// the value was already taken.
    pub fn take(&self) -> Option<T> {
        let mut state = self.state.lock();
        while matches!(*state, State::Empty) {
            self.ready.wait(&mut state);
        }
        match std::mem::replace(&mut *state, State::Taken) {
            State::Full(value) => Some(value),
            State::Empty | State::Taken => None,
        }
    }

    /// Whether a value has been written (taken or not).
    pub fn is_written(&self) -> bool {
        !matches!(*self.state.lock(), State::Empty)
    }
}

impl<T> std::fmt::Debug for Handoff<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match *self.state.lock() {
            State::Empty => "empty",
            State::Full(_) => "full",
            State::Taken => "taken",
        };
        f.debug_struct("Handoff").field("state", &state).finish()
    }
}
