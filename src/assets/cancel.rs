//! Cancellation for in-flight loads
//!
//! Every load started by a scene carries a clone of the scene's token. The
//! scene cancels it on teardown, and completions check it before touching
//! anything.

use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
pub struct LoadToken {
    cancelled: Rc<Cell<bool>>,
}

impl LoadToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    /// Run `f` with `value` unless the token was cancelled meanwhile
    pub fn complete<T>(&self, value: T, f: impl FnOnce(T)) -> bool {
        if self.is_cancelled() {
            log::debug!("Dropping result of a cancelled load");
            return false;
        }
        f(value);
        true
    }
}

/// Cancels the wrapped token when dropped
#[derive(Debug)]
pub struct CancelOnDrop(LoadToken);

impl CancelOnDrop {
    pub fn new(token: LoadToken) -> Self {
        Self(token)
    }

    pub fn token(&self) -> &LoadToken {
        &self.0
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let token = LoadToken::new();
        let load = token.clone();
        assert!(!load.is_cancelled());
        token.cancel();
        assert!(load.is_cancelled());
    }

    #[test]
    fn test_complete_runs_when_live() {
        let token = LoadToken::new();
        let mut out = None;
        assert!(token.complete(7, |v| out = Some(v)));
        assert_eq!(out, Some(7));
    }

    #[test]
    fn test_cancelled_completion_is_noop() {
        let token = LoadToken::new();
        token.cancel();
        let mut ran = false;
        assert!(!token.complete((), |_| ran = true));
        assert!(!ran);
    }

    #[test]
    fn test_guard_cancels_on_drop() {
        let token = LoadToken::new();
        {
            let guard = CancelOnDrop::new(token.clone());
            assert!(!guard.token().is_cancelled());
        }
        assert!(token.is_cancelled());
    }
}
