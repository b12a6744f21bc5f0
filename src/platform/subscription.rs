//! Listener liveness
//!
//! Host platforms do not always stop delivering events the instant a
//! listener is removed. The flag is created before the callback is
//! registered and captured by it; cancelling flips the flag first and then
//! runs the host-specific detach.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Shared "is this subscription still live" flag
#[derive(Debug, Clone)]
pub struct LiveFlag(Rc<Cell<bool>>);

impl LiveFlag {
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        self.0.get()
    }

    fn kill(&self) {
        self.0.set(false);
    }
}

impl Default for LiveFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Owned handle to a host listener; cancels on drop
pub struct Subscription {
    flag: LiveFlag,
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wrap a registered listener. `flag` must be the one its callback checks.
    pub fn new(flag: LiveFlag, detach: impl FnOnce() + 'static) -> Self {
        Self {
            flag,
            detach: Some(Box::new(detach)),
        }
    }

    pub fn is_live(&self) -> bool {
        self.flag.is_live()
    }

    /// Mark dead and detach. Safe to call more than once.
    pub fn cancel(&mut self) {
        self.flag.kill();
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("live", &self.is_live())
            .finish()
    }
}
