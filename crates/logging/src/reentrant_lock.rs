//! crates/logging/src/reentrant_lock.rs
//!
//! A lock the owning thread may acquire again without blocking.
//!
//! The owner identity and recursion depth sit behind a short-lived
//! [`parking_lot::Mutex`]. Waiters park on a [`Condvar`] until the owner's
//! depth drops to zero. Unlike [`parking_lot::ReentrantMutex`], release is an
//! explicit call that verifies the caller, so a message assembled across
//! several calls can hold the lock between them.

use std::fmt;
use std::marker::PhantomData;
use std::thread::{self, ThreadId};

use parking_lot::{Condvar, Mutex};

use crate::error::LockError;

#[derive(Debug, Default)]
struct Ownership {
    owner: Option<ThreadId>,
    depth: usize,
}

/// Recursive mutual-exclusion lock with checked release.
///
/// # Examples
///
/// ```
/// use logging::{LockError, ReentrantLock};
///
/// let lock = ReentrantLock::new();
/// lock.lock();
/// lock.lock();
/// assert_eq!(lock.depth(), 2);
/// lock.unlock().unwrap();
/// lock.unlock().unwrap();
/// assert!(!lock.is_locked());
/// assert_eq!(lock.unlock(), Err(LockError::NotOwner));
/// ```
#[derive(Default)]
pub struct ReentrantLock {
    state: Mutex<Ownership>,
    released: Condvar,
}

impl ReentrantLock {
    /// Creates an unlocked lock.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(Ownership {
                owner: None,
                depth: 0,
            }),
            released: Condvar::new(),
        }
    }

    /// Acquires the lock, blocking while another thread holds it. A thread
    /// that already owns the lock returns immediately with the depth raised.
    pub fn lock(&self) {
        let me = thread::current().id();
        let mut state = self.state.lock();
        if state.owner == Some(me) {
            state.depth += 1;
            return;
        }
        while state.owner.is_some() {
            self.released.wait(&mut state);
        }
        state.owner = Some(me);
        state.depth = 1;
    }

    /// Acquires the lock if no other thread holds it.
    pub fn try_lock(&self) -> bool {
        let me = thread::current().id();
        let mut state = self.state.lock();
        match state.owner {
            Some(owner) if owner == me => {
                state.depth += 1;
                true
            }
            Some(_) => false,
            None => {
                state.owner = Some(me);
                state.depth = 1;
                true
            }
        }
    }

    /// Releases one level of ownership. The lock becomes available to other
    /// threads once every `lock` has been matched.
    ///
    /// # Errors
    ///
    /// Returns [`LockError::NotOwner`] when the calling thread does not hold
    /// the lock. The lock state is left unchanged.
    pub fn unlock(&self) -> Result<(), LockError> {
        let me = thread::current().id();
        let mut state = self.state.lock();
        if state.owner != Some(me) {
            return Err(LockError::NotOwner);
        }
        state.depth -= 1;
        if state.depth == 0 {
            state.owner = None;
            drop(state);
            self.released.notify_one();
        }
        Ok(())
    }

    /// Acquires the lock and returns a guard that releases it on drop.
    pub fn guard(&self) -> ReentrantGuard<'_> {
        self.lock();
        ReentrantGuard {
            lock: self,
            _not_send: PhantomData,
        }
    }

    /// Whether the calling thread owns the lock.
    pub fn is_held_by_current_thread(&self) -> bool {
        self.state.lock().owner == Some(thread::current().id())
    }

    /// Whether any thread owns the lock.
    pub fn is_locked(&self) -> bool {
        self.state.lock().owner.is_some()
    }

    /// Recursion depth of the current owner; zero when unlocked.
    pub fn depth(&self) -> usize {
        self.state.lock().depth
    }
}

impl fmt::Debug for ReentrantLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ReentrantLock")
            .field("owner", &state.owner)
            .field("depth", &state.depth)
            .finish()
    }
}

/// Scoped ownership of a [`ReentrantLock`].
///
/// The guard is neither `Send` nor `Sync`: it must be dropped on the thread
/// that acquired it.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct ReentrantGuard<'a> {
    lock: &'a ReentrantLock,
    _not_send: PhantomData<*const ()>,
}

impl ReentrantGuard<'_> {
    /// The lock this guard holds.
    pub fn lock(&self) -> &ReentrantLock {
        self.lock
    }
}

impl Drop for ReentrantGuard<'_> {
    fn drop(&mut self) {
        let released = self.lock.unlock();
        debug_assert!(released.is_ok(), "guard dropped off its owning thread");
    }
}

impl fmt::Debug for ReentrantGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReentrantGuard").field("lock", self.lock).finish()
    }
}
