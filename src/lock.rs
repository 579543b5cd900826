//! Store-wide write lock with a bounded wait.
//!
//! The backing store has no native row-level transactions, so every update
//! is serialized behind one coarse mutual-exclusion lock. Acquisition blocks
//! up to a deadline and then fails cleanly; release is RAII so the lock
//! drops on every exit path.

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::error::{Result, VerifyError};

#[derive(Debug, Default)]
pub(crate) struct StoreLock {
    held: Mutex<bool>,
    released: Condvar,
}

impl StoreLock {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Block until the lock is free or the timeout elapses.
    pub(crate) fn acquire(&self, timeout: Duration) -> Result<StoreLockGuard<'_>> {
        let timeout_ms = timeout.as_millis() as u64;
        let deadline = Instant::now() + timeout;
        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        while *held {
            let remaining = deadline
                .checked_duration_since(Instant::now())
                .ok_or(VerifyError::LockTimeout { timeout_ms })?;
            let (guard, wait) = self
                .released
                .wait_timeout(held, remaining)
                .unwrap_or_else(PoisonError::into_inner);
            held = guard;
            if wait.timed_out() && *held {
                return Err(VerifyError::LockTimeout { timeout_ms });
            }
        }
        *held = true;
        Ok(StoreLockGuard { lock: self })
    }
}

pub(crate) struct StoreLockGuard<'a> {
    lock: &'a StoreLock,
}

impl Drop for StoreLockGuard<'_> {
    fn drop(&mut self) {
        let mut held = self
            .lock
            .held
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *held = false;
        self.lock.released.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn reacquire_after_release() {
        let lock = StoreLock::new();
        {
            let _guard = lock.acquire(Duration::from_millis(50)).unwrap();
        }
        assert!(lock.acquire(Duration::from_millis(50)).is_ok());
    }

    #[test]
    fn contended_acquire_times_out() {
        let lock = Arc::new(StoreLock::new());
        let guard = lock.acquire(Duration::from_millis(50)).unwrap();

        let contender = Arc::clone(&lock);
        let handle = thread::spawn(move || {
            contender
                .acquire(Duration::from_millis(30))
                .map(|_| ())
                .unwrap_err()
        });
        let err = handle.join().unwrap();
        assert!(matches!(err, VerifyError::LockTimeout { .. }));
        drop(guard);
    }

    #[test]
    fn waiter_proceeds_once_holder_drops() {
        let lock = Arc::new(StoreLock::new());
        let guard = lock.acquire(Duration::from_millis(50)).unwrap();

        let contender = Arc::clone(&lock);
        let handle = thread::spawn(move || {
            contender
                .acquire(Duration::from_millis(500))
                .map(|_| ())
                .is_ok()
        });
        thread::sleep(Duration::from_millis(20));
        drop(guard);
        assert!(handle.join().unwrap(), "waiter should win after release");
    }
}
