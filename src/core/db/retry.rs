//! Retry-on-lock execution for SQLite statements
//!
//! SQLite reports `SQLITE_BUSY`/`SQLITE_LOCKED` when another connection
//! holds a conflicting lock. [`LockRetry`] re-runs the operation after a
//! short sleep until its timeout elapses, then hands back the last error.

use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use rusqlite::ErrorCode;
use tracing::{debug, warn};

/// Default time spent retrying a locked database
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

/// Default pause between attempts
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// Errors that can report transient lock contention
pub trait LockContention {
    fn is_lock_contention(&self) -> bool;
}

impl LockContention for rusqlite::Error {
    fn is_lock_contention(&self) -> bool {
        matches!(
            self.sqlite_error_code(),
            Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
        )
    }
}

/// Blocking retry policy for database operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockRetry {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for LockRetry {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_LOCK_TIMEOUT,
            interval: DEFAULT_RETRY_INTERVAL,
        }
    }
}

impl LockRetry {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run `op`, retrying while it fails with lock contention.
    ///
    /// Any other error is returned at once. Once `timeout` has elapsed the
    /// most recent lock error is returned unchanged.
    pub fn execute<T, E, F>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        E: LockContention + fmt::Display,
    {
        let started = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            match op() {
                Ok(value) => {
                    if attempts > 1 {
                        debug!(attempts, "database operation succeeded after lock retry");
                    }
                    return Ok(value);
                }
                Err(err) if err.is_lock_contention() => {
                    let elapsed = started.elapsed();
                    if elapsed >= self.timeout {
                        warn!(
                            attempts,
                            elapsed_ms = elapsed.as_millis() as u64,
                            error = %err,
                            "giving up on locked database"
                        );
                        return Err(err);
                    }
                    debug!(attempt = attempts, error = %err, "database locked, retrying");
                    thread::sleep(self.interval);
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug, PartialEq)]
    enum FakeError {
        Locked(u32),
        Broken,
    }

    impl fmt::Display for FakeError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                FakeError::Locked(n) => write!(f, "locked #{}", n),
                FakeError::Broken => write!(f, "broken"),
            }
        }
    }

    impl LockContention for FakeError {
        fn is_lock_contention(&self) -> bool {
            matches!(self, FakeError::Locked(_))
        }
    }

    fn quick(timeout_ms: u64) -> LockRetry {
        LockRetry::new(Duration::from_millis(timeout_ms)).with_interval(Duration::from_millis(1))
    }

    #[test]
    fn test_succeeds_after_transient_locks() {
        let calls = Cell::new(0u32);
        let result = quick(5_000).execute(|| {
            calls.set(calls.get() + 1);
            if calls.get() < 4 {
                Err(FakeError::Locked(calls.get()))
            } else {
                Ok("done")
            }
        });
        assert_eq!(result, Ok("done"));
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn test_timeout_returns_original_error() {
        let calls = Cell::new(0u32);
        let result: Result<(), FakeError> = quick(30).execute(|| {
            calls.set(calls.get() + 1);
            Err(FakeError::Locked(calls.get()))
        });
        let err = result.unwrap_err();
        assert!(calls.get() > 1);
        assert_eq!(err, FakeError::Locked(calls.get()));
    }

    #[test]
    fn test_other_errors_are_not_retried() {
        let calls = Cell::new(0u32);
        let result: Result<(), FakeError> = quick(5_000).execute(|| {
            calls.set(calls.get() + 1);
            Err(FakeError::Broken)
        });
        assert_eq!(result, Err(FakeError::Broken));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_zero_timeout_tries_once() {
        let calls = Cell::new(0u32);
        let result: Result<(), FakeError> = quick(0).execute(|| {
            calls.set(calls.get() + 1);
            Err(FakeError::Locked(1))
        });
        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_rusqlite_busy_is_contention() {
        let busy = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        assert!(busy.is_lock_contention());
        assert!(!rusqlite::Error::QueryReturnedNoRows.is_lock_contention());
    }
}
