//! Opaque socket handles and the internal fd guard.

use std::fmt;
use std::os::unix::io::RawFd;

/// An opaque small integer identifying an OS-level socket (listening or
/// connected).
///
/// A `SocketHandle` is a plain value: it can be copied freely, stored in a
/// table, or handed across an FFI boundary as an integer. The bridge tracks
/// no aliasing — whoever holds the value owns the responsibility to
/// [`close`](crate::tcp::close) it exactly once. Double-close or
/// use-after-close is a caller contract violation, not detected by this
/// layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketHandle(RawFd);

impl SocketHandle {
    /// Wraps a raw fd obtained elsewhere (e.g. handed back in from the
    /// managed caller).
    pub fn from_raw(fd: RawFd) -> Self {
        Self(fd)
    }

    /// Returns the raw fd value, e.g. for external multiplexing.
    pub fn as_raw(self) -> RawFd {
        self.0
    }
}

impl fmt::Display for SocketHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fd {}", self.0)
    }
}

/// Closes the wrapped fd on drop unless it has been released.
///
/// Multi-step creation paths (listen: socket → bind → listen; connect:
/// socket → resolve → connect) route the fresh fd through a guard so that
/// any failure after partial acquisition releases the descriptor before the
/// error is surfaced. Error values must be constructed *before* the guard
/// drops, since the cleanup close may overwrite errno.
pub(crate) struct FdGuard {
    fd: RawFd,
    armed: bool,
}

impl FdGuard {
    pub(crate) fn new(fd: RawFd) -> Self {
        Self { fd, armed: true }
    }

    /// Disarms the guard and hands ownership of the fd back to the caller.
    pub(crate) fn release(mut self) -> RawFd {
        self.armed = false;
        self.fd
    }
}

impl Drop for FdGuard {
    fn drop(&mut self) {
        if self.armed {
            // Failure-path cleanup; the close result is unreportable here.
            unsafe {
                libc::close(self.fd);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Serializes the fd-creating tests so a descriptor number freed by one
    // cannot be recycled into the other mid-assertion.
    static FD_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_handle_round_trips_raw_fd() {
        let handle = SocketHandle::from_raw(7);
        assert_eq!(handle.as_raw(), 7);
    }

    #[test]
    fn test_handle_display_shows_fd_number() {
        assert_eq!(SocketHandle::from_raw(12).to_string(), "fd 12");
    }

    #[test]
    fn test_released_guard_does_not_close() {
        let _lock = FD_LOCK.lock().unwrap();
        // A pipe gives us a real fd without touching the network.
        let mut fds = [0; 2];
        assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
        let guard = FdGuard::new(fds[0]);
        let fd = guard.release();
        // Still open: closing it now must succeed.
        assert_eq!(unsafe { libc::close(fd) }, 0);
        unsafe { libc::close(fds[1]) };
    }

    #[test]
    fn test_dropped_guard_closes_fd() {
        let _lock = FD_LOCK.lock().unwrap();
        let mut fds = [0; 2];
        assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
        {
            let _guard = FdGuard::new(fds[0]);
        }
        // Already closed by the guard: a second close must fail with EBADF.
        assert_eq!(unsafe { libc::close(fds[0]) }, -1);
        unsafe { libc::close(fds[1]) };
    }
}
