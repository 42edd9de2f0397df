//! The single error kind surfaced by the bridge.
//!
//! Every failed operation produces a [`SocketError`] carrying a
//! human-readable diagnostic derived from the OS error code. No structured
//! error codes are exposed: a caller that needs to branch on error *kind*
//! (say, "connection refused" vs. "host unreachable") must parse the message
//! text. That is a known limitation of this surface, kept so the error
//! channel stays a plain string for the managed-runtime caller.

use thiserror::Error;

/// Fallback diagnostic used when a syscall fails without leaving an errno.
const GENERIC_MESSAGE: &str = "socket error";

/// A socket or entropy operation failed.
///
/// Carries only a diagnostic message; there is no variant structure to
/// match on.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct SocketError {
    message: String,
}

impl SocketError {
    /// Builds an error from the errno left behind by the last failed
    /// syscall, falling back to a generic message when no specific errno is
    /// set.
    ///
    /// Must be called before any cleanup syscall (such as closing a
    /// partially-created fd) so the diagnostic is not clobbered.
    pub(crate) fn last_os() -> Self {
        Self::from_io(std::io::Error::last_os_error())
    }

    /// Builds an error from an [`std::io::Error`], applying the same
    /// generic-message fallback for errors that carry no OS code.
    pub(crate) fn from_io(err: std::io::Error) -> Self {
        match err.raw_os_error() {
            Some(code) if code != 0 => Self {
                message: err.to_string(),
            },
            Some(_) => Self {
                message: GENERIC_MESSAGE.to_string(),
            },
            None => {
                // Synthetic io::Errors (e.g. resolver failures) still carry
                // a useful message even without an errno.
                let text = err.to_string();
                if text.is_empty() {
                    Self {
                        message: GENERIC_MESSAGE.to_string(),
                    }
                } else {
                    Self { message: text }
                }
            }
        }
    }

    /// Builds an error with an explicit message.
    pub(crate) fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_message_is_displayed_verbatim() {
        let err = SocketError::message("entropy source returned no data");
        assert_eq!(err.to_string(), "entropy source returned no data");
    }

    #[test]
    fn test_os_error_includes_strerror_text() {
        let err = SocketError::from_io(std::io::Error::from_raw_os_error(libc::EBADF));
        // Exact wording is libc-specific; the errno must be represented.
        assert!(err.to_string().contains("os error 9") || err.to_string().contains("Bad file"));
    }

    #[test]
    fn test_errno_zero_falls_back_to_generic_message() {
        let err = SocketError::from_io(std::io::Error::from_raw_os_error(0));
        assert_eq!(err.to_string(), "socket error");
    }

    #[test]
    fn test_synthetic_io_error_keeps_its_message() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "no IPv4 address found");
        let err = SocketError::from_io(io);
        assert_eq!(err.to_string(), "no IPv4 address found");
    }
}
