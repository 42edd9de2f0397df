//! Cryptographically secure random bytes from the OS entropy facility.
//!
//! The platform strategy is selected once at build time behind a single
//! internal fill function: Linux uses the `getrandom(2)` syscall, other
//! Unix platforms read the blocking random device. Either way the operation
//! is all-or-nothing — unlike receive/send, no partial output is ever
//! returned.

use crate::error::SocketError;

/// Produces exactly `n` cryptographically-strong random bytes.
///
/// `n = 0` returns an empty buffer without touching the entropy source.
///
/// # Errors
///
/// Returns [`SocketError`] if the entropy source cannot supply the
/// requested bytes (device open failure, non-retryable short read). On
/// error no partial output is returned.
pub fn secure_random_bytes(n: usize) -> Result<Vec<u8>, SocketError> {
    let mut buf = vec![0u8; n];
    if n > 0 {
        fill_entropy(&mut buf)?;
    }
    Ok(buf)
}

/// Fills the buffer from `getrandom(2)`, looping on interruption and on
/// legitimate short fills for large requests.
#[cfg(target_os = "linux")]
fn fill_entropy(buf: &mut [u8]) -> Result<(), SocketError> {
    use std::os::raw::c_void;

    let mut filled = 0;
    while filled < buf.len() {
        let rest = &mut buf[filled..];
        let got = unsafe { libc::getrandom(rest.as_mut_ptr() as *mut c_void, rest.len(), 0) };
        if got < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                continue;
            }
            return Err(SocketError::from_io(err));
        }
        if got == 0 {
            return Err(SocketError::message("entropy source returned no data"));
        }
        filled += got as usize;
    }
    Ok(())
}

/// Fills the buffer from the blocking random device.
#[cfg(not(target_os = "linux"))]
fn fill_entropy(buf: &mut [u8]) -> Result<(), SocketError> {
    use std::io::Read;

    let mut device = std::fs::File::open("/dev/urandom").map_err(SocketError::from_io)?;
    // read_exact loops internally until the buffer is full; a premature EOF
    // from the device surfaces as a failure, never as partial output.
    device.read_exact(buf).map_err(SocketError::from_io)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_bytes_returns_empty_buffer() {
        assert_eq!(secure_random_bytes(0).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_returns_exactly_requested_length() {
        for n in [1usize, 32, 4096, 65536] {
            assert_eq!(secure_random_bytes(n).unwrap().len(), n);
        }
    }
}
