//! Non-blocking TCP primitives over raw file descriptors.
//!
//! Every operation here is a single atomic syscall attempt with no internal
//! retry loop — retries are the caller's responsibility, driven by whatever
//! scheduler the caller owns. Two read/write surfaces are provided:
//!
//! - The compatibility surface ([`receive`], [`send`]) preserves the
//!   historical contract of the bridge: `receive` collapses both
//!   "would block" and "peer closed" into an empty-buffer success, while
//!   `send` reports would-block as an error. Callers must **not** treat an
//!   empty `receive` result as connection closure.
//! - The tri-state surface ([`try_receive`], [`try_send`]) applies one
//!   uniform policy instead: would-block and peer-close are distinct,
//!   non-error outcomes ([`RecvStatus`], [`SendStatus`]).
//!
//! The compatibility functions are implemented on top of the tri-state ones
//! so the two surfaces cannot drift apart.

use std::io;
use std::mem;
use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs};
use std::os::raw::{c_int, c_void};
use std::ptr;

use tracing::trace;

use crate::error::SocketError;
use crate::handle::{FdGuard, SocketHandle};

/// Fixed backlog for listening sockets.
const LISTEN_BACKLOG: c_int = 16;

/// Upper bound on a single receive, bounding scratch allocation.
pub const MAX_RECV_BYTES: usize = 65536;

/// Outcome of a single non-blocking receive attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecvStatus {
    /// At least one byte arrived; the buffer is trimmed to the received
    /// length and never exceeds the requested maximum.
    Data(Vec<u8>),
    /// No data is available right now; try again later.
    WouldBlock,
    /// The peer performed an orderly shutdown; no more data will arrive.
    Closed,
}

/// Outcome of a single non-blocking send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    /// The kernel accepted this many bytes (possibly fewer than offered);
    /// the caller must resubmit the unsent tail.
    Sent(usize),
    /// The kernel buffer is full; try again later.
    WouldBlock,
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

/// Creates an IPv4 listening socket bound to all interfaces on `port`.
///
/// Sets `SO_REUSEADDR`, binds, marks the socket listening with a backlog of
/// 16, and switches it to non-blocking mode (best effort — a failure to set
/// non-blocking does not abort). With `port` 0 the OS picks an ephemeral
/// port, which [`local_port`] reports back.
///
/// # Errors
///
/// Returns [`SocketError`] on any create/bind/listen failure. The
/// partially-created fd is closed before the error is returned.
pub fn listen(port: u16) -> Result<SocketHandle, SocketError> {
    let fd = unsafe { libc::socket(libc::AF_INET, libc::SOCK_STREAM, 0) };
    if fd < 0 {
        return Err(SocketError::last_os());
    }
    let guard = FdGuard::new(fd);

    // Result deliberately ignored; bind surfaces any real problem.
    let opt: c_int = 1;
    unsafe {
        libc::setsockopt(
            fd,
            libc::SOL_SOCKET,
            libc::SO_REUSEADDR,
            &opt as *const c_int as *const c_void,
            mem::size_of::<c_int>() as libc::socklen_t,
        );
    }

    let addr = sockaddr_v4(Ipv4Addr::UNSPECIFIED, port);
    let bound = unsafe {
        libc::bind(
            fd,
            &addr as *const libc::sockaddr_in as *const libc::sockaddr,
            mem::size_of::<libc::sockaddr_in>() as libc::socklen_t,
        )
    };
    if bound < 0 {
        return Err(SocketError::last_os());
    }
    if unsafe { libc::listen(fd, LISTEN_BACKLOG) } < 0 {
        return Err(SocketError::last_os());
    }

    let handle = SocketHandle::from_raw(guard.release());
    let _ = set_nonblocking(handle); // best effort
    trace!(%handle, port, "listening socket created");
    Ok(handle)
}

/// Performs a single non-blocking accept attempt on a listening socket.
///
/// Does not wait for a connection: call it again on the caller's own
/// schedule (typically on a readability event for the listener fd). The
/// accepted socket is switched to non-blocking mode (best effort).
///
/// # Errors
///
/// Returns [`SocketError`] if no connection is pending or the syscall
/// fails.
pub fn accept(listener: SocketHandle) -> Result<SocketHandle, SocketError> {
    let fd = unsafe { libc::accept(listener.as_raw(), ptr::null_mut(), ptr::null_mut()) };
    if fd < 0 {
        return Err(SocketError::last_os());
    }
    let handle = SocketHandle::from_raw(fd);
    let _ = set_nonblocking(handle); // best effort
    trace!(%listener, %handle, "connection accepted");
    Ok(handle)
}

/// Closes the socket.
///
/// # Errors
///
/// Returns [`SocketError`] if the close syscall fails, e.g. the handle is
/// already closed or was never valid.
pub fn close(handle: SocketHandle) -> Result<(), SocketError> {
    if unsafe { libc::close(handle.as_raw()) } < 0 {
        return Err(SocketError::last_os());
    }
    trace!(%handle, "socket closed");
    Ok(())
}

/// Switches the socket to non-blocking mode. Idempotent; exposed so callers
/// can explicitly re-assert the mode on a handle they received elsewhere.
///
/// # Errors
///
/// Returns [`SocketError`] if either `fcntl` call fails.
pub fn set_nonblocking(handle: SocketHandle) -> Result<(), SocketError> {
    let fd = handle.as_raw();
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL, 0) };
    if flags < 0 {
        return Err(SocketError::last_os());
    }
    if unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) } < 0 {
        return Err(SocketError::last_os());
    }
    Ok(())
}

/// Reports the locally bound port of the socket via `getsockname`.
///
/// Mainly useful after `listen(0)`, where the OS picked the port.
///
/// # Errors
///
/// Returns [`SocketError`] if the syscall fails.
pub fn local_port(handle: SocketHandle) -> Result<u16, SocketError> {
    let mut addr: libc::sockaddr_in = unsafe { mem::zeroed() };
    let mut len = mem::size_of::<libc::sockaddr_in>() as libc::socklen_t;
    let rc = unsafe {
        libc::getsockname(
            handle.as_raw(),
            &mut addr as *mut libc::sockaddr_in as *mut libc::sockaddr,
            &mut len,
        )
    };
    if rc < 0 {
        return Err(SocketError::last_os());
    }
    Ok(u16::from_be(addr.sin_port))
}

// ── Receive ───────────────────────────────────────────────────────────────────

/// Performs one non-blocking receive attempt of at most `max_bytes` bytes,
/// reporting would-block and peer-close as distinct outcomes.
///
/// `max_bytes` is clamped into `[1, 65536]`: zero is coerced to 1 and
/// larger requests are capped, bounding the scratch allocation.
///
/// # Errors
///
/// Returns [`SocketError`] on any receive failure other than would-block.
pub fn try_receive(handle: SocketHandle, max_bytes: usize) -> Result<RecvStatus, SocketError> {
    let cap = clamp_recv_len(max_bytes);
    let mut buf = vec![0u8; cap];
    let got = unsafe { libc::recv(handle.as_raw(), buf.as_mut_ptr() as *mut c_void, cap, 0) };
    if got < 0 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::WouldBlock {
            return Ok(RecvStatus::WouldBlock);
        }
        return Err(SocketError::from_io(err));
    }
    if got == 0 {
        trace!(%handle, "peer closed");
        return Ok(RecvStatus::Closed);
    }
    buf.truncate(got as usize);
    Ok(RecvStatus::Data(buf))
}

/// Performs one non-blocking receive attempt, collapsing would-block and
/// end-of-stream into an empty-buffer success.
///
/// An empty result means "nothing to read right now" **or** "peer closed";
/// this surface does not distinguish the two, so callers must not treat an
/// empty success as connection closure. Use [`try_receive`] when the
/// distinction matters.
///
/// On a successful read the returned buffer holds exactly the bytes
/// received — trimmed to the true length, never padded with a garbage tail.
///
/// # Errors
///
/// Returns [`SocketError`] on any receive failure other than would-block.
pub fn receive(handle: SocketHandle, max_bytes: usize) -> Result<Vec<u8>, SocketError> {
    match try_receive(handle, max_bytes)? {
        RecvStatus::Data(buf) => Ok(buf),
        RecvStatus::WouldBlock | RecvStatus::Closed => Ok(Vec::new()),
    }
}

// ── Send ──────────────────────────────────────────────────────────────────────

/// Performs one non-blocking send attempt of the full buffer, reporting
/// would-block as a distinct outcome.
///
/// # Errors
///
/// Returns [`SocketError`] on any send failure other than would-block.
pub fn try_send(handle: SocketHandle, bytes: &[u8]) -> Result<SendStatus, SocketError> {
    let sent = unsafe {
        libc::send(
            handle.as_raw(),
            bytes.as_ptr() as *const c_void,
            bytes.len(),
            0,
        )
    };
    if sent < 0 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::WouldBlock {
            return Ok(SendStatus::WouldBlock);
        }
        return Err(SocketError::from_io(err));
    }
    let sent = sent as usize;
    if sent < bytes.len() {
        trace!(%handle, offered = bytes.len(), sent, "short send");
    }
    Ok(SendStatus::Sent(sent))
}

/// Performs one non-blocking send attempt of the full buffer.
///
/// Returns the number of bytes the kernel accepted, which may be less than
/// `bytes.len()`; there is no internal retry loop, so the caller must
/// resubmit the unsent tail. A would-block condition surfaces as an error
/// on this surface (asymmetric with [`receive`], which reports it as an
/// empty success); use [`try_send`] for the non-error variant.
///
/// An empty buffer is a valid input and sends zero bytes.
///
/// # Errors
///
/// Returns [`SocketError`] on any send failure, including would-block.
pub fn send(handle: SocketHandle, bytes: &[u8]) -> Result<usize, SocketError> {
    match try_send(handle, bytes)? {
        SendStatus::Sent(count) => Ok(count),
        SendStatus::WouldBlock => Err(SocketError::from_io(io::Error::from_raw_os_error(
            libc::EAGAIN,
        ))),
    }
}

// ── Connect ───────────────────────────────────────────────────────────────────

/// Opens an IPv4 TCP connection to `host:port`.
///
/// `host` is tried as a dotted-quad literal first; otherwise a blocking
/// name-resolution lookup runs, and the first IPv4 result wins. The connect
/// call itself is **blocking** — this is the one operation in the bridge
/// that may stall the calling thread until the OS completes or rejects the
/// TCP handshake. On success the socket is switched to non-blocking mode
/// (best effort) before the handle is returned.
///
/// # Errors
///
/// Returns [`SocketError`] if the host cannot be resolved to an IPv4
/// address or the handshake fails. The partially-created fd is closed
/// before the error is returned.
pub fn connect(host: &str, port: u16) -> Result<SocketHandle, SocketError> {
    let fd = unsafe { libc::socket(libc::AF_INET, libc::SOCK_STREAM, 0) };
    if fd < 0 {
        return Err(SocketError::last_os());
    }
    let guard = FdGuard::new(fd);

    let ip = match host.parse::<Ipv4Addr>() {
        Ok(ip) => ip,
        Err(_) => resolve_ipv4(host, port)?,
    };

    let addr = sockaddr_v4(ip, port);
    let rc = unsafe {
        libc::connect(
            fd,
            &addr as *const libc::sockaddr_in as *const libc::sockaddr,
            mem::size_of::<libc::sockaddr_in>() as libc::socklen_t,
        )
    };
    if rc < 0 {
        return Err(SocketError::last_os());
    }

    let handle = SocketHandle::from_raw(guard.release());
    let _ = set_nonblocking(handle); // best effort
    trace!(%handle, host, port, "connected");
    Ok(handle)
}

/// Blocking name resolution, keeping only IPv4 results.
fn resolve_ipv4(host: &str, port: u16) -> Result<Ipv4Addr, SocketError> {
    let addrs = (host, port).to_socket_addrs().map_err(SocketError::from_io)?;
    for addr in addrs {
        if let SocketAddr::V4(v4) = addr {
            return Ok(*v4.ip());
        }
    }
    Err(SocketError::from_io(io::Error::from_raw_os_error(
        libc::EINVAL,
    )))
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Builds a zeroed `sockaddr_in` for the given address and port, in network
/// byte order.
fn sockaddr_v4(ip: Ipv4Addr, port: u16) -> libc::sockaddr_in {
    let mut addr: libc::sockaddr_in = unsafe { mem::zeroed() };
    addr.sin_family = libc::AF_INET as libc::sa_family_t;
    addr.sin_port = port.to_be();
    addr.sin_addr = libc::in_addr {
        s_addr: u32::from(ip).to_be(),
    };
    addr
}

/// Clamps a requested receive length into `[1, MAX_RECV_BYTES]`.
fn clamp_recv_len(requested: usize) -> usize {
    requested.clamp(1, MAX_RECV_BYTES)
}
