//! # bridge-core
//!
//! A minimal, synchronous TCP socket bridge for managed-runtime callers,
//! plus a cryptographically secure random-byte source.
//!
//! The bridge is a flat set of stateless operations over OS file
//! descriptors. Every call performs one syscall attempt, translates the raw
//! result into a typed outcome, and returns. No state is retained between
//! calls: the fd value held by the caller *is* the connection, and whoever
//! holds it owns the responsibility to close it exactly once.
//!
//! This crate deliberately provides no event loop, no buffering, and no
//! protocol logic. A caller with its own concurrency model (a green-thread
//! scheduler, an external event loop, a thread pool) decides when to invoke
//! [`accept`], [`receive`], and [`send`] again. Sockets returned by
//! [`listen`], [`accept`], and [`connect`] are already in non-blocking mode,
//! so no operation suspends the caller — except [`connect`] itself, which
//! performs a blocking TCP handshake by design.
//!
//! # Modules
//!
//! - **`tcp`** – listen/accept/connect/close and the non-blocking
//!   send/receive primitives, in two flavours: a compatibility surface that
//!   collapses would-block and peer-close into an empty read, and a
//!   tri-state `try_*` surface that keeps them apart.
//! - **`entropy`** – all-or-nothing secure random bytes from the OS entropy
//!   facility.
//! - **`handle`** – the opaque [`SocketHandle`] value and the internal fd
//!   guard used on failure paths.
//! - **`error`** – the single [`SocketError`] kind carrying an OS-derived
//!   diagnostic message.

pub mod entropy;
pub mod error;
pub mod handle;
pub mod tcp;

pub use entropy::secure_random_bytes;
pub use error::SocketError;
pub use handle::SocketHandle;
pub use tcp::{
    accept, close, connect, listen, local_port, receive, send, set_nonblocking, try_receive,
    try_send, RecvStatus, SendStatus, MAX_RECV_BYTES,
};
