//! Close-contract tests, isolated in their own test binary.
//!
//! The double-close test below observes the error from closing a stale fd
//! number. It lives alone in this file so no concurrently-running test in
//! the same process can recycle the freed descriptor between the two close
//! calls.

use bridge_core::{close, listen, SocketHandle};

#[test]
fn test_close_on_invalid_handle_errors() {
    assert!(close(SocketHandle::from_raw(-1)).is_err());
}

#[test]
fn test_close_twice_errors_on_second_call() {
    let listener = listen(0).expect("listen failed");
    close(listener).expect("first close must succeed");
    assert!(
        close(listener).is_err(),
        "second close must fail, never succeed silently"
    );
}
