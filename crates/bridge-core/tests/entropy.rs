//! Integration tests for the secure random byte source.

use bridge_core::secure_random_bytes;

#[test]
fn test_exact_lengths_across_the_clamp_range() {
    for n in [0usize, 1, 32, 65536] {
        let buf = secure_random_bytes(n).expect("entropy source failed");
        assert_eq!(buf.len(), n, "must return exactly {n} bytes, never fewer");
    }
}

#[test]
fn test_large_output_is_not_degenerate() {
    let buf = secure_random_bytes(65536).expect("entropy source failed");
    let first = buf[0];
    assert!(
        buf.iter().any(|&b| b != first),
        "64 KiB of identical bytes is not entropy"
    );
}

#[test]
fn test_independent_draws_differ() {
    // Two 32-byte draws colliding would mean a broken source.
    let a = secure_random_bytes(32).expect("entropy source failed");
    let b = secure_random_bytes(32).expect("entropy source failed");
    assert_ne!(a, b);
}
