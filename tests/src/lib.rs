//! # Pulse Test Suite
//!
//! Unified test crate for cross-crate behavior:
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── scenarios.rs   # End-to-end publish/subscribe scenarios
//!     ├── contract.rs    # Bus contract properties (conflicts, idempotence)
//!     └── nats_live.rs   # Adapter tests against a real broker (ignored)
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p pulse-tests
//!
//! # Against a local NATS server (nats://127.0.0.1:4222)
//! cargo test -p pulse-tests -- --ignored
//! ```


/// Install a tracing subscriber for a test run, once.
///
/// Respects `RUST_LOG`; later calls are no-ops.
pub fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
