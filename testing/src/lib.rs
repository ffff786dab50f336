//! # todo-sync testing
//!
//! Testing utilities for the todo-sync crates.
//!
//! This crate provides:
//! - [`ReducerTest`]: Given-When-Then harness for reducers
//! - [`mocks`]: fixed clocks, row builders and [`ScriptedRemote`], a
//!   recording remote whose calls can be made to fail or stall
//! - [`logs`]: an in-memory `tracing` layer for asserting on error records
//! - [`properties`]: proptest strategies for todo inputs
//!
//! ## Example
//!
//! ```ignore
//! use todo_sync_testing::{ScriptedRemote, RemoteOp, capture_logs, row};
//!
//! #[tokio::test]
//! async fn failed_delete_keeps_items() {
//!     let remote = ScriptedRemote::with_rows([row("1", "A", false, 0)]);
//!     remote.fail_next(RemoteOp::Delete, RemoteError::Request("offline".into()));
//!     let (_guard, logs) = capture_logs();
//!     // mount a controller over `remote`, remove "1", assert one error log
//! }
//! ```

pub mod helpers;
pub mod logs;
pub mod mocks;
pub mod properties;

pub use helpers::{eventually, eventually_sync};
pub use logs::{CapturedLogs, LogCapture, LogRecord, capture_logs};
pub use mocks::{
    FixedClock, RemoteCall, RemoteOp, ScriptedRemote, SteppingClock, epoch, row, test_clock,
};
pub use reducer_test::{ReducerTest, assertions};
