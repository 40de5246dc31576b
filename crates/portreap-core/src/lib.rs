//! # portreap-core
//!
//! Tracks the TCP connections on one local port across periodic snapshots
//! and terminates the ones that stay open too long.
//!
//! - [`snapshot`]: obtain and parse the kernel connection table.
//! - [`table`]: the tracking table, keyed by socket inode.
//! - [`reconciler`]: merge a snapshot and apply the aging policy.
//! - [`actuator`]: terminate a socket by its address pair.
//! - [`monitor`] and [`scheduler`]: run cycles on a fixed interval.
//! - [`preflight`]: startup checks.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod actuator;
pub mod monitor;
pub mod preflight;
pub mod reconciler;
pub mod scheduler;
pub mod snapshot;
pub mod table;
