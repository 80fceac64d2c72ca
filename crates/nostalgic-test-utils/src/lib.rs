// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Nostalgic integration tests.
//!
//! Provides a settable clock, a notifier that records webhooks, fault
//! injection around the storage ports, and a harness wiring all of it to a
//! temp SQLite database.
//!
//! # Components
//!
//! - [`MockClock`] - Clock pinned to a chosen instant, advanced by hand
//! - [`RecordingNotifier`] - Captures webhook payloads for assertion
//! - [`Faults`] - Named storage operations forced to fail
//! - [`TestHarness`] - Services over a temp database with the above wired in

pub mod clock;
pub mod faults;
pub mod harness;
pub mod notifier;

pub use clock::MockClock;
pub use faults::Faults;
pub use harness::{TestHarness, TestHarnessBuilder};
pub use notifier::RecordingNotifier;
