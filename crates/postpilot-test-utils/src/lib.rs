// SPDX-FileCopyrightText: 2026 Postpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Postpilot integration tests.
//!
//! Provides an in-memory storage adapter and a harness that wires vault,
//! storage, and gateway together for fast tests without external services.
//!
//! # Components
//!
//! - [`MemoryStorage`] - map-backed `StorageAdapter` with failure injection and tampering
//! - [`TestHarness`] - full credential stack plus a request driver for the router

pub mod harness;
pub mod memory_storage;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use memory_storage::MemoryStorage;
