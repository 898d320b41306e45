//! Testing utilities for the render-spy workspace
//!
//! Fixture components and helpers for asserting on emitted log events.

#![allow(missing_docs)]

pub mod capture;
pub mod fixtures;

pub use capture::{capture_events, capture_warnings, init_test_logging, CapturedEvent};
pub use fixtures::{card, counter, greeting, item, list, toggle, Fixtures};
